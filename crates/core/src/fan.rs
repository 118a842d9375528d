use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The two physical fans on the device.
///
/// Each fan has an internal identifier used for element ids and the
/// `data-fan-name` attribute (`fan-front`), and a protocol label used in
/// the `name` query parameter (`Front`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FanId {
    Front,
    Back,
}

impl FanId {
    /// Position order of the `GET /fan` response.
    pub const ALL: [FanId; 2] = [FanId::Front, FanId::Back];

    pub fn id(self) -> &'static str {
        match self {
            FanId::Front => "fan-front",
            FanId::Back => "fan-back",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FanId::Front => "Front",
            FanId::Back => "Back",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|fan| fan.label() == label)
    }
}

impl fmt::Display for FanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown fan identifier '{0}'")]
pub struct UnknownFan(pub String);

impl FromStr for FanId {
    type Err = UnknownFan;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|fan| fan.id() == s)
            .ok_or_else(|| UnknownFan(s.to_string()))
    }
}

/// One fan's telemetry as reported by `GET /fan`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FanReading {
    // The firmware tags each entry with its label; older builds don't.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub speed: u16, // RPM
    pub power: u8,  // 0..=100
}

impl FanReading {
    pub fn new(speed: u16, power: u8) -> Self {
        Self { name: None, speed, power }
    }

    pub fn named(fan: FanId, speed: u16, power: u8) -> Self {
        Self { name: Some(fan.label().to_string()), speed, power }
    }
}

/// Body of `POST /fan?name=...`. `None` goes out as `null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerUpdate {
    pub power: Option<i64>,
}

/// Device-wide settings exchanged with `/fanManager`.
///
/// A `None` field is a value that did not parse as an integer; it goes on
/// the wire as `null`, the same thing a browser sends for `NaN`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralSettings {
    pub runtime_of_fans: Option<i64>,
    pub interval: Option<i64>,
}

impl GeneralSettings {
    pub fn new(runtime_of_fans: i64, interval: i64) -> Self {
        Self {
            runtime_of_fans: Some(runtime_of_fans),
            interval: Some(interval),
        }
    }
}
