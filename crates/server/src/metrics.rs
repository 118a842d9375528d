use std::sync::Arc;

use prometheus::{Encoder, IntCounter, IntGaugeVec, Registry, TextEncoder};

use crate::fans::FanBank;

pub struct Metrics {
    registry: Registry,
    pub power_updates_total: IntCounter,
    pub settings_updates_total: IntCounter,
    pub rejected_requests_total: IntCounter,
    fan_power: IntGaugeVec, // label: fan
    fan_speed: IntGaugeVec, // label: fan
}

impl Metrics {
    pub fn new() -> Arc<Self> {
        Self::try_new().unwrap_or_else(|err| {
            tracing::warn!(?err, "metrics registration failed; exporting nothing");
            Arc::new(Self::unregistered())
        })
    }

    fn try_new() -> prometheus::Result<Arc<Self>> {
        let metrics = Self::unregistered();
        metrics.registry.register(Box::new(metrics.power_updates_total.clone()))?;
        metrics.registry.register(Box::new(metrics.settings_updates_total.clone()))?;
        metrics.registry.register(Box::new(metrics.rejected_requests_total.clone()))?;
        metrics.registry.register(Box::new(metrics.fan_power.clone()))?;
        metrics.registry.register(Box::new(metrics.fan_speed.clone()))?;
        Ok(Arc::new(metrics))
    }

    // Metric names and help strings are static, so construction can't fail.
    fn unregistered() -> Self {
        let power_updates_total = IntCounter::new("fanpanel_power_updates_total", "Accepted fan power updates").unwrap();
        let settings_updates_total = IntCounter::new("fanpanel_settings_updates_total", "Accepted fan manager updates").unwrap();
        let rejected_requests_total = IntCounter::new("fanpanel_rejected_requests_total", "Requests answered with 4xx").unwrap();
        let fan_power = IntGaugeVec::new(
            prometheus::Opts::new("fanpanel_fan_power_percent", "Commanded fan power"),
            &["fan"],
        ).unwrap();
        let fan_speed = IntGaugeVec::new(
            prometheus::Opts::new("fanpanel_fan_speed_rpm", "Measured fan speed"),
            &["fan"],
        ).unwrap();

        Self {
            registry: Registry::new(),
            power_updates_total,
            settings_updates_total,
            rejected_requests_total,
            fan_power,
            fan_speed,
        }
    }

    /// Copies the bank's current power and speed into the gauges.
    pub fn observe(&self, bank: &FanBank) {
        for fan in bank.fans() {
            self.fan_power.with_label_values(&[fan.name.as_str()]).set(i64::from(fan.power()));
            self.fan_speed.with_label_values(&[fan.name.as_str()]).set(i64::from(fan.speed()));
        }
    }

    pub fn encode(&self) -> prometheus::Result<(String, Vec<u8>)> {
        let encoder = TextEncoder::new();
        let mut buf = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buf)?;
        Ok((encoder.format_type().to_string(), buf))
    }
}
