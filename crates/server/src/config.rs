use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

/// Simulator settings. Defaults match the firmware's build-time constants.
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    pub http_addr: SocketAddr,
    pub assets_dir: Option<PathBuf>,
    pub front_power: u8,
    pub back_power: u8,
    pub runtime_secs: u16,
    pub interval_secs: u16,
    pub rated_rpm: u16,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            http_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            assets_dir: None,
            front_power: 60,
            back_power: 70,
            runtime_secs: 600,
            interval_secs: 600,
            rated_rpm: 1500,
        }
    }
}

impl DeviceConfig {
    pub fn from_env() -> Self {
        let mut cfg = DeviceConfig::default();

        parse_var("FANPANEL_HTTP_ADDR", &mut cfg.http_addr);
        if let Ok(v) = env::var("FANPANEL_ASSETS_DIR") {
            if !v.is_empty() {
                cfg.assets_dir = Some(PathBuf::from(v));
            }
        }
        parse_var("FANPANEL_FRONT_POWER", &mut cfg.front_power);
        parse_var("FANPANEL_BACK_POWER", &mut cfg.back_power);
        parse_var("FANPANEL_RUNTIME_SECS", &mut cfg.runtime_secs);
        parse_var("FANPANEL_INTERVAL_SECS", &mut cfg.interval_secs);
        parse_var("FANPANEL_RATED_RPM", &mut cfg.rated_rpm);

        cfg.front_power = cfg.front_power.min(100);
        cfg.back_power = cfg.back_power.min(100);
        cfg
    }
}

fn parse_var<T: FromStr>(key: &str, slot: &mut T) {
    if let Ok(v) = env::var(key) {
        match v.parse::<T>() {
            Ok(parsed) => *slot = parsed,
            Err(_) => tracing::warn!(key, value = %v, "ignoring unparseable setting"),
        }
    }
}
