use std::env;
use std::time::Duration;

use fanpanel_client::ClientConfig;

#[derive(Debug, Clone)]
pub struct PanelConfig {
    pub client: ClientConfig,
    pub poll_period: Duration,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            client: ClientConfig::default(),
            poll_period: Duration::from_millis(2000),
        }
    }
}

impl PanelConfig {
    pub fn from_env() -> Self {
        let mut cfg = PanelConfig { client: ClientConfig::from_env(), ..PanelConfig::default() };

        if let Ok(v) = env::var("FANPANEL_POLL_MS") {
            match v.parse::<u64>() {
                Ok(ms) if ms > 0 => cfg.poll_period = Duration::from_millis(ms),
                _ => tracing::warn!(value = %v, "ignoring invalid FANPANEL_POLL_MS"),
            }
        }

        cfg
    }
}
