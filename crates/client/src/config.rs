use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    /// `None` leaves requests without a deadline.
    pub request_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            request_timeout: Some(Duration::from_millis(10_000)),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), ..Self::default() }
    }

    pub fn from_env() -> Self {
        let mut cfg = ClientConfig::default();

        if let Ok(v) = env::var("FANPANEL_DEVICE_URL") {
            if !v.is_empty() {
                cfg.base_url = v;
            }
        }
        if let Ok(v) = env::var("FANPANEL_REQUEST_TIMEOUT_MS") {
            if let Ok(ms) = v.parse::<u64>() {
                cfg.request_timeout = (ms > 0).then(|| Duration::from_millis(ms));
            }
        }

        cfg
    }
}
