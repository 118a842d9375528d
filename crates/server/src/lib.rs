//! Simulator for the two-fan management device.
//!
//! Serves the device's HTTP protocol (`/fan`, `/fanManager`) backed by a
//! simulated fan bank, so the panel can be exercised without hardware.

pub mod config;
pub mod fans;
pub mod metrics;
pub mod routes;

use std::sync::Arc;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;

pub use config::DeviceConfig;
pub use fans::{FanBank, SharedBank, SimFan};
pub use metrics::Metrics;
pub use routes::router;

#[derive(Clone)]
pub struct DeviceState {
    pub bank: SharedBank,
    pub metrics: Arc<Metrics>,
}

impl DeviceState {
    pub fn new(config: &DeviceConfig) -> Self {
        let bank = FanBank::new(config);
        let metrics = Metrics::new();
        metrics.observe(&bank);
        Self { bank: Arc::new(RwLock::new(bank)), metrics }
    }

    /// Starts the run/pause cycle on the current runtime.
    pub fn spawn_duty_cycle(&self) -> JoinHandle<()> {
        tokio::spawn(fans::run_duty_cycle(self.bank.clone(), self.metrics.clone()))
    }
}
