//! Simulated fan hardware: two PWM fans with tachometers and the manager
//! task that switches them on and off.

use std::sync::Arc;
use std::time::Duration;

use fanpanel_core::{FanId, FanReading};
use tokio::sync::RwLock;
use tokio::time::sleep;
use tracing::info;

use crate::config::DeviceConfig;
use crate::metrics::Metrics;

// Tachometer: the fans pulse twice per rotation and are sampled over 1 s.
pub const PULSES_PER_ROTATION: u32 = 2;
pub const TACHO_WINDOW_MS: u32 = 1000;

#[derive(Debug, Clone)]
pub struct SimFan {
    pub name: String,
    power: u8,
    running: bool,
    rated_rpm: u16,
}

impl SimFan {
    pub fn new(name: impl Into<String>, power: u8, rated_rpm: u16) -> Self {
        Self { name: name.into(), power: power.min(100), running: false, rated_rpm }
    }

    /// Commanded power in percent. Kept while the fan is stopped.
    pub fn power(&self) -> u8 {
        self.power
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// RPM as the tachometer would report it: whole pulses counted over one
    /// window, converted back to rotations per minute.
    pub fn speed(&self) -> u16 {
        if !self.running {
            return 0;
        }
        let rpm = u32::from(self.rated_rpm) * u32::from(self.power) / 100;
        let pulses = rpm * PULSES_PER_ROTATION * TACHO_WINDOW_MS / 60_000;
        let measured = pulses * 60_000 / (PULSES_PER_ROTATION * TACHO_WINDOW_MS);
        measured.min(u32::from(u16::MAX)) as u16
    }

    pub fn reading(&self) -> FanReading {
        FanReading { name: Some(self.name.clone()), speed: self.speed(), power: self.power }
    }
}

#[derive(Debug, Clone)]
pub struct FanBank {
    fans: Vec<SimFan>,
    runtime_secs: u16,
    interval_secs: u16,
}

pub type SharedBank = Arc<RwLock<FanBank>>;

impl FanBank {
    pub fn new(config: &DeviceConfig) -> Self {
        let fans = vec![
            SimFan::new(FanId::Front.label(), config.front_power, config.rated_rpm),
            SimFan::new(FanId::Back.label(), config.back_power, config.rated_rpm),
        ];
        Self { fans, runtime_secs: config.runtime_secs, interval_secs: config.interval_secs }
    }

    pub fn fan(&self, name: &str) -> Option<&SimFan> {
        self.fans.iter().find(|f| f.name == name)
    }

    /// Returns `false` when no fan has that name. Power must already be in range.
    pub fn set_power(&mut self, name: &str, power: u8) -> bool {
        match self.fans.iter_mut().find(|f| f.name == name) {
            Some(fan) => {
                fan.power = power.min(100);
                true
            }
            None => false,
        }
    }

    /// Readings in fixed order: front, then back.
    pub fn readings(&self) -> Vec<FanReading> {
        self.fans.iter().map(SimFan::reading).collect()
    }

    pub fn fans(&self) -> &[SimFan] {
        &self.fans
    }

    pub fn start(&mut self) {
        self.fans.iter_mut().for_each(|f| f.running = true);
    }

    pub fn stop(&mut self) {
        self.fans.iter_mut().for_each(|f| f.running = false);
    }

    pub fn runtime_secs(&self) -> u16 {
        self.runtime_secs
    }

    pub fn interval_secs(&self) -> u16 {
        self.interval_secs
    }

    pub fn set_runtime_secs(&mut self, secs: u16) {
        self.runtime_secs = secs;
    }

    pub fn set_interval_secs(&mut self, secs: u16) {
        self.interval_secs = secs;
    }
}

// Zero-length phases would spin the task.
fn phase(secs: u16) -> Duration {
    Duration::from_secs(u64::from(secs.max(1)))
}

/// Runs the fans for `runtime` seconds, stops them for `interval` seconds,
/// forever. Both durations are re-read at the start of each phase.
pub async fn run_duty_cycle(bank: SharedBank, metrics: Arc<Metrics>) {
    loop {
        let runtime = {
            let mut bank = bank.write().await;
            bank.start();
            metrics.observe(&bank);
            bank.runtime_secs()
        };
        info!(runtime_secs = runtime, "fans started");
        sleep(phase(runtime)).await;

        let interval = {
            let mut bank = bank.write().await;
            for fan in bank.fans() {
                info!(fan = %fan.name, speed = fan.speed(), "fan speed");
            }
            bank.stop();
            metrics.observe(&bank);
            bank.interval_secs()
        };
        info!(interval_secs = interval, "fans stopped");
        sleep(phase(interval)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bank() -> FanBank {
        FanBank::new(&DeviceConfig { runtime_secs: 10, interval_secs: 5, ..DeviceConfig::default() })
    }

    #[test]
    fn speed_is_quantized_by_tachometer() {
        let mut fan = SimFan::new("Front", 60, 1500);
        assert_eq!(fan.speed(), 0);
        fan.running = true;
        assert_eq!(fan.speed(), 900);
        fan.power = 33; // 495 RPM, 16.5 pulses
        assert_eq!(fan.speed(), 480);
        fan.power = 0;
        assert_eq!(fan.speed(), 0);
    }

    #[test]
    fn stopping_keeps_commanded_power() {
        let mut bank = bank();
        bank.start();
        assert!(bank.set_power("Back", 20));
        bank.stop();
        bank.start();
        assert_eq!(bank.fan("Back").map(SimFan::power), Some(20));
        assert_eq!(bank.fan("Front").map(SimFan::power), Some(60));
        assert!(!bank.set_power("Side", 20));
    }

    #[test]
    fn readings_are_front_then_back() {
        let names: Vec<_> = bank().readings().into_iter().map(|r| r.name.unwrap()).collect();
        assert_eq!(names, ["Front", "Back"]);
    }

    #[tokio::test(start_paused = true)]
    async fn duty_cycle_alternates() {
        let shared: SharedBank = Arc::new(RwLock::new(bank()));
        let task = tokio::spawn(run_duty_cycle(shared.clone(), Metrics::new()));

        sleep(Duration::from_secs(1)).await;
        assert!(shared.read().await.fans().iter().all(SimFan::is_running));

        sleep(Duration::from_secs(10)).await; // t = 11
        assert!(shared.read().await.fans().iter().all(|f| !f.is_running()));
        assert_eq!(shared.read().await.readings()[0].speed, 0);

        shared.write().await.set_interval_secs(20); // current pause already scheduled
        sleep(Duration::from_secs(5)).await; // t = 16
        assert!(shared.read().await.fans().iter().all(SimFan::is_running));

        sleep(Duration::from_secs(10)).await; // t = 26, pause now lasts 20 s
        sleep(Duration::from_secs(15)).await; // t = 41
        assert!(shared.read().await.fans().iter().all(|f| !f.is_running()));

        task.abort();
    }
}
