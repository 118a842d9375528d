//! The panel controller: fetches fan telemetry and general settings from the
//! device, renders them into a [`PanelView`] and forwards slider and form
//! input back to the device.
//!
//! Every network operation logs its failure and also returns it, so callers
//! can react without scraping logs. Nothing is retried and no error is shown
//! in the view.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use fanpanel_client::DeviceClient;
use fanpanel_core::{
    parse_int, power_label_id, slider_display_id, slider_id, speed_label_id, FanId, FanReading,
    GeneralSettings, PanelEvent, INTERVAL_INPUT_ID, RUNTIME_INPUT_ID,
};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

use crate::config::PanelConfig;
use crate::error::PanelError;
use crate::poller::Poller;
use crate::settings::SettingsStore;
use crate::view::PanelView;

/// Outcome of [`PanelController::initialize`]. Initialization always runs
/// to the end; this records which steps worked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitReport {
    pub fans_loaded: bool,
    pub settings_loaded: bool,
    pub sliders_attached: usize,
}

pub struct PanelController<V> {
    client: DeviceClient,
    view: Mutex<V>,
    settings: SettingsStore,
    attached: RwLock<BTreeSet<FanId>>,
    poller: Mutex<Option<Poller>>,
    poll_period: Duration,
}

impl<V: PanelView> PanelController<V> {
    pub fn new(client: DeviceClient, view: V, poll_period: Duration) -> Self {
        Self {
            client,
            view: Mutex::new(view),
            settings: SettingsStore::default(),
            attached: RwLock::new(BTreeSet::new()),
            poller: Mutex::new(None),
            poll_period,
        }
    }

    pub fn from_config(config: &PanelConfig, view: V) -> Result<Self, PanelError> {
        let client = DeviceClient::new(&config.client)?;
        Ok(Self::new(client, view, config.poll_period))
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    /// Runs `f` with exclusive access to the view.
    pub async fn with_view<R>(&self, f: impl FnOnce(&mut V) -> R) -> R {
        let mut view = self.view.lock().await;
        f(&mut view)
    }

    pub async fn render_fan(&self, fan: FanId, reading: &FanReading, sync_slider: bool) {
        let mut view = self.view.lock().await;
        render_into(&mut *view, fan, reading, sync_slider);
    }

    /// Fetches both fans' telemetry and renders it.
    ///
    /// Nothing is rendered unless the device sent exactly two readings. A
    /// poll that lands between a power write and the device applying it
    /// shows the old power again until the next poll.
    pub async fn refresh_fan_readings(&self, sync_sliders: bool) -> Result<[FanReading; 2], PanelError> {
        let result = async {
            let readings = self.client.fan_readings().await?;
            order_readings(readings)
        }
        .await;
        let readings = logged(result, "error fetching fan data")?;

        let mut view = self.view.lock().await;
        for (fan, reading) in FanId::ALL.into_iter().zip(readings.iter()) {
            render_into(&mut *view, fan, reading, sync_sliders);
        }
        Ok(readings)
    }

    /// Fetches the general settings into the store and the two inputs.
    pub async fn load_general_settings(&self) -> Result<GeneralSettings, PanelError> {
        let result = self.client.general_settings().await.map_err(PanelError::from);
        let settings = logged(result, "error fetching general settings")?;

        self.settings.replace(settings).await;
        let mut view = self.view.lock().await;
        view.set_value(RUNTIME_INPUT_ID, &display_int(settings.runtime_of_fans));
        view.set_value(INTERVAL_INPUT_ID, &display_int(settings.interval));
        Ok(settings)
    }

    /// Reads the two inputs, stores them and sends them to the device.
    ///
    /// The store keeps the submitted values even when the device rejects
    /// them.
    pub async fn submit_general_settings(&self) -> Result<GeneralSettings, PanelError> {
        let settings = {
            let view = self.view.lock().await;
            GeneralSettings {
                runtime_of_fans: view.value(RUNTIME_INPUT_ID).as_deref().and_then(parse_int),
                interval: view.value(INTERVAL_INPUT_ID).as_deref().and_then(parse_int),
            }
        };
        self.settings.replace(settings).await;

        let result = self.client.set_general_settings(&settings).await.map_err(PanelError::from);
        logged(result, "error updating general config")?;
        info!(
            runtime_of_fans = ?settings.runtime_of_fans,
            interval = ?settings.interval,
            "general config updated"
        );
        Ok(settings)
    }

    /// Commands one fan's power. Only on success is the power label updated;
    /// the device is not re-read.
    pub async fn set_fan_power(&self, fan: FanId, power: Option<i64>) -> Result<(), PanelError> {
        let result = self.client.set_fan_power(fan, power).await.map_err(PanelError::from);
        logged(result, "error setting fan power")?;

        let shown = display_int(power);
        self.view.lock().await.set_text(&power_label_id(fan), &format!("{shown}%"));
        info!(%fan, power = %shown, "fan power set");
        Ok(())
    }

    /// Makes every `fan-power-slider` element in the view live.
    ///
    /// Sliders with an unrecognised `data-fan-name` are skipped; the first
    /// such name is returned as the error once the others are attached.
    pub async fn attach_slider_handlers(&self) -> Result<usize, PanelError> {
        let sliders = self.view.lock().await.sliders();
        let mut attached = self.attached.write().await;
        let mut first_err = None;
        for slider in sliders {
            match slider.fan_name.parse::<FanId>() {
                Ok(fan) => {
                    attached.insert(fan);
                    debug!(id = %slider.id, %fan, "slider attached");
                }
                Err(err) => {
                    error!(id = %slider.id, error = %err, "slider has no valid data-fan-name");
                    first_err.get_or_insert(err);
                }
            }
        }
        match first_err {
            Some(err) => Err(err.into()),
            None => Ok(attached.len()),
        }
    }

    pub async fn handle_event(&self, event: PanelEvent) -> Result<(), PanelError> {
        match event {
            PanelEvent::SliderInput { fan_name, value } => {
                let Some(fan) = self.live_slider(&fan_name).await? else { return Ok(()) };
                // Live feedback only; the device is contacted on commit
                self.view
                    .lock()
                    .await
                    .set_text(&slider_display_id(fan), &format!("{value} %"));
                Ok(())
            }
            PanelEvent::SliderChange { fan_name, value } => {
                let Some(fan) = self.live_slider(&fan_name).await? else { return Ok(()) };
                self.set_fan_power(fan, parse_int(&value)).await
            }
            PanelEvent::SubmitSettings => self.submit_general_settings().await.map(|_| ()),
            PanelEvent::Refresh => self.refresh_fan_readings(true).await.map(|_| ()),
        }
    }

    /// One poll, exactly what the periodic task runs.
    pub async fn poll_once(&self) -> Result<[FanReading; 2], PanelError> {
        self.refresh_fan_readings(false).await
    }

    /// Starts polling the device every period. No-op while already polling.
    pub async fn start_polling(self: &Arc<Self>) {
        let mut slot = self.poller.lock().await;
        if slot.as_ref().is_some_and(Poller::is_running) {
            return;
        }
        let panel = Arc::downgrade(self);
        *slot = Some(Poller::spawn(self.poll_period, move || {
            let panel = panel.clone();
            async move {
                if let Some(panel) = panel.upgrade() {
                    let _ = panel.poll_once().await;
                }
            }
        }));
        info!(period_ms = self.poll_period.as_millis() as u64, "polling started");
    }

    /// Returns whether a poller was running.
    pub async fn stop_polling(&self) -> bool {
        let poller = self.poller.lock().await.take();
        match poller {
            Some(poller) => {
                poller.stop().await;
                info!("polling stopped");
                true
            }
            None => false,
        }
    }

    pub async fn is_polling(&self) -> bool {
        self.poller.lock().await.as_ref().is_some_and(Poller::is_running)
    }

    /// Startup sequence: readings with slider sync, general settings,
    /// slider handlers, then polling. Each step waits for the previous one;
    /// a failing step is logged and the sequence carries on.
    pub async fn initialize(self: &Arc<Self>) -> InitReport {
        let fans_loaded = self.refresh_fan_readings(true).await.is_ok();
        let settings_loaded = self.load_general_settings().await.is_ok();
        let _ = self.attach_slider_handlers().await;
        self.start_polling().await;

        let report = InitReport {
            fans_loaded,
            settings_loaded,
            sliders_attached: self.attached.read().await.len(),
        };
        info!(?report, "panel initialized");
        report
    }

    async fn live_slider(&self, fan_name: &str) -> Result<Option<FanId>, PanelError> {
        let fan = logged(fan_name.parse::<FanId>().map_err(PanelError::from), "slider event")?;
        if self.attached.read().await.contains(&fan) {
            Ok(Some(fan))
        } else {
            debug!(%fan, "ignoring event for detached slider");
            Ok(None)
        }
    }
}

fn render_into<V: PanelView + ?Sized>(view: &mut V, fan: FanId, reading: &FanReading, sync_slider: bool) {
    view.set_text(&speed_label_id(fan), &format!("{} RPM", reading.speed));
    view.set_text(&power_label_id(fan), &format!("{}%", reading.power));
    if sync_slider {
        view.set_value(&slider_id(fan), &reading.power.to_string());
        view.set_text(&slider_display_id(fan), &format!("{}%", reading.power));
    }
}

/// Puts the readings in `[front, back]` order.
///
/// Position decides unless every reading names a distinct known fan, in
/// which case the names win.
fn order_readings(readings: Vec<FanReading>) -> Result<[FanReading; 2], PanelError> {
    let [first, second]: [FanReading; 2] = readings
        .try_into()
        .map_err(|r: Vec<FanReading>| PanelError::ReadingCount(r.len()))?;

    let named = |r: &FanReading| r.name.as_deref().and_then(FanId::from_label);
    match (named(&first), named(&second)) {
        (Some(FanId::Back), Some(FanId::Front)) => {
            warn!("device listed fans back-to-front; ordering by name");
            Ok([second, first])
        }
        _ => Ok([first, second]),
    }
}

fn display_int(value: Option<i64>) -> String {
    value.map_or_else(|| "NaN".to_string(), |v| v.to_string())
}

fn logged<T>(result: Result<T, PanelError>, what: &str) -> Result<T, PanelError> {
    if let Err(err) = &result {
        error!(error = %err, "{}", what);
    }
    result
}
