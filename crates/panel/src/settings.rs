use fanpanel_core::GeneralSettings;
use tokio::sync::RwLock;

/// Local copy of the device's general settings, owned by the controller.
#[derive(Debug, Default)]
pub struct SettingsStore {
    inner: RwLock<GeneralSettings>,
}

impl SettingsStore {
    pub fn new(initial: GeneralSettings) -> Self {
        Self { inner: RwLock::new(initial) }
    }

    pub async fn get(&self) -> GeneralSettings {
        *self.inner.read().await
    }

    pub async fn runtime_of_fans(&self) -> Option<i64> {
        self.inner.read().await.runtime_of_fans
    }

    pub async fn interval(&self) -> Option<i64> {
        self.inner.read().await.interval
    }

    /// Replaces both fields, returning the previous value.
    pub async fn replace(&self, settings: GeneralSettings) -> GeneralSettings {
        std::mem::replace(&mut *self.inner.write().await, settings)
    }
}
