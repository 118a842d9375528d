pub mod config;
pub mod controller;
pub mod error;
pub mod poller;
pub mod settings;
pub mod view;

pub use config::PanelConfig;
pub use controller::{InitReport, PanelController};
pub use error::PanelError;
pub use poller::Poller;
pub use settings::SettingsStore;
pub use view::{MemoryView, PanelView, SliderElement};
