pub mod config;
pub mod client;

pub use config::ClientConfig;
pub use client::{ClientError, DeviceClient};
