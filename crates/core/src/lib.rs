pub mod commands;
pub mod endpoints;
pub mod fan;
pub mod parse;

pub use commands::PanelEvent;
pub use endpoints::*;
pub use fan::{FanId, FanReading, GeneralSettings, PowerUpdate, UnknownFan};
pub use parse::parse_int;
