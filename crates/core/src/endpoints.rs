// Endpoint paths and element ids shared by the panel and the device

use crate::fan::FanId;

pub const FAN_ENDPOINT: &str = "/fan";
pub const FAN_MANAGER_ENDPOINT: &str = "/fanManager";

// Panel markup
pub const SLIDER_CLASS: &str = "fan-power-slider";
pub const RUNTIME_INPUT_ID: &str = "runtime-of-fans";
pub const INTERVAL_INPUT_ID: &str = "interval";

/// Path and query for setting one fan's power.
pub fn fan_power_path(fan: FanId) -> String {
    format!("{}?name={}", FAN_ENDPOINT, fan.label())
}

pub fn speed_label_id(fan: FanId) -> String { format!("{}-speed", fan.id()) }
pub fn power_label_id(fan: FanId) -> String { format!("{}-power", fan.id()) }
pub fn slider_id(fan: FanId) -> String { format!("{}-power-slider", fan.id()) }
pub fn slider_display_id(fan: FanId) -> String { format!("{}-power-display", fan.id()) }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_ids_follow_markup() {
        assert_eq!(speed_label_id(FanId::Front), "fan-front-speed");
        assert_eq!(power_label_id(FanId::Back), "fan-back-power");
        assert_eq!(slider_id(FanId::Front), "fan-front-power-slider");
        assert_eq!(slider_display_id(FanId::Back), "fan-back-power-display");
    }

    #[test]
    fn power_path_uses_protocol_label() {
        assert_eq!(fan_power_path(FanId::Front), "/fan?name=Front");
        assert_eq!(fan_power_path(FanId::Back), "/fan?name=Back");
    }
}
