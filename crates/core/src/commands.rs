use serde::{Deserialize, Serialize};

// User input coming from the panel view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum PanelEvent {
    // Slider is being dragged; `fan_name` is the element's data-fan-name
    SliderInput { fan_name: String, value: String },
    // Slider value committed (released)
    SliderChange { fan_name: String, value: String },
    SubmitSettings,
    Refresh,
}
