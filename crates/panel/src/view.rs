//! Element-addressed view surface the controller renders into.
//!
//! Elements are looked up by id, the same ids the device's HTML markup uses
//! (`fan-front-speed`, `runtime-of-fans`, ...). Writes to ids the view does
//! not know are dropped.

use std::collections::BTreeMap;

use fanpanel_core::{
    power_label_id, slider_display_id, slider_id, speed_label_id, FanId, INTERVAL_INPUT_ID,
    RUNTIME_INPUT_ID, SLIDER_CLASS,
};
use tracing::warn;

/// A slider element carrying the `fan-power-slider` class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SliderElement {
    pub id: String,
    /// Raw `data-fan-name` attribute.
    pub fan_name: String,
}

pub trait PanelView: Send + 'static {
    fn set_text(&mut self, id: &str, text: &str);
    fn set_value(&mut self, id: &str, value: &str);
    fn value(&self, id: &str) -> Option<String>;
    fn sliders(&self) -> Vec<SliderElement>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteKind {
    Text,
    Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewWrite {
    pub id: String,
    pub kind: WriteKind,
    pub content: String,
}

#[derive(Debug, Clone, Default)]
struct Element {
    text: String,
    value: String,
    class: Option<String>,
    data_fan_name: Option<String>,
}

/// In-memory view that records every write made through [`PanelView`],
/// unless built with [`MemoryView::without_log`].
#[derive(Debug, Clone, Default)]
pub struct MemoryView {
    elements: BTreeMap<String, Element>,
    writes: Vec<ViewWrite>,
    log_disabled: bool,
}

impl MemoryView {
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard panel: labels, sliders and displays for both fans plus
    /// the two settings inputs.
    pub fn fan_panel() -> Self {
        let mut view = Self::new();
        for fan in FanId::ALL {
            view.add_element(&speed_label_id(fan));
            view.add_element(&power_label_id(fan));
            view.add_element(&slider_display_id(fan));
            view.add_slider(&slider_id(fan), fan.id());
        }
        view.add_element(RUNTIME_INPUT_ID);
        view.add_element(INTERVAL_INPUT_ID);
        view
    }

    /// Stops recording writes. Long-lived views only need element state.
    pub fn without_log(mut self) -> Self {
        self.log_disabled = true;
        self.writes = Vec::new();
        self
    }

    pub fn add_element(&mut self, id: &str) {
        self.elements.entry(id.to_string()).or_default();
    }

    pub fn add_slider(&mut self, id: &str, fan_name: &str) {
        self.elements.insert(
            id.to_string(),
            Element {
                value: "0".to_string(),
                class: Some(SLIDER_CLASS.to_string()),
                data_fan_name: Some(fan_name.to_string()),
                ..Element::default()
            },
        );
    }

    pub fn text(&self, id: &str) -> Option<&str> {
        self.elements.get(id).map(|e| e.text.as_str())
    }

    /// Simulates the user editing an input or moving a slider. Not recorded
    /// as a write.
    pub fn type_into(&mut self, id: &str, value: &str) {
        if let Some(element) = self.elements.get_mut(id) {
            element.value = value.to_string();
        }
    }

    pub fn writes(&self) -> &[ViewWrite] {
        &self.writes
    }

    pub fn clear_writes(&mut self) {
        self.writes.clear();
    }

    fn element_mut(&mut self, id: &str) -> Option<&mut Element> {
        let element = self.elements.get_mut(id);
        if element.is_none() {
            warn!(id, "view has no such element");
        }
        element
    }

    fn record(&mut self, id: &str, kind: WriteKind, content: &str) {
        if self.log_disabled {
            return;
        }
        self.writes.push(ViewWrite { id: id.to_string(), kind, content: content.to_string() });
    }
}

impl PanelView for MemoryView {
    fn set_text(&mut self, id: &str, text: &str) {
        let Some(element) = self.element_mut(id) else { return };
        element.text = text.to_string();
        self.record(id, WriteKind::Text, text);
    }

    fn set_value(&mut self, id: &str, value: &str) {
        let Some(element) = self.element_mut(id) else { return };
        element.value = value.to_string();
        self.record(id, WriteKind::Value, value);
    }

    fn value(&self, id: &str) -> Option<String> {
        self.elements.get(id).map(|e| e.value.clone())
    }

    fn sliders(&self) -> Vec<SliderElement> {
        self.elements
            .iter()
            .filter(|(_, e)| e.class.as_deref() == Some(SLIDER_CLASS))
            .map(|(id, e)| SliderElement {
                id: id.clone(),
                fan_name: e.data_fan_name.clone().unwrap_or_default(),
            })
            .collect()
    }
}
