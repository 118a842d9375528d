use fanpanel::{MemoryView, PanelView, SliderElement};
use fanpanel_core::{power_label_id, speed_label_id, FanId, INTERVAL_INPUT_ID, RUNTIME_INPUT_ID};

/// Prints a fan's row whenever its speed or power label changes.
pub struct TerminalView {
    inner: MemoryView,
}

impl Default for TerminalView {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalView {
    pub fn new() -> Self {
        Self { inner: MemoryView::fan_panel().without_log() }
    }

    pub fn type_into(&mut self, id: &str, value: &str) {
        self.inner.type_into(id, value);
    }

    /// Applies a label write and returns the line to print, if any.
    fn apply_text(&mut self, id: &str, text: &str) -> Option<String> {
        let changed = self.inner.text(id) != Some(text);
        self.inner.set_text(id, text);
        if !changed {
            return None;
        }
        if let Some(fan) = FanId::ALL
            .into_iter()
            .find(|&fan| id == speed_label_id(fan) || id == power_label_id(fan))
        {
            Some(self.fan_row(fan))
        } else if id.ends_with("-power-display") {
            Some(format!("  slider {id}: {text}"))
        } else {
            None
        }
    }

    fn fan_row(&self, fan: FanId) -> String {
        let speed = self.inner.text(&speed_label_id(fan)).unwrap_or("-");
        let power = self.inner.text(&power_label_id(fan)).unwrap_or("-");
        format!("{:<6} {:>10} {:>5}", fan.label(), speed, power)
    }
}

impl PanelView for TerminalView {
    fn set_text(&mut self, id: &str, text: &str) {
        if let Some(line) = self.apply_text(id, text) {
            println!("{line}");
        }
    }

    fn set_value(&mut self, id: &str, value: &str) {
        self.inner.set_value(id, value);
        if id == RUNTIME_INPUT_ID || id == INTERVAL_INPUT_ID {
            println!("{id}: {value}");
        }
    }

    fn value(&self, id: &str) -> Option<String> {
        self.inner.value(id)
    }

    fn sliders(&self) -> Vec<SliderElement> {
        self.inner.sliders()
    }
}
