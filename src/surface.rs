use crate::models::display_types::{FileLabel, PanelContent, TriggerState};
use serde::Serialize;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// The presentation capabilities the controllers drive.
///
/// Implementations own the markup; the core only hands over neutral view state.
pub trait UiSurface: Send + Sync {
    fn set_preview(&self, data_url: &str);
    fn set_file_label(&self, label: &FileLabel);
    fn set_trigger(&self, trigger: &TriggerState);
    /// `None` hides the result panel.
    fn set_result_panel(&self, content: Option<&PanelContent>);
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurfaceSnapshot {
    pub preview: Option<String>,
    pub label: FileLabel,
    pub trigger: TriggerState,
    pub panel: Option<PanelContent>,
}

impl Default for SurfaceSnapshot {
    fn default() -> Self {
        Self {
            preview: None,
            label: FileLabel::prompt(),
            trigger: TriggerState::disabled(),
            panel: None,
        }
    }
}

/// Headless surface that keeps the latest state of every element.
#[derive(Debug, Default)]
pub struct MemorySurface {
    state: Mutex<SurfaceSnapshot>,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> SurfaceSnapshot {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, SurfaceSnapshot> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl UiSurface for MemorySurface {
    fn set_preview(&self, data_url: &str) {
        self.lock().preview = Some(data_url.to_string());
    }

    fn set_file_label(&self, label: &FileLabel) {
        self.lock().label = label.clone();
    }

    fn set_trigger(&self, trigger: &TriggerState) {
        self.lock().trigger = trigger.clone();
    }

    fn set_result_panel(&self, content: Option<&PanelContent>) {
        self.lock().panel = content.cloned();
    }
}
