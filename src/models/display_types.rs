use crate::error::DetectError;
use serde::Serialize;

pub const IDLE_TRIGGER_LABEL: &str = "Detect Defect";
pub const BUSY_TRIGGER_LABEL: &str = "Analyzing...";
const PROMPT_LABEL: &str = "Choose an Image";
const CHOSEN_LABEL: &str = "Image Selected - Click to Change";

/// Colour band for the primary confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceTier {
    High,
    Medium,
    Low,
}

impl ConfidenceTier {
    /// `> 80` is high, `> 60` is medium, everything else is low.
    pub fn from_confidence(percent: f64) -> Self {
        if percent > 80.0 {
            ConfidenceTier::High
        } else if percent > 60.0 {
            ConfidenceTier::Medium
        } else {
            ConfidenceTier::Low
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            ConfidenceTier::High => "#22c55e",
            ConfidenceTier::Medium => "#f59e0b",
            ConfidenceTier::Low => "#ef4444",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakdownEntry {
    pub label: String,
    pub probability: f64,
    /// `probability * 100` rounded to two decimals; also the bar width.
    pub percent: f64,
    pub percent_label: String,
    pub is_top: bool,
}

/// Neutral rendering of a successful prediction, ready for any view layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayModel {
    pub defect: String,
    pub confidence_label: String,
    pub confidence: f64,
    pub tier: ConfidenceTier,
    /// Sorted by probability, highest first. `None` when the service sent no breakdown.
    pub breakdown: Option<Vec<BreakdownEntry>>,
}

impl DisplayModel {
    pub fn top_entry(&self) -> Option<&BreakdownEntry> {
        self.breakdown.as_ref()?.first()
    }

    /// The primary label and the top breakdown entry come from separate fields
    /// of the response and are not reconciled; this reports whether they agree.
    pub fn top_matches_defect(&self) -> Option<bool> {
        self.top_entry().map(|top| top.label == self.defect)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelStyle {
    Prompt,
    Chosen,
}

/// The file-picker label and the selected file name beneath it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileLabel {
    pub text: String,
    pub style: LabelStyle,
    pub file_name: Option<String>,
}

impl FileLabel {
    pub fn prompt() -> Self {
        Self {
            text: PROMPT_LABEL.to_string(),
            style: LabelStyle::Prompt,
            file_name: None,
        }
    }

    pub fn chosen(file_name: &str) -> Self {
        Self {
            text: CHOSEN_LABEL.to_string(),
            style: LabelStyle::Chosen,
            file_name: Some(format!("Selected: {}", file_name)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TriggerState {
    pub enabled: bool,
    pub busy: bool,
    pub label: String,
}

impl TriggerState {
    /// Before any file has been chosen.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            busy: false,
            label: IDLE_TRIGGER_LABEL.to_string(),
        }
    }

    pub fn idle() -> Self {
        Self {
            enabled: true,
            busy: false,
            label: IDLE_TRIGGER_LABEL.to_string(),
        }
    }

    pub fn busy() -> Self {
        Self {
            enabled: false,
            busy: true,
            label: BUSY_TRIGGER_LABEL.to_string(),
        }
    }
}

/// What the result panel shows while it is visible.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PanelContent {
    Ready { message: String },
    Analyzing { message: String },
    Result { model: DisplayModel },
    Error { error: DetectError, message: String },
}

impl PanelContent {
    pub fn ready() -> Self {
        PanelContent::Ready {
            message: "Image uploaded successfully! Click \"Detect Defect\" to analyze.".to_string(),
        }
    }

    pub fn analyzing() -> Self {
        PanelContent::Analyzing {
            message: "Analyzing image... Please wait.".to_string(),
        }
    }

    pub fn error(error: DetectError, base_url: &str) -> Self {
        let message = error.user_message(base_url);
        PanelContent::Error { error, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_boundaries() {
        assert_eq!(ConfidenceTier::from_confidence(85.0), ConfidenceTier::High);
        assert_eq!(ConfidenceTier::from_confidence(80.01), ConfidenceTier::High);
        assert_eq!(ConfidenceTier::from_confidence(80.0), ConfidenceTier::Medium);
        assert_eq!(ConfidenceTier::from_confidence(70.0), ConfidenceTier::Medium);
        assert_eq!(ConfidenceTier::from_confidence(60.0), ConfidenceTier::Low);
        assert_eq!(ConfidenceTier::from_confidence(-3.0), ConfidenceTier::Low);
    }

    #[test]
    fn trigger_states() {
        assert!(!TriggerState::disabled().enabled);
        assert_eq!(TriggerState::disabled().label, TriggerState::idle().label);
        let busy = TriggerState::busy();
        assert!(!busy.enabled && busy.busy);
        assert_eq!(busy.label, BUSY_TRIGGER_LABEL);
    }

    #[test]
    fn chosen_label_names_the_file() {
        let label = FileLabel::chosen("coil_12.jpg");
        assert_eq!(label.style, LabelStyle::Chosen);
        assert_eq!(label.file_name.as_deref(), Some("Selected: coil_12.jpg"));
        assert_eq!(FileLabel::prompt().file_name, None);
    }

    #[test]
    fn error_panel_uses_user_message() {
        let panel = PanelContent::error(DetectError::NoFileSelected, "http://x");
        match panel {
            PanelContent::Error { message, .. } => assert_eq!(message, "Please upload an image first."),
            other => panic!("unexpected panel {:?}", other),
        }
    }
}
