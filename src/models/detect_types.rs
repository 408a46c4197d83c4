use crate::error::{AppError, DetectError};
use crate::models::display_types::DisplayModel;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

const FALLBACK_MIME: &str = "application/octet-stream";

/// The image the user picked. Cheap to clone; the bytes are shared.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedFile {
    name: String,
    data: Arc<[u8]>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        let data: Vec<u8> = data.into();
        Self {
            name: name.into(),
            data: Arc::from(data),
        }
    }

    pub async fn from_path(path: &Path) -> Result<Self, AppError> {
        let data = tokio::fs::read(path).await.map_err(|e| AppError {
            message: format!("Failed to read image {}: {}", path.display(), e),
        })?;
        let name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        Ok(Self::new(name, data))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// MIME type sniffed from the magic bytes, not the file name.
    pub fn mime_type(&self) -> &'static str {
        image::guess_format(&self.data)
            .map(|format| format.to_mime_type())
            .unwrap_or(FALLBACK_MIME)
    }
}

/// JSON body returned by `POST /predict`, before validation.
#[derive(Debug, Default, Deserialize)]
pub struct PredictionPayload {
    #[serde(default)]
    pub defect: Option<String>,
    #[serde(default)]
    pub confidence: Option<String>,
    #[serde(default)]
    pub all_predictions: Option<serde_json::Map<String, Value>>,
}

/// Confidence as reported by the service, e.g. `"85.00%"`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Confidence {
    pub raw: String,
    pub value: f64,
}

impl Confidence {
    pub fn parse(raw: &str) -> Result<Self, DetectError> {
        let trimmed = raw.trim();
        let number = trimmed.strip_suffix('%').unwrap_or(trimmed).trim();
        let value: f64 = number
            .parse()
            .map_err(|_| DetectError::malformed(format!("confidence {:?} is not a number", raw)))?;
        if !value.is_finite() {
            return Err(DetectError::malformed(format!(
                "confidence {:?} is not finite",
                raw
            )));
        }
        Ok(Self {
            raw: raw.to_string(),
            value,
        })
    }
}

/// A validated successful prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResponse {
    pub defect: String,
    pub confidence: Confidence,
    /// Per-class probabilities in the order the service sent them.
    pub all_predictions: Option<Vec<(String, f64)>>,
}

impl PredictionResponse {
    /// Parses a 2xx body. An `error` field wins over everything else in the body.
    pub fn from_json(body: &[u8]) -> Result<Self, DetectError> {
        let value: Value = serde_json::from_slice(body)?;
        if !value.is_object() {
            return Err(DetectError::malformed("response body is not a JSON object"));
        }
        if let Some(message) = application_error(&value) {
            return Err(DetectError::ApplicationError { message });
        }
        let payload: PredictionPayload = serde_json::from_value(value)?;
        Self::try_from(payload)
    }
}

impl TryFrom<PredictionPayload> for PredictionResponse {
    type Error = DetectError;

    fn try_from(payload: PredictionPayload) -> Result<Self, Self::Error> {
        let defect = payload
            .defect
            .filter(|d| !d.trim().is_empty())
            .ok_or_else(|| DetectError::malformed("missing defect label"))?;

        let confidence = payload
            .confidence
            .ok_or_else(|| DetectError::malformed("missing confidence"))?;
        let confidence = Confidence::parse(&confidence)?;

        let all_predictions = payload
            .all_predictions
            .map(|map| {
                map.into_iter()
                    .map(|(label, prob)| {
                        prob.as_f64()
                            .filter(|p| p.is_finite())
                            .map(|p| (label.clone(), p))
                            .ok_or_else(|| {
                                DetectError::malformed(format!(
                                    "probability for {:?} is not a finite number",
                                    label
                                ))
                            })
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?;

        Ok(Self {
            defect,
            confidence,
            all_predictions,
        })
    }
}

/// Only a non-empty string counts; any other `error` value is ignored.
fn application_error(body: &Value) -> Option<String> {
    body.get("error")?
        .as_str()
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Result of one detection attempt.
pub type Outcome = Result<DisplayModel, DetectError>;

/// Derived view of where the interaction currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UiState {
    Idle,
    FileSelected,
    Detecting,
    ResultShown,
    ErrorShown,
}

impl UiState {
    pub fn derive(has_file: bool, in_flight: bool, last_outcome: Option<&Outcome>) -> Self {
        if in_flight {
            return UiState::Detecting;
        }
        match last_outcome {
            Some(Ok(_)) => UiState::ResultShown,
            Some(Err(_)) => UiState::ErrorShown,
            None if has_file => UiState::FileSelected,
            None => UiState::Idle,
        }
    }
}
