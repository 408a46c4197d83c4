//! Client core for a defect classification service.
//!
//! A [`DetectorSession`] ties together the selected image, the HTTP client and
//! a [`UiSurface`] supplied by the presentation layer. [`select_files`] handles
//! a change of the file input, [`detect`] uploads the current image and shows
//! the ranked result or error.

pub mod commands;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod session;
pub mod surface;

pub use commands::detection::detect;
pub use commands::selection::select_files;
pub use config::ClientConfig;
pub use error::{AppError, DetectError};
pub use models::detect_types::{Outcome, PredictionResponse, SelectedFile, UiState};
pub use models::display_types::{
    BreakdownEntry, ConfidenceTier, DisplayModel, FileLabel, PanelContent, TriggerState,
};
pub use services::classifier_client::{ClassifierClient, HttpClassifier};
pub use services::renderer::render;
pub use session::DetectorSession;
pub use surface::{MemorySurface, UiSurface};
