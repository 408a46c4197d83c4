use crate::error::DetectError;
use crate::models::detect_types::Outcome;
use crate::models::display_types::{PanelContent, TriggerState};
use crate::services::renderer;
use crate::session::DetectorSession;

/// Handles the "detect" action.
///
/// Returns `None` when a request is already in flight (the trigger is disabled
/// then, so this only happens if a caller bypasses it). Otherwise exactly one
/// outcome is produced and shown, and the trigger is idle again on return.
pub async fn detect(session: &DetectorSession) -> Option<Outcome> {
    let surface = session.surface();
    let base_url = session.config().base_url.as_str();

    // 1. Precondition: never enter Detecting without a file
    let Some(file) = session.selected_file() else {
        let error = DetectError::NoFileSelected;
        surface.set_result_panel(Some(&PanelContent::error(error.clone(), base_url)));
        if !session.is_in_flight() {
            surface.set_trigger(&TriggerState::idle());
        }
        session.record_outcome(Err(error.clone()));
        return Some(Err(error));
    };

    // 2. Claim the in-flight slot; the guard restores the trigger on every exit
    let Some(_guard) = session.try_begin_detection() else {
        tracing::debug!("Detection already in flight; ignoring trigger");
        return None;
    };
    surface.set_result_panel(Some(&PanelContent::analyzing()));

    // 3. One upload, no retry
    let outcome = session
        .client()
        .predict(&file)
        .await
        .map(|response| renderer::render(&response));

    // 4. Show whatever came back
    match &outcome {
        Ok(model) => {
            tracing::info!(
                "Detected {} for {} at {} ({:?})",
                model.defect,
                file.name(),
                model.confidence_label,
                model.tier
            );
            surface.set_result_panel(Some(&PanelContent::Result {
                model: model.clone(),
            }));
        }
        Err(error) => {
            if error.is_transport_class() {
                tracing::warn!("Detection for {} failed: {}", file.name(), error);
            } else {
                tracing::info!("Service rejected {}: {}", file.name(), error);
            }
            surface.set_result_panel(Some(&PanelContent::error(error.clone(), base_url)));
        }
    }

    session.record_outcome(outcome.clone());
    Some(outcome)
}
