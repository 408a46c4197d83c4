use crate::models::detect_types::PredictionResponse;
use crate::models::display_types::{BreakdownEntry, ConfidenceTier, DisplayModel};

/// Turns a validated response into a display model. Pure and synchronous.
pub fn render(response: &PredictionResponse) -> DisplayModel {
    DisplayModel {
        defect: response.defect.clone(),
        confidence_label: response.confidence.raw.clone(),
        confidence: response.confidence.value,
        tier: ConfidenceTier::from_confidence(response.confidence.value),
        breakdown: response.all_predictions.as_deref().map(rank),
    }
}

/// Sorts probabilities highest first. Equal probabilities keep their wire order.
fn rank(predictions: &[(String, f64)]) -> Vec<BreakdownEntry> {
    let mut sorted: Vec<&(String, f64)> = predictions.iter().collect();
    sorted.sort_by(|a, b| b.1.total_cmp(&a.1));

    sorted
        .into_iter()
        .enumerate()
        .map(|(index, (label, probability))| {
            // Values outside [0, 1] are passed through unclamped
            let percent = round_2dp(probability * 100.0);
            BreakdownEntry {
                label: label.clone(),
                probability: *probability,
                percent,
                percent_label: format!("{:.2}", probability * 100.0),
                is_top: index == 0,
            }
        })
        .collect()
}

fn round_2dp(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
