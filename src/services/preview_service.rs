use crate::error::AppError;
use crate::models::detect_types::SelectedFile;
use base64::Engine;

/// Reads the file into a `data:` URL suitable for an image preview surface.
///
/// Encoding runs on the blocking pool so large images do not stall the caller.
pub async fn read_as_data_url(file: SelectedFile) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || encode_data_url(&file))
        .await
        .map_err(|e| AppError {
            message: format!("Preview task failed: {}", e),
        })
}

pub fn encode_data_url(file: &SelectedFile) -> String {
    let b64 = base64::engine::general_purpose::STANDARD.encode(file.bytes());
    format!("data:{};base64,{}", file.mime_type(), b64)
}
