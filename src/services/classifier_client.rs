use crate::config::ClientConfig;
use crate::error::{AppError, DetectError};
use crate::models::detect_types::{PredictionResponse, SelectedFile};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};

pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 1024 * 1024;

/// Something that can classify one uploaded image.
#[async_trait]
pub trait ClassifierClient: Send + Sync {
    async fn predict(&self, file: &SelectedFile) -> Result<PredictionResponse, DetectError>;
}

/// Talks to the classification service over `POST {base_url}/predict`.
#[derive(Clone)]
pub struct HttpClassifier {
    client: reqwest::Client,
    predict_url: String,
    field_name: String,
    max_response_bytes: usize,
}

impl HttpClassifier {
    pub fn new(config: &ClientConfig) -> Result<Self, AppError> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Self {
            client,
            predict_url: config.predict_url(),
            field_name: config.field_name.clone(),
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
        })
    }

    /// Largest 2xx body accepted before the response counts as malformed.
    pub fn with_max_response_bytes(mut self, limit: usize) -> Self {
        self.max_response_bytes = limit;
        self
    }

    pub fn predict_url(&self) -> &str {
        &self.predict_url
    }

    fn form(&self, file: &SelectedFile) -> Result<Form, DetectError> {
        let part = Part::bytes(file.bytes().to_vec())
            .file_name(file.name().to_string())
            .mime_str(file.mime_type())
            .map_err(|e| DetectError::transport(format!("Invalid MIME type: {}", e)))?;
        Ok(Form::new().part(self.field_name.clone(), part))
    }
}

#[async_trait]
impl ClassifierClient for HttpClassifier {
    async fn predict(&self, file: &SelectedFile) -> Result<PredictionResponse, DetectError> {
        let form = self.form(file)?;

        tracing::info!(
            "Uploading {} ({} bytes) to {}",
            file.name(),
            file.len(),
            self.predict_url
        );

        let response = self
            .client
            .post(&self.predict_url)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DetectError::HttpStatus {
                status: status.as_u16(),
            });
        }

        let body = read_capped(response, self.max_response_bytes).await?;
        PredictionResponse::from_json(&body)
    }
}

async fn read_capped(mut response: reqwest::Response, limit: usize) -> Result<Vec<u8>, DetectError> {
    let too_large = || DetectError::malformed(format!("response body exceeds {} bytes", limit));

    if response.content_length().is_some_and(|len| len > limit as u64) {
        return Err(too_large());
    }

    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        if body.len() + chunk.len() > limit {
            return Err(too_large());
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}
