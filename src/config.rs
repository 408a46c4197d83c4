use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_FIELD_NAME: &str = "image";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

const ENV_API_URL: &str = "DEFECT_LENS_API_URL";
const ENV_TIMEOUT_SECS: &str = "DEFECT_LENS_TIMEOUT_SECS";

/// Where and how the client talks to the classification service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    /// Multipart field the file is uploaded under.
    pub field_name: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            field_name: DEFAULT_FIELD_NAME.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, AppError> {
        let config: ClientConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub async fn load(path: &Path) -> Result<Self, AppError> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| AppError {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    /// Applies `DEFECT_LENS_API_URL` and `DEFECT_LENS_TIMEOUT_SECS` when set.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(ENV_API_URL).filter(|u| !u.trim().is_empty()) {
            self.base_url = url.trim().to_string();
        }
        if let Some(secs) = lookup(ENV_TIMEOUT_SECS).and_then(|s| s.trim().parse::<u64>().ok()) {
            self.timeout_secs = secs;
        }
        self
    }

    pub fn validate(&self) -> Result<(), AppError> {
        let url = reqwest::Url::parse(&self.base_url).map_err(|e| AppError {
            message: format!("Invalid base_url {:?}: {}", self.base_url, e),
        })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(format!("base_url must use http or https, got {}", url.scheme()).into());
        }
        if self.field_name.trim().is_empty() {
            return Err("field_name must not be empty".into());
        }
        if self.timeout_secs == 0 {
            return Err("timeout_secs must be greater than zero".into());
        }
        Ok(())
    }

    pub fn predict_url(&self) -> String {
        format!("{}/predict", self.base_url.trim_end_matches('/'))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_point_at_local_service() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://127.0.0.1:5000");
        assert_eq!(config.field_name, "image");
        assert_eq!(config.predict_url(), "http://127.0.0.1:5000/predict");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn predict_url_strips_trailing_slash() {
        let config = ClientConfig {
            base_url: "https://inspect.example.com/api/".into(),
            ..Default::default()
        };
        assert_eq!(config.predict_url(), "https://inspect.example.com/api/predict");
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = ClientConfig::from_toml_str("timeout_secs = 5\n").unwrap();
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn rejects_non_http_scheme() {
        let err = ClientConfig::from_toml_str("base_url = \"ftp://host\"\n").unwrap_err();
        assert!(err.message.contains("http"));
    }

    #[test]
    fn rejects_zero_timeout_and_empty_field() {
        let mut config = ClientConfig {
            timeout_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        config.timeout_secs = 1;
        config.field_name = "  ".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn overrides_replace_url_and_ignore_bad_timeout() {
        let config = ClientConfig::default().with_overrides(|key| match key {
            ENV_API_URL => Some(" http://10.0.0.2:8080 ".into()),
            ENV_TIMEOUT_SECS => Some("soon".into()),
            _ => None,
        });
        assert_eq!(config.base_url, "http://10.0.0.2:8080");
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[tokio::test]
    async fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "base_url = \"http://localhost:9000\"").unwrap();
        writeln!(file, "field_name = \"upload\"").unwrap();

        let config = ClientConfig::load(file.path()).await.unwrap();
        assert_eq!(config.predict_url(), "http://localhost:9000/predict");
        assert_eq!(config.field_name, "upload");
    }

    #[tokio::test]
    async fn missing_file_reports_path() {
        let err = ClientConfig::load(Path::new("/nonexistent/defect-lens.toml"))
            .await
            .unwrap_err();
        assert!(err.message.contains("defect-lens.toml"));
    }
}
