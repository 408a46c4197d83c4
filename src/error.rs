use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Setup-time failure: loading configuration, reading a file, building the HTTP client.
#[derive(Debug, Serialize)]
pub struct AppError {
    pub message: String,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError {
            message: format!("HTTP client error: {}", err),
        }
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError {
            message: format!("Invalid configuration: {}", err),
        }
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError { message: msg }
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError {
            message: msg.to_string(),
        }
    }
}

/// Terminal outcome of a failed detection attempt.
///
/// `Transport`, `HttpStatus` and `MalformedResponse` form the transport class:
/// they keep their diagnostic detail but present the same message to the user.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DetectError {
    #[error("no image selected")]
    NoFileSelected,

    #[error("request failed: {reason}")]
    Transport { reason: String },

    #[error("server responded with HTTP {status}")]
    HttpStatus { status: u16 },

    #[error("{message}")]
    ApplicationError { message: String },

    #[error("malformed response: {reason}")]
    MalformedResponse { reason: String },
}

impl DetectError {
    pub fn transport(reason: impl Into<String>) -> Self {
        Self::Transport {
            reason: reason.into(),
        }
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            reason: reason.into(),
        }
    }

    pub fn is_transport_class(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. } | Self::HttpStatus { .. } | Self::MalformedResponse { .. }
        )
    }

    /// Text shown in the result panel.
    pub fn user_message(&self, base_url: &str) -> String {
        match self {
            Self::NoFileSelected => "Please upload an image first.".to_string(),
            Self::ApplicationError { message } => format!("Error: {}", message),
            _ => format!(
                "Error connecting to server. Make sure the classification service is running on {}",
                base_url
            ),
        }
    }
}

impl From<reqwest::Error> for DetectError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return DetectError::malformed(err.to_string());
        }
        match err.status() {
            Some(status) if !status.is_success() => DetectError::HttpStatus {
                status: status.as_u16(),
            },
            _ => DetectError::transport(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for DetectError {
    fn from(err: serde_json::Error) -> Self {
        DetectError::malformed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_class_shares_one_message() {
        let base = "http://127.0.0.1:5000";
        let transport = DetectError::transport("connection refused").user_message(base);
        let status = DetectError::HttpStatus { status: 503 }.user_message(base);
        let malformed = DetectError::malformed("expected value").user_message(base);

        assert_eq!(transport, status);
        assert_eq!(status, malformed);
        assert!(transport.contains(base));
    }

    #[test]
    fn application_error_carries_server_message() {
        let err = DetectError::ApplicationError {
            message: "Could not decode image".into(),
        };
        assert!(!err.is_transport_class());
        assert_eq!(err.user_message("x"), "Error: Could not decode image");
    }

    #[test]
    fn no_file_is_not_transport_class() {
        assert!(!DetectError::NoFileSelected.is_transport_class());
        assert_eq!(
            DetectError::NoFileSelected.user_message("x"),
            "Please upload an image first."
        );
    }

    #[test]
    fn serializes_with_kind_tag() {
        let json = serde_json::to_value(DetectError::HttpStatus { status: 500 }).unwrap();
        assert_eq!(json["kind"], "http_status");
        assert_eq!(json["status"], 500);
    }

    #[test]
    fn app_error_from_reqwest() {
        let err: AppError = reqwest::Client::new().get("not a url").build().unwrap_err().into();
        assert!(err.message.starts_with("HTTP client error"), "{}", err);
    }

    #[test]
    fn app_error_from_str() {
        let err: AppError = "boom".into();
        assert_eq!(err.to_string(), "boom");
    }
}
