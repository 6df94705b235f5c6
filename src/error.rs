//! Backend error types
//!
//! Errors shared by the identity backend client and the analytics
//! backend client.

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when talking to either backend
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Backend unavailable")]
    Unavailable,

    #[error("Request timeout")]
    Timeout,

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Non-success response from the backend
    #[error("{message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// Response arrived but did not have the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid client configuration: {0}")]
    Config(String),
}

/// Result type alias for backend calls
pub type BackendResult<T> = Result<T, BackendError>;

/// Error body returned by the identity backend (`{message, code, type}`)
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl BackendError {
    /// Build an API error from a status code and message
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        BackendError::Api {
            status,
            code: None,
            message: message.into(),
        }
    }

    /// HTTP status of the failed response, if the backend answered
    pub fn status(&self) -> Option<u16> {
        match self {
            BackendError::Api { status, .. } => Some(*status),
            BackendError::Request(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// True when the backend reported that no session exists
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// Machine-readable code: the backend's error type when it sent one,
    /// otherwise the HTTP status.
    pub fn code(&self) -> Option<String> {
        match self {
            BackendError::Api {
                code: Some(code), ..
            } => Some(code.clone()),
            _ => self.status().map(|s| s.to_string()),
        }
    }

    /// Message suitable for showing to a user
    pub fn user_message(&self) -> Option<String> {
        let message = match self {
            BackendError::Api { message, .. } => message.trim().to_string(),
            other => other.to_string(),
        };

        if message.is_empty() {
            None
        } else {
            Some(message)
        }
    }

    /// Classify a transport error
    pub(crate) fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            BackendError::Timeout
        } else if e.is_connect() {
            BackendError::Unavailable
        } else {
            BackendError::Request(e)
        }
    }

    /// Turn a non-success response into an API error
    pub(crate) async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        let (message, code) = match serde_json::from_str::<ErrorBody>(&text) {
            Ok(body) => (
                body.message.or(body.error).unwrap_or_default(),
                body.kind,
            ),
            Err(_) => (text, None),
        };

        let message = if message.trim().is_empty() {
            status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string()
        } else {
            message
        };

        BackendError::Api {
            status: status.as_u16(),
            code,
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_detection() {
        let err = BackendError::api(401, "User (role: guests) missing scope (account)");
        assert!(err.is_unauthorized());
        assert_eq!(err.code(), Some("401".to_string()));

        let err = BackendError::api(500, "boom");
        assert!(!err.is_unauthorized());
    }

    #[test]
    fn test_code_prefers_backend_type() {
        let err = BackendError::Api {
            status: 401,
            code: Some("user_invalid_credentials".to_string()),
            message: "Invalid credentials".to_string(),
        };
        assert_eq!(err.code(), Some("user_invalid_credentials".to_string()));
        assert_eq!(err.to_string(), "Invalid credentials");
    }

    #[test]
    fn test_user_message() {
        assert_eq!(BackendError::api(400, "  ").user_message(), None);
        assert_eq!(
            BackendError::Timeout.user_message(),
            Some("Request timeout".to_string())
        );
        assert_eq!(BackendError::Timeout.code(), None);
    }
}
