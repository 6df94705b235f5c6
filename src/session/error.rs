//! Authentication error type
//!
//! Every failure coming out of the session store is normalized to a
//! message plus a code so forms and toasts can show it consistently.

use serde::Serialize;
use thiserror::Error;

use crate::error::BackendError;

/// Code for missing or malformed credentials
pub const INVALID_CREDENTIALS: &str = "INVALID_CREDENTIALS";

/// Code used when the backend gave none
pub const UNKNOWN_ERROR: &str = "UNKNOWN_ERROR";

/// Normalized authentication error
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{message}")]
pub struct AuthError {
    pub message: String,
    pub code: String,
}

impl AuthError {
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
        }
    }

    /// Email or password missing
    pub fn credentials_required() -> Self {
        Self::new("Email and password are required", INVALID_CREDENTIALS)
    }

    /// Normalize a backend error, using `fallback` when it carries no message
    pub fn from_backend(err: &BackendError, fallback: &str) -> Self {
        Self {
            message: err.user_message().unwrap_or_else(|| fallback.to_string()),
            code: err.code().unwrap_or_else(|| UNKNOWN_ERROR.to_string()),
        }
    }
}
