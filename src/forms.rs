//! Login / signup / recovery form validation
//!
//! Field-scoped checks run before the session store is called. Messages
//! are keyed by field so each can be shown under its input.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use thiserror::Error;

/// Minimum password length accepted by the forms
pub const MIN_PASSWORD_LEN: usize = 8;

fn is_email(value: &str) -> bool {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok())
        .as_ref()
        .is_some_and(|re| re.is_match(value))
}

/// Which form is being submitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormMode {
    #[default]
    Login,
    Signup,
}

impl FormMode {
    pub fn is_signup(self) -> bool {
        self == FormMode::Signup
    }
}

/// Submitted credentials
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CredentialsForm {
    #[serde(default)]
    pub mode: FormMode,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Per-field messages; `submit` holds errors returned by the backend
#[derive(Error, Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[error("Form has invalid fields")]
pub struct FormErrors {
    pub email: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
    pub submit: Option<String>,
}

impl FormErrors {
    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.password.is_none()
            && self.confirm_password.is_none()
            && self.submit.is_none()
    }

    /// Form-level error from a failed submission
    pub fn submit(message: impl Into<String>) -> Self {
        Self {
            submit: Some(message.into()),
            ..Default::default()
        }
    }
}

/// Message for an invalid email, if any
pub fn validate_email(email: &str) -> Option<String> {
    let email = email.trim();
    if email.is_empty() {
        Some("Email is required".to_string())
    } else if !is_email(email) {
        Some("Please enter a valid email".to_string())
    } else {
        None
    }
}

fn validate_password(password: &str) -> Option<String> {
    if password.is_empty() {
        Some("Password is required".to_string())
    } else if password.chars().count() < MIN_PASSWORD_LEN {
        Some(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        ))
    } else {
        None
    }
}

impl CredentialsForm {
    /// Check every field for the form's mode
    pub fn validate(&self) -> Result<(), FormErrors> {
        let errors = FormErrors {
            email: validate_email(&self.email),
            password: validate_password(&self.password),
            confirm_password: if self.mode.is_signup() && self.confirm_password != self.password {
                Some("Passwords do not match".to_string())
            } else {
                None
            },
            submit: None,
        };

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Display name for signup, if one was entered
    pub fn display_name(&self) -> Option<&str> {
        self.name.as_deref().map(str::trim).filter(|n| !n.is_empty())
    }
}

/// Password recovery request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecoveryForm {
    #[serde(default)]
    pub email: String,
}
