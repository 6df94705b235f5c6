//! Request and response shapes for page handlers

use serde::{Deserialize, Serialize};

/// `GET /login?mode=signup`
#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    #[serde(default)]
    pub mode: Option<String>,
}

impl LoginQuery {
    pub fn is_signup(&self) -> bool {
        self.mode.as_deref() == Some("signup")
    }
}

/// Token delivered to `/oauth/callback` by the identity backend
#[derive(Debug, Default, Deserialize)]
pub struct OAuthCallbackQuery {
    #[serde(default, rename = "userId")]
    pub user_id: String,
    #[serde(default)]
    pub secret: String,
}

/// `POST /dashboard/scripts`
#[derive(Debug, Default, Deserialize)]
pub struct CreateScriptForm {
    #[serde(default)]
    pub name: String,
}

/// `GET /analytics/:scriptId?name=&page=&days=`
#[derive(Debug, Default, Deserialize)]
pub struct AnalyticsQuery {
    pub name: Option<String>,
    pub page: Option<u32>,
    pub days: Option<u32>,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub session: String,
    pub uptime_seconds: u64,
    pub version: String,
}
