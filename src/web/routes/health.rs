//! Health Routes
//!
//! - GET /health - Process status and session phase

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::web::dto::HealthResponse;
use crate::web::state::AppState;

/// GET /health
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let snapshot = state.session.snapshot().await;
    let session = serde_json::to_value(snapshot.phase)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default();

    Json(HealthResponse {
        status: "ok".to_string(),
        session,
        uptime_seconds: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
