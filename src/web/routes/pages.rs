//! Presentation shell: landing, documentation and terms pages

use axum::{
    extract::State,
    response::{Html, Redirect},
};
use serde_json::json;
use std::sync::Arc;

use super::render_page;
use crate::dashboard::COPY_CONFIRMATION;
use crate::web::error::WebResult;
use crate::web::state::AppState;

const FEATURES: [(&str, &str); 3] = [
    (
        "Global Edge Network",
        "Track visitors from anywhere with our distributed tracking infrastructure",
    ),
    (
        "One-Line Integration",
        "Add our script with a single line of code. No complex setup required",
    ),
    (
        "Real-Time Metrics",
        "Get instant insights with live updates and comprehensive analytics",
    ),
];

/// GET /
pub async fn landing(State(state): State<Arc<AppState>>) -> WebResult<Html<String>> {
    let identity = state.session.identity().await;
    let features: Vec<_> = FEATURES
        .iter()
        .map(|(title, description)| json!({ "title": title, "description": description }))
        .collect();

    render_page(
        &state,
        "landing",
        "Website Analytics",
        identity.as_ref(),
        &json!({ "features": features }),
    )
    .await
}

/// GET /doc
pub async fn documentation(State(state): State<Arc<AppState>>) -> WebResult<Html<String>> {
    let identity = state.session.identity().await;
    render_page(
        &state,
        "doc",
        "Documentation",
        identity.as_ref(),
        &json!({
            "sample": state.sample_snippet(),
            "copy_confirmation_ms": COPY_CONFIRMATION.as_millis() as u64,
        }),
    )
    .await
}

/// GET /terms
pub async fn terms(State(state): State<Arc<AppState>>) -> WebResult<Html<String>> {
    let identity = state.session.identity().await;
    render_page(&state, "terms", "Terms & Privacy", identity.as_ref(), &json!({})).await
}

/// Any unknown path
pub async fn fallback() -> Redirect {
    Redirect::to("/login")
}
