//! Route guard middleware for protected pages

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{Html, IntoResponse, Redirect, Response},
};
use std::sync::Arc;

use super::state::AppState;
use crate::session::{guard, GuardDecision};

/// Seconds between reloads of the loading page
const LOADING_REFRESH_SECS: u32 = 1;

/// Let signed-in requests through with their `Identity` as an extension,
/// show a self-refreshing loading page while the session check runs, and
/// send everyone else to `/login`.
pub async fn require_identity(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let snapshot = state.session.snapshot().await;

    match guard(&snapshot) {
        GuardDecision::Allow(identity) => {
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        GuardDecision::Loading => {
            let data = state
                .page_data(
                    "Loading",
                    None,
                    &serde_json::json!({ "refresh": LOADING_REFRESH_SECS }),
                )
                .await;
            match state.templates.render("loading", &data) {
                Ok(html) => Html(html).into_response(),
                Err(e) => super::error::WebError::from(e).into_response(),
            }
        }
        GuardDecision::RedirectToLogin => {
            tracing::debug!(path = %request.uri().path(), "Not signed in, redirecting to login");
            Redirect::to("/login").into_response()
        }
    }
}
