//! Dashboard routes (guarded)
//!
//! - GET /dashboard - Script list
//! - POST /dashboard/scripts - Create a script
//! - POST /dashboard/scripts/:id/toggle - Expand or collapse a script
//! - POST /dashboard/scripts/:id/copy - Copy a script's snippet

use axum::{
    extract::{Path, State},
    response::{Html, Redirect},
    Extension, Form,
};
use serde_json::json;
use std::sync::Arc;

use super::render_page;
use crate::dashboard::{RegistryError, COPY_CONFIRMATION};
use crate::identity::Identity;
use crate::web::dto::CreateScriptForm;
use crate::web::error::WebResult;
use crate::web::state::AppState;

/// GET /dashboard
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
) -> WebResult<Html<String>> {
    if let Err(e) = state.registry.refresh(&identity.id).await {
        tracing::warn!(user_id = %identity.id, error = %e, "Showing cached scripts");
        state.flash.error("Failed to fetch scripts").await;
    }

    let registry = state.registry.snapshot().await;
    render_page(
        &state,
        "dashboard",
        "Dashboard",
        Some(&identity),
        &json!({
            "display_name": identity.display_name(),
            "registry": registry,
            "copy_confirmation_ms": COPY_CONFIRMATION.as_millis() as u64,
        }),
    )
    .await
}

/// POST /dashboard/scripts
pub async fn create_script(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Form(form): Form<CreateScriptForm>,
) -> Redirect {
    match state.registry.create(&identity.id, &form.name).await {
        Ok(_) => state.flash.success("Script created successfully").await,
        Err(RegistryError::EmptyName) => state.flash.error("Script name is required").await,
        Err(e) => {
            tracing::warn!(user_id = %identity.id, error = %e, "Script creation failed");
            state.flash.error("Failed to create script").await;
        }
    }
    Redirect::to("/dashboard")
}

/// POST /dashboard/scripts/:id/toggle
pub async fn toggle_script(
    State(state): State<Arc<AppState>>,
    Path(script_id): Path<String>,
) -> Redirect {
    state.registry.toggle(&script_id).await;
    Redirect::to("/dashboard")
}

/// POST /dashboard/scripts/:id/copy
///
/// Used when the browser could not copy on click: the next page shows the
/// snippet selected for a manual copy.
pub async fn copy_script(
    State(state): State<Arc<AppState>>,
    Path(script_id): Path<String>,
) -> Redirect {
    match state
        .registry
        .copy_snippet(&script_id, &state.clipboard)
        .await
    {
        Ok(_) => {
            state
                .flash
                .info("Clipboard access is unavailable. Copy the selected snippet below.")
                .await
        }
        Err(e) => {
            tracing::warn!(script_id = %script_id, error = %e, "Copy failed");
            state.flash.error("Failed to copy snippet").await;
        }
    }
    Redirect::to("/dashboard")
}
