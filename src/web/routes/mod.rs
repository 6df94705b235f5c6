//! Page Routes
//!
//! Route handlers organized by screen.

pub mod analytics;
pub mod auth;
pub mod dashboard;
pub mod health;
pub mod pages;

use axum::response::Html;
use serde::Serialize;
use std::sync::Arc;

use super::error::WebResult;
use super::state::AppState;
use crate::identity::Identity;

/// Render `template` with the shared page data
pub(crate) async fn render_page<T: Serialize>(
    state: &Arc<AppState>,
    template: &str,
    title: &str,
    identity: Option<&Identity>,
    page: &T,
) -> WebResult<Html<String>> {
    let data = state.page_data(title, identity, page).await;
    Ok(Html(state.templates.render(template, &data)?))
}
