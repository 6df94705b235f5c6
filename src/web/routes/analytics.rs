//! Analytics route (guarded)
//!
//! - GET /analytics/:scriptId?name=&page=&days=

use axum::{
    extract::{Path, Query, State},
    response::Html,
    Extension,
};
use serde_json::json;
use std::sync::Arc;

use super::render_page;
use crate::analytics::DayWindow;
use crate::identity::Identity;
use crate::web::dto::AnalyticsQuery;
use crate::web::error::WebResult;
use crate::web::state::AppState;

/// Highest page a request may ask for, so the next-page link stays representable
const MAX_PAGE: u32 = u32::MAX - 1;

fn page_url(script_id: &str, name: &str, page: u32, days: u32) -> String {
    format!(
        "/analytics/{}?name={}&page={}&days={}",
        urlencoding::encode(script_id),
        urlencoding::encode(name),
        page,
        days
    )
}

/// GET /analytics/:scriptId
pub async fn analytics(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(script_id): Path<String>,
    Query(query): Query<AnalyticsQuery>,
) -> WebResult<Html<String>> {
    let window = query
        .days
        .and_then(DayWindow::from_days)
        .unwrap_or_default();

    let name = match query.name.filter(|n| !n.trim().is_empty()) {
        Some(name) => name,
        None => state
            .registry
            .get(&script_id)
            .await
            .map(|s| s.name)
            .unwrap_or_else(|| script_id.clone()),
    };

    let view = state.analytics_view(&script_id).await;
    let (table, _) = tokio::join!(
        view.table.load_page(query.page.unwrap_or(1).clamp(1, MAX_PAGE)),
        view.graph.load(window)
    );
    let graph = view.graph.snapshot().await;

    let days = window.days();
    render_page(
        &state,
        "analytics",
        &format!("Analytics for {}", name),
        Some(&identity),
        &json!({
            "script_id": script_id,
            "name": name,
            "prev_url": page_url(&script_id, &name, table.page.saturating_sub(1).max(1), days),
            "next_url": page_url(&script_id, &name, table.page.saturating_add(1), days),
            "table": table,
            "graph": graph,
        }),
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_url_encodes() {
        assert_eq!(
            page_url("s 1", "My Blog", 2, 30),
            "/analytics/s%201?name=My%20Blog&page=2&days=30"
        );
    }
}
