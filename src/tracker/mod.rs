//! Analytics Backend
//!
//! REST API that generates tracking scripts, ingests visits and serves
//! paginated and aggregated analytics.

mod client;
mod models;

pub(crate) use client::parse_graph;
pub use client::{TrackerClient, TrackerConfig};
pub use models::{
    AnalyticsPage, AnalyticsRecord, CreatedScript, GraphPoint, Script, TrackEvent,
};

use async_trait::async_trait;

use crate::error::BackendResult;

/// Operations consumed from the analytics backend
#[async_trait]
pub trait AnalyticsBackend: Send + Sync {
    /// `POST /script`
    async fn create_script(&self, owner_id: &str, name: &str) -> BackendResult<CreatedScript>;

    /// `GET /analytics/:scriptId?page=&limit=`
    async fn fetch_analytics(
        &self,
        script_id: &str,
        page: u32,
        limit: u32,
    ) -> BackendResult<AnalyticsPage>;

    /// `GET /analytics/graph/:scriptId?days=`
    ///
    /// Fails with `InvalidResponse` when the body has no `graphData` array.
    async fn fetch_graph(&self, script_id: &str, days: u32) -> BackendResult<Vec<GraphPoint>>;

    /// `POST /track`
    async fn track(&self, event: &TrackEvent) -> BackendResult<()>;
}
