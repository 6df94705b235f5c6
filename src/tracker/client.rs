//! Analytics Backend REST Client

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use std::time::Duration;

use super::{AnalyticsBackend, AnalyticsPage, CreatedScript, GraphPoint, TrackEvent};
use crate::error::{BackendError, BackendResult};

/// Analytics backend REST client
pub struct TrackerClient {
    client: Client,
    config: TrackerConfig,
}

/// Configuration for the analytics client
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Base URL (e.g., "https://visitloggerbackend.vercel.app")
    pub base_url: String,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            base_url: "https://visitloggerbackend.vercel.app".to_string(),
            request_timeout_ms: 10_000,
        }
    }
}

impl TrackerConfig {
    /// Ingestion endpoint embedded in tracking snippets
    pub fn track_url(&self) -> String {
        format!("{}/track", self.base_url.trim_end_matches('/'))
    }
}

impl TrackerClient {
    /// Create a new analytics client
    pub fn new(config: TrackerConfig) -> BackendResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;

        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn send(&self, request: RequestBuilder) -> BackendResult<Response> {
        let response = request.send().await.map_err(BackendError::from_reqwest)?;

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(BackendError::from_response(response).await)
        }
    }
}

/// Extract the `graphData` series from a graph response body
pub(crate) fn parse_graph(body: serde_json::Value) -> BackendResult<Vec<GraphPoint>> {
    match body.get("graphData") {
        Some(data) if data.is_array() => serde_json::from_value(data.clone())
            .map_err(|e| BackendError::InvalidResponse(e.to_string())),
        _ => Err(BackendError::InvalidResponse(
            "Invalid data format received".to_string(),
        )),
    }
}

#[async_trait]
impl AnalyticsBackend for TrackerClient {
    async fn create_script(&self, owner_id: &str, name: &str) -> BackendResult<CreatedScript> {
        let body = serde_json::json!({ "userId": owner_id, "scriptName": name });

        let response = self
            .send(self.client.post(self.url("/script")).json(&body))
            .await?;

        response
            .json()
            .await
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))
    }

    async fn fetch_analytics(
        &self,
        script_id: &str,
        page: u32,
        limit: u32,
    ) -> BackendResult<AnalyticsPage> {
        let url = self.url(&format!("/analytics/{}", urlencoding::encode(script_id)));

        let response = self
            .send(self.client.get(url).query(&[("page", page), ("limit", limit)]))
            .await?;

        response
            .json()
            .await
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))
    }

    async fn fetch_graph(&self, script_id: &str, days: u32) -> BackendResult<Vec<GraphPoint>> {
        let url = self.url(&format!(
            "/analytics/graph/{}",
            urlencoding::encode(script_id)
        ));

        let response = self
            .send(self.client.get(url).query(&[("days", days)]))
            .await?;

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))?;

        tracing::debug!(script_id = %script_id, days, "Received graph data");
        parse_graph(body)
    }

    async fn track(&self, event: &TrackEvent) -> BackendResult<()> {
        self.send(self.client.post(self.url("/track")).json(event))
            .await?;
        Ok(())
    }
}
