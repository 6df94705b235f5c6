//! Application State
//!
//! Shared state accessible by all page handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

use super::flash::Flash;
use super::templates::Templates;
use crate::analytics::AnalyticsView;
use crate::config::Config;
use crate::dashboard::{snippet, PendingClipboard, RegistryConfig, ScriptRegistry};
use crate::identity::{Identity, IdentityBackend};
use crate::session::{SessionConfig, SessionStore};
use crate::tracker::AnalyticsBackend;

/// Shared application state for all handlers
pub struct AppState {
    /// Process-wide authentication state
    pub session: Arc<SessionStore>,
    /// Scripts of the signed-in identity
    pub registry: Arc<ScriptRegistry>,
    /// Analytics backend
    pub tracker: Arc<dyn AnalyticsBackend>,
    /// Per-script analytics views, created on first visit
    analytics: RwLock<HashMap<String, Arc<AnalyticsView>>>,
    /// Compiled page templates
    pub templates: Templates,
    /// Toasts for the next rendered page
    pub flash: Flash,
    /// Snippet the next page offers for manual copying
    pub clipboard: PendingClipboard,
    /// Web configuration
    pub config: WebConfig,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

/// Web front-end configuration
#[derive(Debug, Clone)]
pub struct WebConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Rows per analytics page
    pub page_size: u32,
    /// Ingestion endpoint shown in the documentation sample
    pub track_url: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8085,
            page_size: 10,
            track_url: "https://visitloggerbackend.vercel.app/track".to_string(),
        }
    }
}

impl WebConfig {
    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl AppState {
    pub fn new(
        identity: Arc<dyn IdentityBackend>,
        tracker: Arc<dyn AnalyticsBackend>,
        session_config: SessionConfig,
        registry_config: RegistryConfig,
        config: WebConfig,
    ) -> Result<Self, handlebars::TemplateError> {
        Ok(Self {
            session: Arc::new(SessionStore::new(Arc::clone(&identity), session_config)),
            registry: Arc::new(ScriptRegistry::new(
                identity,
                Arc::clone(&tracker),
                registry_config,
            )),
            tracker,
            analytics: RwLock::new(HashMap::new()),
            templates: Templates::new()?,
            flash: Flash::new(),
            clipboard: PendingClipboard::new(),
            config,
            start_time: Instant::now(),
        })
    }

    /// Build state from the loaded configuration
    pub fn from_config(
        identity: Arc<dyn IdentityBackend>,
        tracker: Arc<dyn AnalyticsBackend>,
        config: &Config,
    ) -> Result<Self, handlebars::TemplateError> {
        let track_url = config.tracker_client().track_url();
        Self::new(
            identity,
            tracker,
            config.session(),
            RegistryConfig {
                database_id: config.identity.database_id.clone(),
                collection_id: config.identity.scripts_collection_id.clone(),
                track_url: track_url.clone(),
            },
            WebConfig {
                host: config.server.host.clone(),
                port: config.server.port,
                page_size: config.analytics.page_size,
                track_url,
            },
        )
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Analytics view for `script_id`. Views are kept only for scripts in
    /// the registry; any other id gets a fresh view per request.
    pub async fn analytics_view(&self, script_id: &str) -> Arc<AnalyticsView> {
        if let Some(view) = self.analytics.read().await.get(script_id) {
            return Arc::clone(view);
        }

        let view = Arc::new(AnalyticsView::new(
            Arc::clone(&self.tracker),
            script_id,
            self.config.page_size,
        ));
        if self.registry.get(script_id).await.is_none() {
            tracing::debug!(script_id = %script_id, "Script not in registry, view not kept");
            return view;
        }

        let mut views = self.analytics.write().await;
        Arc::clone(views.entry(script_id.to_string()).or_insert(view))
    }

    /// Drop every analytics view (on sign-out)
    pub async fn clear_analytics(&self) {
        self.analytics.write().await.clear();
    }

    /// Documentation sample snippet
    pub fn sample_snippet(&self) -> String {
        snippet::sample(&self.config.track_url)
    }

    /// Template data shared by every page, merged with `page`
    pub async fn page_data<T: Serialize>(
        &self,
        title: &str,
        identity: Option<&Identity>,
        page: &T,
    ) -> Value {
        let mut data = serde_json::to_value(page).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to serialize page data");
            Value::Null
        });
        if !data.is_object() {
            data = json!({});
        }

        let clipboard = self.clipboard.take();
        if let Value::Object(map) = &mut data {
            map.insert("title".to_string(), json!(title));
            map.insert("identity".to_string(), json!(identity));
            map.insert("flash".to_string(), json!(self.flash.take().await));
            map.insert("clipboard".to_string(), json!(clipboard));
        }
        data
    }
}
