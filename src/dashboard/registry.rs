//! Script Registry
//!
//! Per-identity list of tracking scripts. The list is only ever replaced by
//! re-querying the document backend; creating a script re-lists instead of
//! appending so the shown snippet is the one the backend generated.

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;
use tokio::time::Instant;

use super::clipboard::{Clipboard, ClipboardError};
use super::snippet;
use crate::error::BackendError;
use crate::identity::{DocumentQuery, IdentityBackend};
use crate::tracker::{AnalyticsBackend, CreatedScript, Script};

/// How long the "Copied!" confirmation stays visible
pub const COPY_CONFIRMATION: Duration = Duration::from_secs(2);

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Script name is required")]
    EmptyName,

    #[error("Script not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Clipboard(#[from] ClipboardError),
}

pub type RegistryResult<T> = Result<T, RegistryError>;

/// Where script documents live and where snippets report to
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    pub database_id: String,
    pub collection_id: String,
    /// Ingestion endpoint used when filling in the snippet template
    pub track_url: String,
}

#[derive(Debug, Default)]
struct RegistryState {
    owner_id: Option<String>,
    scripts: Vec<Script>,
    expanded: Option<String>,
    copied: Option<(String, Instant)>,
    loading: bool,
}

/// One row of the dashboard
#[derive(Debug, Clone, Serialize)]
pub struct ScriptView {
    pub script_id: String,
    pub name: String,
    pub embed_code: String,
    pub expanded: bool,
    pub copied: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegistrySnapshot {
    pub scripts: Vec<ScriptView>,
    pub loading: bool,
}

pub struct ScriptRegistry {
    identity: Arc<dyn IdentityBackend>,
    tracker: Arc<dyn AnalyticsBackend>,
    config: RegistryConfig,
    state: RwLock<RegistryState>,
}

impl ScriptRegistry {
    pub fn new(
        identity: Arc<dyn IdentityBackend>,
        tracker: Arc<dyn AnalyticsBackend>,
        config: RegistryConfig,
    ) -> Self {
        Self {
            identity,
            tracker,
            config,
            state: RwLock::new(RegistryState::default()),
        }
    }

    /// Re-query the scripts owned by `owner_id`.
    ///
    /// Switching owners clears the list first. On failure the previous list
    /// is kept.
    pub async fn refresh(&self, owner_id: &str) -> RegistryResult<usize> {
        {
            let mut state = self.state.write().await;
            if state.owner_id.as_deref() != Some(owner_id) {
                state.owner_id = Some(owner_id.to_string());
                state.scripts.clear();
                state.expanded = None;
                state.copied = None;
            }
            state.loading = true;
        }

        let result = self
            .identity
            .list_documents(
                &self.config.database_id,
                &self.config.collection_id,
                &[DocumentQuery::equal("userId", owner_id)],
            )
            .await;

        let mut state = self.state.write().await;
        state.loading = false;

        let list = match result {
            Ok(list) => list,
            Err(e) => {
                tracing::warn!(owner_id = %owner_id, error = %e, "Failed to list scripts");
                return Err(e.into());
            }
        };

        // Another owner may have refreshed while this request was out
        if state.owner_id.as_deref() != Some(owner_id) {
            return Ok(state.scripts.len());
        }

        state.scripts = list
            .documents
            .into_iter()
            .filter_map(|doc| match serde_json::from_value::<Script>(doc) {
                Ok(script) => Some(script),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping malformed script document");
                    None
                }
            })
            .collect();

        tracing::debug!(owner_id = %owner_id, count = state.scripts.len(), "Scripts refreshed");
        Ok(state.scripts.len())
    }

    /// Create a script, then re-list
    pub async fn create(&self, owner_id: &str, name: &str) -> RegistryResult<CreatedScript> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RegistryError::EmptyName);
        }

        let created = self.tracker.create_script(owner_id, name).await.map_err(|e| {
            tracing::warn!(owner_id = %owner_id, error = %e, "Failed to create script");
            e
        })?;
        tracing::info!(script_id = %created.script_id, name = %name, "Script created");

        self.refresh(owner_id).await?;
        Ok(created)
    }

    /// Expand a script, or collapse it if it is already expanded.
    /// Returns the script now expanded, if any.
    pub async fn toggle(&self, script_id: &str) -> Option<String> {
        let mut state = self.state.write().await;
        state.expanded = if state.expanded.as_deref() == Some(script_id) {
            None
        } else {
            Some(script_id.to_string())
        };
        state.expanded.clone()
    }

    /// Write the script's embeddable snippet to `clipboard` and start the
    /// copy confirmation
    pub async fn copy_snippet(
        &self,
        script_id: &str,
        clipboard: &dyn Clipboard,
    ) -> RegistryResult<String> {
        let mut state = self.state.write().await;
        let code = state
            .scripts
            .iter()
            .find(|s| s.script_id == script_id)
            .map(|s| self.embed_code(s))
            .ok_or_else(|| RegistryError::NotFound(script_id.to_string()))?;

        clipboard.write_text(&code)?;
        state.copied = Some((script_id.to_string(), Instant::now()));
        Ok(code)
    }

    /// Look up one script by id
    pub async fn get(&self, script_id: &str) -> Option<Script> {
        let state = self.state.read().await;
        state
            .scripts
            .iter()
            .find(|s| s.script_id == script_id)
            .cloned()
    }

    pub async fn snapshot(&self) -> RegistrySnapshot {
        let state = self.state.read().await;
        let scripts = state
            .scripts
            .iter()
            .map(|s| ScriptView {
                script_id: s.script_id.clone(),
                name: s.name.clone(),
                embed_code: self.embed_code(s),
                expanded: state.expanded.as_deref() == Some(s.script_id.as_str()),
                copied: Self::copied_now(&state, &s.script_id),
            })
            .collect();

        RegistrySnapshot {
            scripts,
            loading: state.loading,
        }
    }

    /// The backend's snippet, or the template filled with the script's ids
    pub fn embed_code(&self, script: &Script) -> String {
        match script.snippet.as_deref() {
            Some(code) if !code.trim().is_empty() => code.to_string(),
            _ => snippet::render(&self.config.track_url, &script.script_id, &script.owner_id),
        }
    }

    fn copied_now(state: &RegistryState, script_id: &str) -> bool {
        matches!(
            &state.copied,
            Some((id, at)) if id == script_id && at.elapsed() < COPY_CONFIRMATION
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::PendingClipboard;
    use crate::testing::{FakeIdentity, FakeTracker};

    const TRACK: &str = "https://t.test/track";

    fn registry(identity: Arc<FakeIdentity>, tracker: Arc<FakeTracker>) -> ScriptRegistry {
        ScriptRegistry::new(
            identity,
            tracker,
            RegistryConfig {
                database_id: "db".to_string(),
                collection_id: "scripts".to_string(),
                track_url: TRACK.to_string(),
            },
        )
    }

    #[tokio::test]
    async fn test_refresh_filters_by_owner() {
        let identity = FakeIdentity::new();
        identity.add_document(serde_json::json!({
            "scriptId": "s-1", "scriptName": "Blog", "userId": "u-1"
        }));
        identity.add_document(serde_json::json!({
            "scriptId": "s-2", "scriptName": "Shop", "userId": "u-2"
        }));
        let registry = registry(Arc::clone(&identity), Arc::new(FakeTracker::new()));

        assert_eq!(registry.refresh("u-1").await.unwrap(), 1);
        let snapshot = registry.snapshot().await;
        assert_eq!(snapshot.scripts[0].name, "Blog");
        assert!(!snapshot.loading);
        assert_eq!(identity.calls(), vec!["list_documents:db:scripts"]);
    }

    #[tokio::test]
    async fn test_refresh_skips_malformed_documents() {
        let identity = FakeIdentity::new();
        identity.add_document(serde_json::json!({ "userId": "u-1", "scriptName": "No id" }));
        identity.add_document(serde_json::json!({
            "scriptId": "s-1", "scriptName": "Blog", "userId": "u-1"
        }));
        let registry = registry(identity, Arc::new(FakeTracker::new()));

        assert_eq!(registry.refresh("u-1").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_create_rejects_blank_name() {
        let identity = FakeIdentity::new();
        let tracker = Arc::new(FakeTracker::new());
        let registry = registry(identity, Arc::clone(&tracker));

        let err = registry.create("u-1", "   ").await.unwrap_err();
        assert!(matches!(err, RegistryError::EmptyName));
        assert_eq!(err.to_string(), "Script name is required");
        assert!(tracker.calls().is_empty());
    }

    #[tokio::test]
    async fn test_create_relists() {
        let identity = FakeIdentity::new();
        let tracker = Arc::new(FakeTracker::new().with_identity(Arc::clone(&identity)));
        let registry = registry(Arc::clone(&identity), Arc::clone(&tracker));
        registry.refresh("u-1").await.unwrap();

        let created = registry.create("u-1", " Blog ").await.unwrap();
        assert_eq!(created.script_id, "script-1");
        assert_eq!(tracker.calls(), vec!["create_script:u-1:Blog"]);
        assert_eq!(
            identity.calls(),
            vec!["list_documents:db:scripts", "list_documents:db:scripts"]
        );

        let snapshot = registry.snapshot().await;
        assert_eq!(snapshot.scripts.len(), 1);
        assert_eq!(
            snapshot.scripts[0].embed_code,
            r#"<script src="https://t.test/script-1.js"></script>"#
        );
    }

    #[tokio::test]
    async fn test_create_failure_keeps_list() {
        let identity = FakeIdentity::new();
        identity.add_document(serde_json::json!({
            "scriptId": "s-1", "scriptName": "Blog", "userId": "u-1"
        }));
        let tracker = Arc::new(FakeTracker::new());
        tracker.set_failing(true);
        let registry = registry(identity, tracker);
        registry.refresh("u-1").await.unwrap();

        assert!(matches!(
            registry.create("u-1", "Shop").await,
            Err(RegistryError::Backend(BackendError::Unavailable))
        ));
        assert_eq!(registry.snapshot().await.scripts.len(), 1);
    }

    #[tokio::test]
    async fn test_toggle_is_accordion() {
        let registry = registry(FakeIdentity::new(), Arc::new(FakeTracker::new()));

        assert_eq!(registry.toggle("s-1").await.as_deref(), Some("s-1"));
        assert_eq!(registry.toggle("s-2").await.as_deref(), Some("s-2"));
        assert_eq!(registry.toggle("s-2").await, None);
    }

    #[tokio::test]
    async fn test_owner_switch_clears_list() {
        let identity = FakeIdentity::new();
        identity.add_document(serde_json::json!({
            "scriptId": "s-1", "scriptName": "Blog", "userId": "u-1"
        }));
        let registry = registry(identity, Arc::new(FakeTracker::new()));

        registry.refresh("u-1").await.unwrap();
        registry.toggle("s-1").await;
        registry.refresh("u-2").await.unwrap();

        let snapshot = registry.snapshot().await;
        assert!(snapshot.scripts.is_empty());
        assert!(registry.get("s-1").await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_copy_snippet_substitutes_ids() {
        let identity = FakeIdentity::new();
        identity.add_document(serde_json::json!({
            "scriptId": "s-42", "scriptName": "Blog", "userId": "u-7"
        }));
        let registry = registry(identity, Arc::new(FakeTracker::new()));
        registry.refresh("u-7").await.unwrap();

        let clipboard = PendingClipboard::new();
        let code = registry.copy_snippet("s-42", &clipboard).await.unwrap();

        assert_eq!(code, snippet::render(TRACK, "s-42", "u-7"));
        assert_eq!(clipboard.take(), Some(code));
        assert!(registry.snapshot().await.scripts[0].copied);

        tokio::time::advance(COPY_CONFIRMATION).await;
        assert!(!registry.snapshot().await.scripts[0].copied);
    }

    #[tokio::test]
    async fn test_copy_unknown_script() {
        let registry = registry(FakeIdentity::new(), Arc::new(FakeTracker::new()));
        let clipboard = PendingClipboard::new();

        assert!(matches!(
            registry.copy_snippet("missing", &clipboard).await,
            Err(RegistryError::NotFound(_))
        ));
        assert_eq!(clipboard.take(), None);
    }
}
