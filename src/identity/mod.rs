//! Identity Backend
//!
//! Accounts, sessions and document queries against an Appwrite-compatible
//! identity/document-storage service.
//!
//! ## Architecture
//!
//! - **IdentityBackend**: the seam every view model talks to
//! - **IdentityClient**: reqwest implementation with a process-wide cookie
//!   store, so the backend session lives as long as the process
//! - **DocumentQuery**: JSON query filters for document listing

mod client;
mod query;

pub use client::{IdentityClient, IdentityClientConfig};
pub use query::DocumentQuery;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::BackendResult;

/// An authenticated account as reported by the identity backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
}

impl Identity {
    /// Name to show in the UI, falling back to the email address
    pub fn display_name(&self) -> &str {
        let name = self.name.trim();
        if name.is_empty() {
            &self.email
        } else {
            name
        }
    }
}

/// A page of documents returned by a document query
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentList {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub documents: Vec<serde_json::Value>,
}

/// Operations consumed from the identity/document backend
#[async_trait]
pub trait IdentityBackend: Send + Sync {
    /// Get the account owning the current session
    async fn get_account(&self) -> BackendResult<Identity>;

    /// Create a session from email and password credentials
    async fn create_email_password_session(&self, email: &str, password: &str)
        -> BackendResult<()>;

    /// Create a new account
    async fn create_account(
        &self,
        user_id: &str,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> BackendResult<Identity>;

    /// Delete the current session
    async fn delete_current_session(&self) -> BackendResult<()>;

    /// URL the browser must visit to start an OAuth flow
    fn oauth_authorization_url(
        &self,
        provider: &str,
        success_url: &str,
        failure_url: &str,
    ) -> BackendResult<String>;

    /// Exchange the token delivered to the OAuth success URL for a session
    async fn create_session_from_token(&self, user_id: &str, secret: &str) -> BackendResult<()>;

    /// Send a password recovery email
    async fn create_recovery(&self, email: &str, redirect_url: &str) -> BackendResult<()>;

    /// List documents in a collection matching all queries
    async fn list_documents(
        &self,
        database_id: &str,
        collection_id: &str,
        queries: &[DocumentQuery],
    ) -> BackendResult<DocumentList>;
}
