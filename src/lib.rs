//! # Visit Logger
//!
//! Website visit tracking front-end: sign up, generate a per-site tracking
//! snippet, embed it, and browse paginated and graphed visit analytics.
//!
//! ## Features
//!
//! - **Session store**: process-wide authentication state over an
//!   Appwrite-compatible identity backend
//! - **Script registry**: list and create tracking scripts, copy snippets
//! - **Analytics**: paginated visit table and a visits-over-time graph
//! - **Web front-end**: server-rendered pages with a route guard
//!
//! ## Modules
//!
//! - [`identity`]: Identity / document backend client
//! - [`tracker`]: Analytics backend client
//! - [`session`]: Session store and route guard
//! - [`dashboard`]: Script registry view model
//! - [`analytics`]: Table and graph view models
//! - [`web`]: Axum front-end
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use visitlog::{AppState, Config, IdentityClient, TrackerClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_default();
//!     config.validate()?;
//!
//!     let identity = Arc::new(IdentityClient::new(config.identity_client())?);
//!     let tracker = Arc::new(TrackerClient::new(config.tracker_client())?);
//!
//!     let state = AppState::from_config(identity, tracker, &config)?;
//!     state.session.check_session().await;
//!     visitlog::web::serve(state).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod analytics;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod forms;
pub mod identity;
pub mod logging;
pub mod session;
pub mod tracker;
pub mod web;

#[cfg(test)]
pub(crate) mod testing;

// Re-export top-level types for convenience
pub use error::{BackendError, BackendResult};

pub use identity::{DocumentQuery, Identity, IdentityBackend, IdentityClient, IdentityClientConfig};

pub use tracker::{
    AnalyticsBackend, AnalyticsPage, AnalyticsRecord, CreatedScript, GraphPoint, Script,
    TrackEvent, TrackerClient, TrackerConfig,
};

pub use session::{
    guard, AuthError, GuardDecision, SessionConfig, SessionPhase, SessionSnapshot, SessionStore,
};

pub use dashboard::{Clipboard, ClipboardError, RegistryConfig, RegistryError, ScriptRegistry};

pub use analytics::{AnalyticsTable, AnalyticsView, DayWindow, GraphView, Pagination};

pub use forms::{CredentialsForm, FormErrors, FormMode};

pub use web::{build_router, serve, AppState, WebConfig, WebError};

pub use config::{Config, ConfigError, LoggingConfig};
