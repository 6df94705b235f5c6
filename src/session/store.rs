//! Session Store
//!
//! Process-wide authentication state. Lifecycle:
//!
//! ```text
//! Uninitialized -> Checking -> Authenticated
//!                           -> Anonymous
//! ```
//!
//! `login`, `sign_up`, `logout` and the OAuth operations move between
//! `Authenticated` and `Anonymous`. `loading` stays set until every
//! in-flight operation has finished.

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::error::{AuthError, UNKNOWN_ERROR};
use crate::identity::{Identity, IdentityBackend};

/// Where the session store sends browsers during OAuth and recovery
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// OAuth provider name (e.g., "google")
    pub oauth_provider: String,
    /// Public origin of the web front-end (e.g., "http://localhost:8085")
    pub public_origin: String,
    /// Page linked from password recovery emails
    pub recovery_url: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            oauth_provider: "google".to_string(),
            public_origin: "http://localhost:8085".to_string(),
            recovery_url: "http://localhost:8085/login".to_string(),
        }
    }
}

impl SessionConfig {
    /// OAuth success target: the callback that finishes the session and
    /// then lands on `/dashboard`
    pub fn oauth_success_url(&self) -> String {
        format!("{}/oauth/callback", self.public_origin.trim_end_matches('/'))
    }

    /// OAuth failure target
    pub fn oauth_failure_url(&self) -> String {
        format!("{}/login", self.public_origin.trim_end_matches('/'))
    }
}

/// Lifecycle phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    #[default]
    Uninitialized,
    Checking,
    Authenticated,
    Anonymous,
}

#[derive(Debug, Default)]
struct SessionState {
    phase: SessionPhase,
    identity: Option<Identity>,
    error: Option<AuthError>,
    in_flight: usize,
}

/// Point-in-time view of the session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub identity: Option<Identity>,
    pub loading: bool,
    pub error: Option<AuthError>,
}

impl SessionSnapshot {
    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }
}

/// Authentication state shared by every view
pub struct SessionStore {
    backend: Arc<dyn IdentityBackend>,
    config: SessionConfig,
    state: RwLock<SessionState>,
}

impl SessionStore {
    pub fn new(backend: Arc<dyn IdentityBackend>, config: SessionConfig) -> Self {
        Self {
            backend,
            config,
            state: RwLock::new(SessionState::default()),
        }
    }

    /// Current state
    pub async fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.read().await;
        SessionSnapshot {
            phase: state.phase,
            identity: state.identity.clone(),
            loading: state.in_flight > 0
                || matches!(state.phase, SessionPhase::Uninitialized | SessionPhase::Checking),
            error: state.error.clone(),
        }
    }

    /// Cached identity, if signed in
    pub async fn identity(&self) -> Option<Identity> {
        self.state.read().await.identity.clone()
    }

    /// Look up an existing session; run once at startup.
    ///
    /// A 401 means "nobody is signed in" and is not recorded as an error;
    /// any other failure is.
    pub async fn check_session(&self) -> SessionSnapshot {
        {
            let mut state = self.state.write().await;
            state.phase = SessionPhase::Checking;
            state.error = None;
        }

        let result = self.backend.get_account().await;

        {
            let mut state = self.state.write().await;
            match result {
                Ok(identity) => {
                    tracing::info!(user_id = %identity.id, "Existing session found");
                    state.identity = Some(identity);
                    state.phase = SessionPhase::Authenticated;
                }
                Err(e) if e.is_unauthorized() => {
                    tracing::info!("No existing session");
                    state.identity = None;
                    state.phase = SessionPhase::Anonymous;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to check authentication status");
                    state.identity = None;
                    state.phase = SessionPhase::Anonymous;
                    state.error = Some(AuthError::new(
                        "Failed to check authentication status",
                        e.code().unwrap_or_else(|| UNKNOWN_ERROR.to_string()),
                    ));
                }
            }
        }

        self.snapshot().await
    }

    /// Sign in with email and password.
    ///
    /// Empty credentials are rejected before any backend call.
    pub async fn login(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        self.begin().await;
        let result = self.authenticate(email, password).await;
        self.finish_with_identity(&result).await;
        result
    }

    /// Create an account with a client-generated id, then sign in
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> Result<Identity, AuthError> {
        self.begin().await;
        let result = self.register(email, password, name).await;
        self.finish_with_identity(&result).await;
        result
    }

    /// End the current session
    pub async fn logout(&self) -> Result<(), AuthError> {
        self.begin().await;
        let result = self
            .backend
            .delete_current_session()
            .await
            .map_err(|e| AuthError::from_backend(&e, "Logout failed"));

        self.finish(|state| match &result {
            Ok(()) => {
                tracing::info!("Signed out");
                state.identity = None;
                state.phase = SessionPhase::Anonymous;
            }
            Err(e) => state.error = Some(e.clone()),
        })
        .await;

        result
    }

    /// URL of the external OAuth authorization flow; the caller navigates
    /// the browser there
    pub async fn login_with_oauth(&self) -> Result<String, AuthError> {
        self.begin().await;
        let result = self
            .backend
            .oauth_authorization_url(
                &self.config.oauth_provider,
                &self.config.oauth_success_url(),
                &self.config.oauth_failure_url(),
            )
            .map_err(|e| AuthError::from_backend(&e, "OAuth login failed"));

        self.finish(|state| {
            if let Err(e) = &result {
                state.error = Some(e.clone());
            }
        })
        .await;

        result
    }

    /// Finish an OAuth flow with the token delivered to the success URL
    pub async fn complete_oauth(&self, user_id: &str, secret: &str) -> Result<Identity, AuthError> {
        self.begin().await;
        let result = self.exchange_token(user_id, secret).await;
        self.finish_with_identity(&result).await;
        result
    }

    /// Ask the backend to send a password recovery email
    pub async fn reset_password(&self, email: &str) -> Result<(), AuthError> {
        self.begin().await;
        let result = if email.trim().is_empty() {
            Err(AuthError::new("Email is required", "INVALID_EMAIL"))
        } else {
            self.backend
                .create_recovery(email.trim(), &self.config.recovery_url)
                .await
                .map_err(|e| AuthError::from_backend(&e, "Password reset failed"))
        };

        self.finish(|state| {
            if let Err(e) = &result {
                state.error = Some(e.clone());
            }
        })
        .await;

        result
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AuthError::credentials_required());
        }

        self.backend
            .create_email_password_session(email.trim(), password)
            .await
            .map_err(|e| AuthError::from_backend(&e, "Login failed"))?;

        self.backend
            .get_account()
            .await
            .map_err(|e| AuthError::from_backend(&e, "Login failed"))
    }

    async fn register(
        &self,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> Result<Identity, AuthError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AuthError::credentials_required());
        }

        let user_id = Uuid::new_v4().to_string();
        self.backend
            .create_account(&user_id, email.trim(), password, name)
            .await
            .map_err(|e| AuthError::from_backend(&e, "Signup failed"))?;

        tracing::info!(user_id = %user_id, "Account created");
        self.authenticate(email, password).await
    }

    async fn exchange_token(&self, user_id: &str, secret: &str) -> Result<Identity, AuthError> {
        if user_id.is_empty() || secret.is_empty() {
            return Err(AuthError::new(
                "OAuth callback is missing its token",
                "INVALID_TOKEN",
            ));
        }

        self.backend
            .create_session_from_token(user_id, secret)
            .await
            .map_err(|e| AuthError::from_backend(&e, "OAuth login failed"))?;

        self.backend
            .get_account()
            .await
            .map_err(|e| AuthError::from_backend(&e, "OAuth login failed"))
    }

    async fn begin(&self) {
        let mut state = self.state.write().await;
        state.in_flight += 1;
        state.error = None;
    }

    async fn finish(&self, apply: impl FnOnce(&mut SessionState)) {
        let mut state = self.state.write().await;
        apply(&mut state);
        state.in_flight = state.in_flight.saturating_sub(1);
    }

    async fn finish_with_identity(&self, result: &Result<Identity, AuthError>) {
        self.finish(|state| match result {
            Ok(identity) => {
                tracing::info!(user_id = %identity.id, "Signed in");
                state.identity = Some(identity.clone());
                state.phase = SessionPhase::Authenticated;
            }
            Err(e) => {
                tracing::debug!(code = %e.code, "Authentication failed");
                state.error = Some(e.clone());
            }
        })
        .await;
    }
}
