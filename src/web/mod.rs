//! Web Front-End
//!
//! Server-rendered pages for the visit tracker, built with Axum.
//!
//! # Routes
//!
//! ## Presentation
//! - `GET /` - Landing page
//! - `GET /doc` - Quick start with the sample snippet
//! - `GET /terms` - Terms and privacy policy
//!
//! ## Authentication
//! - `GET /login`, `POST /login` - Sign in / sign up (`?mode=signup`)
//! - `GET /login/oauth` - Start OAuth
//! - `GET /oauth/callback` - Finish OAuth
//! - `POST /logout` - Sign out
//! - `GET /forgot-password`, `POST /forgot-password` - Password recovery
//!
//! ## Guarded
//! - `GET /dashboard` - Script list
//! - `POST /dashboard/scripts` - Create a script
//! - `POST /dashboard/scripts/:id/toggle` - Expand / collapse
//! - `POST /dashboard/scripts/:id/copy` - Copy snippet
//! - `GET /analytics/:scriptId?name=&page=&days=` - Table and graph
//!
//! ## Health
//! - `GET /health` - Status
//!
//! Anything else redirects to `/login`.

pub mod dto;
pub mod error;
pub mod flash;
pub mod guard;
pub mod routes;
pub mod state;
pub mod templates;

pub use error::{WebError, WebResult};
pub use flash::{Flash, FlashKind, FlashMessage};
pub use state::{AppState, WebConfig};
pub use templates::Templates;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Build the router with all routes and middleware
pub fn build_router(shared_state: Arc<AppState>) -> Router {
    let guarded = Router::new()
        .route("/dashboard", get(routes::dashboard::dashboard))
        .route("/dashboard/scripts", post(routes::dashboard::create_script))
        .route(
            "/dashboard/scripts/:id/toggle",
            post(routes::dashboard::toggle_script),
        )
        .route(
            "/dashboard/scripts/:id/copy",
            post(routes::dashboard::copy_script),
        )
        .route("/analytics/:script_id", get(routes::analytics::analytics))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&shared_state),
            guard::require_identity,
        ));

    Router::new()
        .route("/", get(routes::pages::landing))
        .route("/doc", get(routes::pages::documentation))
        .route("/terms", get(routes::pages::terms))
        .route(
            "/login",
            get(routes::auth::login_page).post(routes::auth::submit_login),
        )
        .route("/login/oauth", get(routes::auth::start_oauth))
        .route("/oauth/callback", get(routes::auth::oauth_callback))
        .route("/logout", post(routes::auth::logout))
        .route(
            "/forgot-password",
            get(routes::auth::forgot_password_page).post(routes::auth::submit_forgot_password),
        )
        .route("/health", get(routes::health::health))
        .merge(guarded)
        .fallback(routes::pages::fallback)
        .layer(TraceLayer::new_for_http())
        .with_state(shared_state)
}

/// Start the web server
pub async fn serve(state: AppState) -> Result<(), WebError> {
    let addr = state.config.addr();
    let router = build_router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Visit Logger listening on http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| WebError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Visit Logger shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
