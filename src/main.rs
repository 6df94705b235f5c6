//! Visit Logger Web Server
//!
//! Run with: cargo run --bin visitlog
//!
//! Configuration is read from `config.toml` (see `visitlog-cli config`)
//! with `VISITLOG_*` environment overrides. `RUST_LOG` overrides the log
//! level.

use std::sync::Arc;
use visitlog::{AppState, Config, IdentityClient, TrackerClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load_default();
    visitlog::logging::init(&config.logging);

    tracing::info!("Starting Visit Logger v{}", env!("CARGO_PKG_VERSION"));

    config.validate()?;
    tracing::info!("Identity backend: {}", config.identity.endpoint);
    tracing::info!("Analytics backend: {}", config.analytics.base_url);

    let identity = Arc::new(IdentityClient::new(config.identity_client())?);
    let tracker = Arc::new(TrackerClient::new(config.tracker_client())?);

    let state = AppState::from_config(identity, tracker, &config)?;

    // Guarded pages show a loading view until this finishes
    let session = Arc::clone(&state.session);
    tokio::spawn(async move {
        let snapshot = session.check_session().await;
        tracing::info!(phase = ?snapshot.phase, "Session check complete");
    });

    visitlog::serve(state).await?;

    tracing::info!("Visit Logger stopped");
    Ok(())
}
