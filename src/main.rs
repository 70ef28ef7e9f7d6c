//! Disease Predictor Server
//!
//! Serves the prediction form and a JSON API over five disease models.
//!
//! Usage:
//!   cargo run --bin disease_predictor
//!
//! Environment:
//!   PREDICTOR_HOST             - Server host (default: 0.0.0.0)
//!   PORT / PREDICTOR_PORT      - Server port (default: 8080)
//!   PREDICTOR_MODELS_DIR       - Model artifacts (default: ./models)
//!   PREDICTOR_STRICT_STARTUP   - Abort if any model fails to load (default: true)
//!   PREDICTOR_SESSION_TTL_SECS - Idle session lifetime (default: 1800)
//!   RUST_LOG                   - Log level (default: info)

use disease_predictor::api::{create_router, start_cleanup_task, AppState};
use disease_predictor::{AppConfig, ModelRegistry, SessionStore};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let config = AppConfig::from_env()?;
    config.log_summary();

    // Models load once, before anything is served
    let registry = Arc::new(ModelRegistry::load(&config.models_dir, config.load_policy)?);

    let sessions = SessionStore::new(config.session_ttl);
    let cleanup = start_cleanup_task(sessions.clone());
    info!("🧹 Session cleanup task started");

    let state = Arc::new(AppState::new(registry, sessions));
    let app = create_router(state);

    let addr = config.socket_addr()?;
    info!("🏥 Disease Predictor starting on http://{}", addr);
    info!("");
    info!("Endpoints:");
    info!("  GET  /               - Prediction form");
    info!("  POST /v1/predict     - JSON prediction");
    info!("  GET  /v1/diseases    - Diseases and their input fields");
    info!("  GET  /v1/stats       - Session statistics");
    info!("  GET  /v1/health      - Health check");
    info!("");
    info!("Press Ctrl+C for graceful shutdown");

    let listener = TcpListener::bind(addr).await?;

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
        }
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    cleanup.abort();
    info!("👋 Disease Predictor shutdown complete");

    Ok(())
}
