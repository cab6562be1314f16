//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the REST API server on its own.
//!
//! ## Intended use
//! Useful for development and debugging. The workspace's main `medassist-run` binary does the
//! same after also reading a `.env` file.

use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{serve, AppState};

/// Main entry point for the medassist REST API server.
///
/// # Environment Variables
/// - `MEDASSIST_REST_ADDR`: Server address (default: "0.0.0.0:3000")
/// - `MEDASSIST_DATA_DIR`: Reference data directory (default: search for `data/`)
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the reference data cannot be loaded,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?)
                .add_directive("medassist_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("MEDASSIST_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let data_dir = std::env::var("MEDASSIST_DATA_DIR").ok().map(PathBuf::from);

    tracing::info!("-- Starting medassist REST API on {}", addr);

    let state = AppState::load(data_dir)?;
    serve(&addr, state).await
}
