use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{serve, AppState};

/// Main entry point for the medassist application
///
/// Loads every reference table and the classifier once, then serves the REST API
/// (default port 3000). Any load failure stops the process before it accepts requests.
///
/// # Environment Variables
/// - `MEDASSIST_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `MEDASSIST_DATA_DIR`: Reference data directory (default: search for `data/`)
/// - `RUST_LOG`: tracing filter directives
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If startup or the server fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("medassist_run=info".parse()?)
                .add_directive("medassist_core=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr =
        std::env::var("MEDASSIST_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let data_dir = std::env::var("MEDASSIST_DATA_DIR").ok().map(PathBuf::from);

    tracing::info!("++ Starting medassist REST on {}", rest_addr);

    let state = AppState::load(data_dir)?;
    serve(&rest_addr, state).await
}
