//! Canvas service binary.
//!
//! Loads `.env`, configures tracing, opens the data directory and serves the REST API on
//! `0.0.0.0:<PORT>`.

use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::AppState;
use canvas_core::{data_dir_from_env_value, port_from_env_value, CoreConfig};

/// Main entry point for the canvas service
///
/// # Environment Variables
/// - `PORT`: Listen port (default: 3000)
/// - `CANVAS_DATA_DIR`: Directory holding the `file/` and `canvas/` stores (default: ".")
/// - `RUST_LOG`: Extra tracing directives
///
/// # Errors
/// Returns an error if the configuration is invalid, a store directory cannot be created, the
/// address cannot be bound, or the server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("canvas_run=info".parse()?)
                .add_directive("api_rest=info".parse()?)
                .add_directive("canvas_core=info".parse()?)
                .add_directive("canvas_files=info".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let port = port_from_env_value(std::env::var("PORT").ok())?;
    let data_dir = data_dir_from_env_value(std::env::var("CANVAS_DATA_DIR").ok());

    let cfg = Arc::new(CoreConfig::new(data_dir)?);
    let state = AppState::new(cfg.clone())?;
    tracing::info!(
        files = %cfg.blob_dir().display(),
        canvases = %cfg.canvas_dir().display(),
        "storage ready"
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("++ Starting canvas server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, api_rest::app(state)).await?;

    Ok(())
}
