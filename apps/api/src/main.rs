use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use careerlens::config::Config;
use careerlens::inference::InferenceService;
use careerlens::model::ModelArtifacts;
use careerlens::routes::build_router;
use careerlens::state::AppState;
use careerlens::telemetry::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on unparsable env vars)
    let config = Config::from_env()?;

    init_tracing(&config.rust_log, env!("CARGO_CRATE_NAME"));

    info!("Starting CareerLens API v{}", env!("CARGO_PKG_VERSION"));

    // Load the model; the server never starts without one
    let store = config.artifacts.open().await;
    let artifacts = ModelArtifacts::load(store.as_ref())
        .await
        .with_context(|| format!("Failed to load model artifacts from {}", store.location()))?;

    let state = AppState {
        model: Arc::new(InferenceService::new(artifacts)),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", config.host, config.port))?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
