use anyhow::{Context, Result};
use egress::api::{create_query_router, create_ws_router, QueryAppState, WsAppState};
use egress::config::{self, EgressConfig};
use egress::state::ViewEngine;
use egress::stream::{StreamAdapter, StreamClient};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "egress=info".into()),
        )
        .init();

    info!("Egress starting...");

    let config_path = std::env::var("EGRESS_CONFIG").unwrap_or_else(|_| "egress.toml".to_string());
    let config = if std::path::Path::new(&config_path).exists() {
        config::load_config(&config_path)
            .map_err(|e| anyhow::anyhow!("Failed to load config '{}': {}", config_path, e))?
    } else {
        info!("No config file at '{}', using defaults", config_path);
        EgressConfig::default()
    };

    let engine = Arc::new(ViewEngine::with_capacity_fallback(config.exits.clone()));
    let layout = Arc::new(config.layout_table());

    // Subscribe to the upstream routing service. The handle must stay alive
    // for the lifetime of the process; dropping it tears the subscription down.
    let client = StreamClient::connect(config.stream.clone()).await?;
    let adapter = StreamAdapter::new(client, Arc::clone(&engine));
    let _stream_handle = adapter.start().await?;

    let ws_state = Arc::new(WsAppState {
        engine: Arc::clone(&engine),
    });
    let query_state = Arc::new(QueryAppState {
        engine: Arc::clone(&engine),
        layout,
    });

    // Permissive CORS: browser dashboards connect from their own origin
    let app = create_ws_router(ws_state)
        .merge(create_query_router(query_state))
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(&config.api.bind_addr)
        .await
        .context("Failed to bind API listener")?;
    info!("API listening on {}", config.api.bind_addr);

    axum::serve(listener, app).await.context("API server error")?;

    Ok(())
}
