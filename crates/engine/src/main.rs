//! WrldBldr Engine - the location-driven narrative engine's server process.
//!
//! Serves the turn loop to `wrldbldr-player` over a WebSocket connection
//! and integrates with Ollama for LM-driven action proposal and narration.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wrldbldr_engine::app::App;
use wrldbldr_engine::infrastructure::config::EngineConfig;
use wrldbldr_engine::infrastructure::http;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "wrldbldr_engine=debug,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("starting wrldbldr engine");

    let config = EngineConfig::from_env()?;
    tracing::info!(bind_address = %config.bind_address, ollama_base_url = %config.ollama_base_url, "configuration loaded");

    let bind_address: SocketAddr = config.bind_address.parse()?;
    let app = Arc::new(App::new(config));

    let router = Router::new()
        .route("/health", get(health_check))
        .merge(http::router(app))
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http());

    tracing::info!(%bind_address, "listening");
    let listener = tokio::net::TcpListener::bind(bind_address).await?;

    let server = axum::serve(listener, router);
    tokio::select! {
        result = server => {
            if let Err(err) = result {
                tracing::error!(error = %err, "server error");
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown signal received");
        }
    }

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}
