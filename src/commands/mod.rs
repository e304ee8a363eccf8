//! Command handlers
//!
//! `proxy` holds the HTTP endpoints served by `serve`; `search` and
//! `playlist` are the operations behind the CLI front end.

pub mod playlist;
pub mod proxy;
pub mod search;

use anyhow::{Context, Result};
use axum::routing::get;
use axum::Router;
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::core::config::AppConfig;
use crate::core::youtube_api::{Endpoint, YoutubeApiClient};

pub use playlist::*;
pub use proxy::ProxyState;
pub use search::*;

/// Routes of the proxy service
pub fn router(state: ProxyState, enable_cors: bool) -> Router {
    let mut router = Router::new()
        .route("/health", get(proxy::health))
        .route(Endpoint::Video.route(), get(proxy::video))
        .route(Endpoint::Search.route(), get(proxy::search))
        .route(Endpoint::Playlist.route(), get(proxy::playlist))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if enable_cors {
        router = router.layer(CorsLayer::permissive());
    }
    router
}

/// Run the proxy until Ctrl+C
pub async fn serve(config: &AppConfig) -> Result<()> {
    let api = YoutubeApiClient::from_config(&config.youtube, config.api_key())?;
    let app = router(ProxyState::new(api), config.server.enable_cors);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| {
            format!(
                "Invalid listen address {}:{}",
                config.server.host, config.server.port
            )
        })?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("🚀 Proxy listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Proxy server error")?;

    info!("👋 Proxy stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
