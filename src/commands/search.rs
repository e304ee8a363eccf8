//! Search commands used by the CLI front end

use tracing::{debug, info};

use crate::core::config::AppConfig;
use crate::core::models::{AppError, AppResult, SearchType};
use crate::core::search::{
    DirectBackend, ProxyBackend, SearchBackend, SearchController, SearchSession,
};
use crate::core::youtube_api::YoutubeApiClient;
use crate::utils::network::build_http_client;

/// Proxy backend by default, the upstream API itself when `client.direct` is set
pub fn backend_for(config: &AppConfig) -> AppResult<Box<dyn SearchBackend>> {
    if config.client.direct {
        debug!("Searching the YouTube API directly");
        let api = YoutubeApiClient::from_config(&config.youtube, config.api_key())?;
        return Ok(Box::new(DirectBackend::new(api)));
    }

    debug!("Searching through proxy at {}", config.client.proxy_url);
    let client = build_http_client(config.youtube.timeout_seconds, &config.youtube.user_agent)
        .map_err(|e| AppError::Config(format!("{:#}", e)))?;
    Ok(Box::new(ProxyBackend::new(client, config.client.proxy_url.clone())))
}

/// Run one search to completion and return the settled session
pub async fn run_search<B: SearchBackend + 'static>(
    backend: B,
    search_type: SearchType,
    term: &str,
) -> SearchSession {
    let controller = SearchController::new(backend, search_type);
    controller.update_term(term).await;
    controller.wait_idle().await;

    let session = controller.snapshot().await;
    info!(
        "Search for {:?} finished in state {:?}",
        session.term(),
        session.state()
    );
    session
}
