//! YouTube Data API forwarding
//!
//! Each proxy endpoint maps to one fixed upstream request template. The
//! server-held key is appended to every call; the client never sees it.
//! Calls are made exactly once: no retries, no caching.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::{debug, info, warn};

use super::config::YoutubeConfig;
use super::models::{AppError, AppResult};
use crate::utils::network::build_http_client;

/// Endpoints exposed by the proxy
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Endpoint {
    /// Video details by ID
    Video,
    /// Free text video search
    Search,
    /// Items of a playlist by playlist ID
    Playlist,
}

impl Endpoint {
    /// Path of the proxy route
    pub fn route(&self) -> &'static str {
        match self {
            Self::Video => "/api/video",
            Self::Search => "/api/search",
            Self::Playlist => "/api/playlist",
        }
    }

    /// Name of the query parameter the proxy route expects
    pub fn query_param(&self) -> &'static str {
        match self {
            Self::Video => "videoId",
            Self::Search | Self::Playlist => "searchTerm",
        }
    }

    fn upstream_path(&self) -> &'static str {
        match self {
            Self::Video => "videos",
            Self::Search => "search",
            Self::Playlist => "playlistItems",
        }
    }

    /// Fixed upstream parameters; `term` fills the endpoint's lookup field
    fn upstream_params<'a>(&self, term: &'a str) -> Vec<(&'static str, &'a str)> {
        match self {
            Self::Video => vec![
                ("part", "snippet,contentDetails,statistics"),
                ("id", term),
                ("maxResults", "20"),
            ],
            Self::Search => vec![
                ("part", "snippet"),
                ("type", "video"),
                ("q", term),
                ("maxResults", "20"),
            ],
            Self::Playlist => vec![
                ("part", "snippet,contentDetails"),
                ("playlistId", term),
                ("maxResults", "50"),
            ],
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Video => write!(f, "video"),
            Self::Search => write!(f, "search"),
            Self::Playlist => write!(f, "playlist"),
        }
    }
}

#[derive(Clone)]
pub struct YoutubeApiClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl fmt::Debug for YoutubeApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("YoutubeApiClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl YoutubeApiClient {
    pub fn new(client: Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    pub fn from_config(config: &YoutubeConfig, api_key: &str) -> AppResult<Self> {
        let client = build_http_client(config.timeout_seconds, &config.user_agent)
            .map_err(|e| AppError::Config(format!("{:#}", e)))?;
        if api_key.is_empty() {
            warn!("⚠️ No YouTube API key configured, upstream calls will be rejected");
        }
        Ok(Self::new(client, config.api_base_url.clone(), api_key))
    }

    /// Upstream URL for `endpoint` with `term` and the credential filled in
    pub fn upstream_url(&self, endpoint: Endpoint, term: &str) -> AppResult<url::Url> {
        let base = format!("{}/{}", self.base_url, endpoint.upstream_path());
        let mut params = endpoint.upstream_params(term);
        params.push(("key", self.api_key.as_str()));

        url::Url::parse_with_params(&base, &params)
            .map_err(|e| AppError::Config(format!("Invalid upstream URL {}: {}", base, e)))
    }

    /// Forward one lookup upstream and hand back its JSON body unchanged
    pub async fn forward(&self, endpoint: Endpoint, term: &str) -> AppResult<Value> {
        let url = self.upstream_url(endpoint, term)?;
        debug!("Forwarding {} lookup for {:?}", endpoint, term);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            let body = response
                .json::<Value>()
                .await
                .map_err(|e| AppError::Parse(format!("Upstream body is not JSON: {}", e)))?;
            info!("✅ {} lookup succeeded ({})", endpoint, status.as_u16());
            return Ok(body);
        }

        let text = response
            .text()
            .await
            .map_err(|e| AppError::Transport(e.to_string()))?;
        let body = serde_json::from_str(&text).unwrap_or(Value::String(text));
        warn!("❌ {} lookup failed with HTTP {}", endpoint, status.as_u16());

        Err(AppError::Upstream {
            status: status.as_u16(),
            body,
        })
    }

    pub async fn video(&self, video_id: &str) -> AppResult<Value> {
        self.forward(Endpoint::Video, video_id).await
    }
}
