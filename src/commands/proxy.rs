//! Proxy endpoint handlers
//!
//! `GET /api/video`, `/api/search` and `/api/playlist` forward to the
//! YouTube Data API with the server-held key and relay the upstream answer.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info, warn};

use crate::core::models::AppError;
use crate::core::youtube_api::{Endpoint, YoutubeApiClient};
use crate::utils::validation::extract_playlist_id;

/// Status sent when the upstream could not be reached at all
pub const TRANSPORT_FAILURE_STATUS: StatusCode = StatusCode::BAD_GATEWAY;

/// State shared by the proxy handlers
#[derive(Debug, Clone)]
pub struct ProxyState {
    pub api: YoutubeApiClient,
}

impl ProxyState {
    pub fn new(api: YoutubeApiClient) -> Self {
        Self { api }
    }
}

#[derive(Debug, Deserialize)]
pub struct VideoParams {
    #[serde(rename = "videoId")]
    pub video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(rename = "searchTerm")]
    pub search_term: Option<String>,
}

/// `GET /api/video?videoId=<id>`
pub async fn video(
    State(state): State<ProxyState>,
    Query(params): Query<VideoParams>,
) -> Response {
    info!("📺 Proxying video lookup: {:?}", params.video_id);
    forward_impl(&state, Endpoint::Video, params.video_id).await
}

/// `GET /api/search?searchTerm=<text>`
pub async fn search(
    State(state): State<ProxyState>,
    Query(params): Query<SearchParams>,
) -> Response {
    info!("🔍 Proxying video search: {:?}", params.search_term);
    forward_impl(&state, Endpoint::Search, params.search_term).await
}

/// `GET /api/playlist?searchTerm=<playlist id or url>`
pub async fn playlist(
    State(state): State<ProxyState>,
    Query(params): Query<SearchParams>,
) -> Response {
    info!("📋 Proxying playlist lookup: {:?}", params.search_term);
    let playlist_id = params.search_term.as_deref().map(extract_playlist_id);
    forward_impl(&state, Endpoint::Playlist, playlist_id).await
}

pub async fn health() -> &'static str {
    "OK"
}

async fn forward_impl(state: &ProxyState, endpoint: Endpoint, term: Option<String>) -> Response {
    let term = match term.as_deref().map(str::trim) {
        Some(term) if !term.is_empty() => term.to_string(),
        _ => {
            warn!("Rejecting {} request without `{}`", endpoint, endpoint.query_param());
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": format!("Missing query parameter `{}`", endpoint.query_param())
                })),
            )
                .into_response();
        }
    };

    match state.api.forward(endpoint, &term).await {
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err(err) => error_response(err),
    }
}

/// Relay an upstream failure, or answer 502 when nothing came back
pub fn error_response(err: AppError) -> Response {
    match err {
        AppError::Upstream { status, body } => {
            let status = StatusCode::from_u16(status).unwrap_or(TRANSPORT_FAILURE_STATUS);
            match body {
                Value::String(text) => (status, text).into_response(),
                body => (status, Json(body)).into_response(),
            }
        }
        other => {
            error!("❌ Upstream unreachable: {}", other);
            (
                TRANSPORT_FAILURE_STATUS,
                Json(json!({ "error": other.to_string() })),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_error_keeps_status() {
        let response = error_response(AppError::Upstream {
            status: 403,
            body: json!({"error": "quotaExceeded"}),
        });
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_transport_error_is_bad_gateway() {
        let response = error_response(AppError::Transport("connection refused".into()));
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_invalid_upstream_status_falls_back() {
        let response = error_response(AppError::Upstream {
            status: 42,
            body: Value::String("weird".into()),
        });
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
