//! Search session state machine
//!
//! The session tracks the search box: term, search type, the last result or
//! error and a loading flag. Every triggering change bumps a generation
//! counter; a fetch that settles for an older generation is dropped, so a
//! slow response for an earlier term can never overwrite a newer one.

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use super::models::{AppError, SearchQuery, SearchResult, SearchType};
use super::youtube_api::{Endpoint, YoutubeApiClient};
use crate::utils::logging::track_event;
use crate::utils::validation::extract_playlist_id;

/// Failure shown by the results view
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, thiserror::Error)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SearchError {
    /// The remote service answered with an error status
    #[error("HTTP {status}: {body}")]
    Upstream { status: u16, body: Value },
    /// No response was received
    #[error("{message}")]
    Transport { message: String },
}

impl From<SearchError> for AppError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::Upstream { status, body } => AppError::Upstream { status, body },
            SearchError::Transport { message } => AppError::Transport(message),
        }
    }
}

impl From<AppError> for SearchError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::Upstream { status, body } => SearchError::Upstream { status, body },
            other => SearchError::Transport {
                message: other.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SearchState {
    Idle,
    Loading,
    Success,
    Error,
}

/// One fetch the driver has to issue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub generation: u64,
    pub endpoint: Endpoint,
    pub param: String,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct SearchSession {
    query: SearchQuery,
    data: Option<SearchResult>,
    error: Option<SearchError>,
    loading: bool,
    generation: u64,
}

impl SearchSession {
    pub fn new(search_type: SearchType) -> Self {
        Self {
            query: SearchQuery {
                term: String::new(),
                search_type,
            },
            ..Self::default()
        }
    }

    pub fn term(&self) -> &str {
        &self.query.term
    }

    pub fn search_type(&self) -> SearchType {
        self.query.search_type
    }

    pub fn data(&self) -> Option<&SearchResult> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<&SearchError> {
        self.error.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn state(&self) -> SearchState {
        if self.loading {
            SearchState::Loading
        } else if self.error.is_some() {
            SearchState::Error
        } else if self.data.is_some() {
            SearchState::Success
        } else {
            SearchState::Idle
        }
    }

    pub fn placeholder(&self) -> &'static str {
        match self.query.search_type {
            SearchType::Video => "Type something or paste a youtube video link",
            SearchType::Playlist => "Paste a youtube playlist link or ID",
        }
    }

    /// Update the term. A changed, non-blank term starts a new fetch.
    pub fn set_term(&mut self, term: &str) -> Option<FetchRequest> {
        if self.query.term == term {
            return None;
        }

        self.query.term = term.to_string();
        if term.trim().is_empty() {
            return None;
        }

        self.generation += 1;
        self.loading = true;
        track_event("search", &format!("search for {}", term), "search input");

        let (endpoint, param) = match self.query.search_type {
            SearchType::Video => (Endpoint::Search, term.to_string()),
            SearchType::Playlist => (Endpoint::Playlist, extract_playlist_id(term)),
        };

        Some(FetchRequest {
            generation: self.generation,
            endpoint,
            param,
        })
    }

    /// Switch between video and playlist search. Clears the term and any
    /// results and invalidates fetches still in flight.
    pub fn set_search_type(&mut self, search_type: SearchType) {
        if self.query.search_type == search_type {
            return;
        }

        self.query.search_type = search_type;
        self.query.term.clear();
        self.data = None;
        self.error = None;
        self.loading = false;
        self.generation += 1;
    }

    /// Apply the outcome of a fetch. Returns `false` when it was stale.
    pub fn complete(
        &mut self,
        generation: u64,
        outcome: Result<SearchResult, SearchError>,
    ) -> bool {
        if generation != self.generation {
            debug!(
                "Dropping stale search result (generation {} < {})",
                generation, self.generation
            );
            return false;
        }

        match outcome {
            Ok(data) => {
                self.data = Some(data);
                self.error = None;
            }
            Err(err) => {
                self.data = None;
                self.error = Some(err);
            }
        }
        self.loading = false;
        true
    }

    /// Playlist creation is offered for playlist lookups with results
    pub fn can_create_playlist(&self) -> bool {
        self.query.search_type == SearchType::Playlist
            && !self.loading
            && self.data.as_ref().map_or(false, SearchResult::has_items)
    }
}

/// Where search requests are sent
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn fetch(&self, endpoint: Endpoint, param: &str) -> Result<SearchResult, SearchError>;
}

#[async_trait]
impl<T: SearchBackend + ?Sized> SearchBackend for Box<T> {
    async fn fetch(&self, endpoint: Endpoint, param: &str) -> Result<SearchResult, SearchError> {
        (**self).fetch(endpoint, param).await
    }
}

/// Goes through the proxy endpoints over HTTP
#[derive(Debug, Clone)]
pub struct ProxyBackend {
    client: Client,
    base_url: String,
}

impl ProxyBackend {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl SearchBackend for ProxyBackend {
    async fn fetch(&self, endpoint: Endpoint, param: &str) -> Result<SearchResult, SearchError> {
        let url = format!("{}{}", self.base_url, endpoint.route());
        let response = self
            .client
            .get(&url)
            .query(&[(endpoint.query_param(), param)])
            .send()
            .await
            .map_err(|e| SearchError::Transport {
                message: e.to_string(),
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| SearchError::Transport {
            message: e.to_string(),
        })?;

        if status.is_success() {
            let body = serde_json::from_str(&text).map_err(|e| SearchError::Transport {
                message: format!("Proxy returned invalid JSON: {}", e),
            })?;
            Ok(SearchResult::new(body))
        } else {
            let body = serde_json::from_str(&text).unwrap_or(Value::String(text));
            Err(SearchError::Upstream {
                status: status.as_u16(),
                body,
            })
        }
    }
}

/// Talks to the YouTube API directly, skipping the proxy
#[derive(Debug, Clone)]
pub struct DirectBackend {
    api: YoutubeApiClient,
}

impl DirectBackend {
    pub fn new(api: YoutubeApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl SearchBackend for DirectBackend {
    async fn fetch(&self, endpoint: Endpoint, param: &str) -> Result<SearchResult, SearchError> {
        self.api
            .forward(endpoint, param)
            .await
            .map(SearchResult::new)
            .map_err(SearchError::from)
    }
}

/// Drives a shared session: one spawned fetch per triggering change, no
/// cancellation, stale outcomes discarded by generation.
pub struct SearchController<B: SearchBackend + 'static> {
    backend: Arc<B>,
    session: Arc<RwLock<SearchSession>>,
    in_flight: Mutex<Vec<JoinHandle<()>>>,
}

impl<B: SearchBackend + 'static> SearchController<B> {
    pub fn new(backend: B, search_type: SearchType) -> Self {
        Self {
            backend: Arc::new(backend),
            session: Arc::new(RwLock::new(SearchSession::new(search_type))),
            in_flight: Mutex::new(Vec::new()),
        }
    }

    pub async fn snapshot(&self) -> SearchSession {
        self.session.read().await.clone()
    }

    pub async fn update_term(&self, term: &str) {
        let request = self.session.write().await.set_term(term);
        let Some(request) = request else {
            return;
        };

        info!(
            "🔍 Searching {} for {:?} (generation {})",
            request.endpoint, request.param, request.generation
        );

        let backend = Arc::clone(&self.backend);
        let session = Arc::clone(&self.session);
        let handle = tokio::spawn(async move {
            let outcome = backend.fetch(request.endpoint, &request.param).await;
            if let Err(err) = &outcome {
                error!("❌ Search failed: {}", err);
            }
            session.write().await.complete(request.generation, outcome);
        });

        let mut in_flight = self.in_flight.lock();
        in_flight.retain(|h| !h.is_finished());
        in_flight.push(handle);
    }

    pub async fn switch_type(&self, search_type: SearchType) {
        self.session.write().await.set_search_type(search_type);
    }

    /// Wait for every fetch started so far to settle
    pub async fn wait_idle(&self) {
        let handles: Vec<_> = std::mem::take(&mut *self.in_flight.lock());
        for handle in handles {
            if let Err(e) = handle.await {
                error!("Search task panicked: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ok(term: &str) -> Result<SearchResult, SearchError> {
        Ok(SearchResult::new(json!({"items": [{"id": term}]})))
    }

    #[test]
    fn test_initial_state() {
        let session = SearchSession::new(SearchType::Video);
        assert_eq!(session.state(), SearchState::Idle);
        assert_eq!(
            session.placeholder(),
            "Type something or paste a youtube video link"
        );
        assert!(!session.can_create_playlist());
    }

    #[test]
    fn test_blank_term_does_not_fetch() {
        let mut session = SearchSession::new(SearchType::Video);
        assert!(session.set_term("   ").is_none());
        assert_eq!(session.term(), "   ");
        assert_eq!(session.state(), SearchState::Idle);
        assert_eq!(session.generation(), 0);
    }

    #[test]
    fn test_unchanged_term_does_not_refetch() {
        let mut session = SearchSession::new(SearchType::Video);
        let request = session.set_term("lofi").unwrap();
        assert!(session.set_term("lofi").is_none());
        assert_eq!(session.generation(), request.generation);

        // the pending fetch still applies
        assert!(session.complete(request.generation, ok("lofi")));
        assert_eq!(session.state(), SearchState::Success);
    }

    #[test]
    fn test_video_term_targets_search() {
        let mut session = SearchSession::new(SearchType::Video);
        let request = session.set_term("lofi").unwrap();

        assert_eq!(request.endpoint, Endpoint::Search);
        assert_eq!(request.param, "lofi");
        assert_eq!(session.state(), SearchState::Loading);
    }

    #[test]
    fn test_playlist_term_extracts_id() {
        let mut session = SearchSession::new(SearchType::Playlist);
        let request = session
            .set_term("https://www.youtube.com/playlist?list=PLabc_123")
            .unwrap();

        assert_eq!(request.endpoint, Endpoint::Playlist);
        assert_eq!(request.param, "PLabc_123");
    }

    #[test]
    fn test_success_then_error() {
        let mut session = SearchSession::new(SearchType::Video);
        let request = session.set_term("a").unwrap();
        assert!(session.complete(request.generation, ok("a")));
        assert_eq!(session.state(), SearchState::Success);
        assert!(!session.is_loading());

        let request = session.set_term("b").unwrap();
        let failure = SearchError::Upstream {
            status: 403,
            body: json!({"error": "quotaExceeded"}),
        };
        assert!(session.complete(request.generation, Err(failure.clone())));
        assert_eq!(session.state(), SearchState::Error);
        assert_eq!(session.error(), Some(&failure));
        assert!(session.data().is_none());
    }

    #[test]
    fn test_stale_result_is_discarded() {
        let mut session = SearchSession::new(SearchType::Video);
        let first = session.set_term("fir").unwrap();
        let second = session.set_term("first").unwrap();

        assert!(session.complete(second.generation, ok("first")));
        assert!(!session.complete(first.generation, ok("fir")));

        let items = session.data().unwrap().items();
        assert_eq!(items[0]["id"], "first");
    }

    #[test]
    fn test_switch_type_resets_to_idle() {
        let mut session = SearchSession::new(SearchType::Video);
        let request = session.set_term("a").unwrap();

        session.set_search_type(SearchType::Playlist);
        assert_eq!(session.term(), "");
        assert_eq!(session.state(), SearchState::Idle);
        assert_eq!(session.placeholder(), "Paste a youtube playlist link or ID");

        // the fetch started before the switch no longer applies
        assert!(!session.complete(request.generation, ok("a")));
        assert!(session.data().is_none());
    }

    #[test]
    fn test_switch_to_same_type_keeps_results() {
        let mut session = SearchSession::new(SearchType::Playlist);
        let request = session.set_term("PL1").unwrap();
        session.complete(request.generation, ok("v"));

        session.set_search_type(SearchType::Playlist);
        assert!(session.data().is_some());
        assert!(session.can_create_playlist());
    }

    #[test]
    fn test_search_error_from_app_error() {
        let upstream: SearchError = AppError::Upstream {
            status: 404,
            body: json!({"error": "notFound"}),
        }
        .into();
        assert!(matches!(upstream, SearchError::Upstream { status: 404, .. }));

        let transport: SearchError = AppError::Transport("connection refused".into()).into();
        assert!(matches!(transport, SearchError::Transport { .. }));
    }
}
