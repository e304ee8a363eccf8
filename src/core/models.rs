//! Core data models: search queries, upstream documents and local playlists

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;

/// Storage key holding the whole playlist mapping
pub const PLAYLISTS_KEY: &str = "playlists";

/// Which kind of lookup the search box performs
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    #[default]
    Video,
    Playlist,
}

impl fmt::Display for SearchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Video => write!(f, "video"),
            Self::Playlist => write!(f, "playlist"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SearchQuery {
    pub term: String,
    pub search_type: SearchType,
}

/// Opaque upstream response (`{items: [...], ...}`), passed through untouched
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct SearchResult(pub Value);

impl SearchResult {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Entries of `items`, empty when absent or not an array
    pub fn items(&self) -> &[Value] {
        self.0
            .get("items")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn has_items(&self) -> bool {
        !self.items().is_empty()
    }
}

/// Borrowed view over one upstream item (video, search hit or playlist item)
#[derive(Debug, Clone, Copy)]
pub struct VideoItem<'a>(&'a Value);

impl<'a> VideoItem<'a> {
    pub fn new(value: &'a Value) -> Self {
        Self(value)
    }

    /// `snippet.resourceId.videoId`, set on playlist items
    pub fn resource_video_id(&self) -> Option<&'a str> {
        self.0
            .get("snippet")?
            .get("resourceId")?
            .get("videoId")?
            .as_str()
            .filter(|id| !id.is_empty())
    }

    /// Identifier used inside a local playlist: the nested resource video ID,
    /// then the item's own string `id`, then `id.videoId` for search hits.
    pub fn playlist_video_id(&self) -> Option<String> {
        if let Some(id) = self.resource_video_id() {
            return Some(id.to_string());
        }

        match self.0.get("id")? {
            Value::String(id) if !id.is_empty() => Some(id.clone()),
            Value::Object(obj) => obj
                .get("videoId")
                .and_then(Value::as_str)
                .map(str::to_string),
            _ => None,
        }
    }

    pub fn title(&self) -> Option<&'a str> {
        self.0.get("snippet")?.get("title")?.as_str()
    }

    pub fn fields(&self) -> Option<&'a Map<String, Value>> {
        self.0.as_object()
    }
}

/// A video inside a local playlist, with trim markers in seconds
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlaylistVideo {
    pub id: String,
    #[serde(default)]
    pub start: f64,
    #[serde(default)]
    pub end: f64,
    /// Every other field copied from the upstream item
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl PlaylistVideo {
    /// Copy an upstream item, resetting the trim markers.
    /// Returns `None` when no identifier can be resolved.
    pub fn from_item(item: &Value) -> Option<Self> {
        let view = VideoItem::new(item);
        let id = view.playlist_video_id()?;

        let mut details = view.fields().cloned().unwrap_or_default();
        details.remove("id");
        details.remove("start");
        details.remove("end");

        Some(Self {
            id,
            start: 0.0,
            end: 0.0,
            details,
        })
    }

    pub fn title(&self) -> Option<&str> {
        self.details.get("snippet")?.get("title")?.as_str()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlaylistRecord {
    pub name: String,
    pub created: String,
    #[serde(default)]
    pub videos: Vec<PlaylistVideo>,
}

/// Every local playlist, keyed by its unique name
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(transparent)]
pub struct PlaylistStore(pub HashMap<String, PlaylistRecord>);

impl PlaylistStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&PlaylistRecord> {
        self.0.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut PlaylistRecord> {
        self.0.get_mut(name)
    }

    pub fn insert(&mut self, record: PlaylistRecord) -> Option<PlaylistRecord> {
        self.0.insert(record.name.clone(), record)
    }

    pub fn remove(&mut self, name: &str) -> Option<PlaylistRecord> {
        self.0.remove(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Records ordered by name
    pub fn sorted(&self) -> Vec<&PlaylistRecord> {
        let mut records: Vec<_> = self.0.values().collect();
        records.sort_by(|a, b| a.name.cmp(&b.name));
        records
    }
}

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Upstream returned HTTP {status}: {body}")]
    Upstream { status: u16, body: Value },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Parsing error: {0}")]
    Parse(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Parse(err.to_string())
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
