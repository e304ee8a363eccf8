//! YT Playlist Maker - Core Library
//!
//! A small proxy in front of the YouTube Data API plus a local playlist
//! builder: search videos or a playlist, then save the results as a named
//! playlist with per-video trim markers.

pub mod commands;
pub mod core;
pub mod utils;

// Re-export commonly used types
pub use crate::core::{
    config::AppConfig,
    models::{
        AppError, AppResult, PlaylistRecord, PlaylistStore, PlaylistVideo, SearchQuery,
        SearchResult, SearchType,
    },
    naming::unique_name,
    playlists::{CreatedPlaylist, PlaylistRepository},
    search::{SearchController, SearchError, SearchSession, SearchState},
    storage::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore},
    youtube_api::{Endpoint, YoutubeApiClient},
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Initialize logging with default settings
pub fn init() -> anyhow::Result<()> {
    utils::logging::init_tracing();
    tracing::info!("📚 {} v{} initialized", NAME, VERSION);
    Ok(())
}
