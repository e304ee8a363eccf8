//! Core business logic module
//!
//! This module contains the domain models, the playlist store, the search
//! session and the upstream YouTube client.

pub mod config;
pub mod models;
pub mod naming;
pub mod playlists;
pub mod search;
pub mod storage;
pub mod youtube_api;


#[cfg(test)]
mod search_integration_tests;


// Re-export commonly used types
pub use config::AppConfig;
pub use playlists::PlaylistRepository;
pub use search::SearchController;
