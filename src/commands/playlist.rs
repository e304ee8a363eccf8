//! Playlist commands used by the CLI front end

use anyhow::{Context, Result};

use crate::core::config::AppConfig;
use crate::core::models::{AppError, AppResult, SearchType};
use crate::core::playlists::{CreatedPlaylist, PlaylistRepository};
use crate::core::search::SearchBackend;
use crate::core::storage::{FileKeyValueStore, KeyValueStore};

use super::search::run_search;

/// Open the file-backed playlist store configured for this user
pub fn open_repository(config: &AppConfig) -> Result<PlaylistRepository<FileKeyValueStore>> {
    let dir = config
        .storage_dir()
        .context("Failed to resolve playlist data directory")?;
    tracing::debug!("Using playlist storage in {:?}", dir);
    Ok(PlaylistRepository::new(FileKeyValueStore::in_dir(&dir)))
}

/// Look up a playlist by ID or URL and save its videos as a new local playlist
pub async fn create_playlist_from_search<S, B>(
    repo: &PlaylistRepository<S>,
    backend: B,
    term: &str,
) -> AppResult<CreatedPlaylist>
where
    S: KeyValueStore,
    B: SearchBackend + 'static,
{
    let session = run_search(backend, SearchType::Playlist, term).await;

    if let Some(err) = session.error() {
        return Err(err.clone().into());
    }
    if !session.can_create_playlist() {
        return Err(AppError::NotFound(format!(
            "No videos found for playlist {:?}",
            term
        )));
    }

    match session.data() {
        Some(data) => repo.create_from_results(data),
        None => Err(AppError::NotFound(format!("No results for {:?}", term))),
    }
}
