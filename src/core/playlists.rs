//! Local playlist persistence
//!
//! All playlists live in one JSON object stored under the `playlists` key.
//! Every mutation is a full read-modify-write of that object done through
//! `KeyValueStore::update_item`, so concurrent writers, including other
//! processes on the same data directory, cannot clobber each other.

use serde::Serialize;
use tracing::{debug, info, warn};

use super::models::{
    AppError, AppResult, PlaylistRecord, PlaylistStore, PlaylistVideo, SearchResult,
    PLAYLISTS_KEY,
};
use super::naming::{unique_name, DEFAULT_PLAYLIST_NAME};
use super::storage::KeyValueStore;
use crate::utils::date::date_now;

/// Route of the playlist view
pub const PLAYLIST_ROUTE: &str = "/playlist";

/// Outcome of creating a playlist from search results
#[derive(Debug, Clone, Serialize)]
pub struct CreatedPlaylist {
    pub name: String,
    pub record: PlaylistRecord,
    /// Where the caller should navigate next (`/playlist?id=<name>`)
    pub route: String,
}

/// Route addressing a playlist by name
pub fn playlist_route(name: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(name.as_bytes()).collect();
    format!("{}?id={}", PLAYLIST_ROUTE, encoded)
}

pub struct PlaylistRepository<S: KeyValueStore> {
    storage: S,
}

/// Parse a stored playlist mapping. A missing key or a literal `null` is an
/// empty store.
fn parse_store(raw: Option<&str>) -> AppResult<PlaylistStore> {
    match raw.map(str::trim) {
        None | Some("null") => Ok(PlaylistStore::new()),
        Some(raw) => serde_json::from_str(raw)
            .map_err(|e| AppError::Parse(format!("Stored playlists are not valid: {}", e))),
    }
}

impl<S: KeyValueStore> PlaylistRepository<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Read the whole store. A missing key is an empty store.
    pub fn load(&self) -> AppResult<PlaylistStore> {
        parse_store(self.storage.get_item(PLAYLISTS_KEY)?.as_deref())
    }

    /// Overwrite the persisted store with `store`
    pub fn save(&self, store: &PlaylistStore) -> AppResult<()> {
        let raw = serde_json::to_string(store)?;
        self.storage.set_item(PLAYLISTS_KEY, &raw)?;
        debug!("Saved {} playlist(s)", store.len());
        Ok(())
    }

    fn modify<T>(&self, f: impl FnOnce(&mut PlaylistStore) -> AppResult<T>) -> AppResult<T> {
        let mut out = None;
        self.storage.update_item(
            PLAYLISTS_KEY,
            Box::new(|raw: Option<String>| -> AppResult<String> {
                let mut store = parse_store(raw.as_deref())?;
                out = Some(f(&mut store)?);
                debug!("Saving {} playlist(s)", store.len());
                Ok(serde_json::to_string(&store)?)
            }),
        )?;
        out.ok_or_else(|| AppError::Storage("Playlist update was not applied".into()))
    }

    /// Build an `Untitled` playlist from the items of a search result and
    /// persist it next to the existing ones.
    pub fn create_from_results(&self, results: &SearchResult) -> AppResult<CreatedPlaylist> {
        let videos: Vec<PlaylistVideo> = results
            .items()
            .iter()
            .filter_map(|item| {
                let video = PlaylistVideo::from_item(item);
                if video.is_none() {
                    warn!("Skipping item without a video id: {}", item);
                }
                video
            })
            .collect();

        let record = self.modify(|store| {
            let name = unique_name(DEFAULT_PLAYLIST_NAME, store);
            let record = PlaylistRecord {
                name,
                created: date_now(),
                videos,
            };
            store.insert(record.clone());
            Ok(record)
        })?;

        info!(
            "📋 Created playlist '{}' with {} video(s)",
            record.name,
            record.videos.len()
        );

        Ok(CreatedPlaylist {
            name: record.name.clone(),
            route: playlist_route(&record.name),
            record,
        })
    }

    pub fn list(&self) -> AppResult<Vec<PlaylistRecord>> {
        let store = self.load()?;
        Ok(store.sorted().into_iter().cloned().collect())
    }

    pub fn get(&self, name: &str) -> AppResult<Option<PlaylistRecord>> {
        Ok(self.load()?.get(name).cloned())
    }

    /// Remove a playlist, reporting whether it existed
    pub fn delete(&self, name: &str) -> AppResult<bool> {
        let removed = self.modify(|store| Ok(store.remove(name).is_some()))?;
        if removed {
            info!("🗑️ Deleted playlist '{}'", name);
        }
        Ok(removed)
    }

    /// Rename `old` to `desired`, made unique against the other playlists.
    /// Returns the name actually used.
    pub fn rename(&self, old: &str, desired: &str) -> AppResult<String> {
        let desired = desired.trim();
        if desired.is_empty() {
            return Err(AppError::Validation("Playlist name cannot be empty".into()));
        }

        let new_name = self.modify(|store| {
            let mut record = store
                .remove(old)
                .ok_or_else(|| AppError::NotFound(format!("Playlist '{}'", old)))?;
            let new_name = unique_name(desired, store);
            record.name = new_name.clone();
            store.insert(record);
            Ok(new_name)
        })?;

        info!("Renamed playlist '{}' to '{}'", old, new_name);
        Ok(new_name)
    }

    /// Set the trim markers (seconds) of the video at `index`.
    /// `end == 0` means "play to the end".
    pub fn set_trim(&self, name: &str, index: usize, start: f64, end: f64) -> AppResult<()> {
        validate_trim(start, end)?;

        self.modify(|store| {
            let record = store
                .get_mut(name)
                .ok_or_else(|| AppError::NotFound(format!("Playlist '{}'", name)))?;
            let count = record.videos.len();
            let video = record.videos.get_mut(index).ok_or_else(|| {
                AppError::NotFound(format!(
                    "Video #{} in playlist '{}' ({} videos)",
                    index, name, count
                ))
            })?;
            video.start = start;
            video.end = end;
            Ok(())
        })?;

        debug!("Trimmed '{}' #{} to {}..{}", name, index, start, end);
        Ok(())
    }
}

fn validate_trim(start: f64, end: f64) -> AppResult<()> {
    if !start.is_finite() || !end.is_finite() {
        return Err(AppError::Validation("Trim markers must be finite".into()));
    }
    if start < 0.0 || end < 0.0 {
        return Err(AppError::Validation("Trim markers cannot be negative".into()));
    }
    if end != 0.0 && end < start {
        return Err(AppError::Validation(format!(
            "End marker {} is before start marker {}",
            end, start
        )));
    }
    Ok(())
}
