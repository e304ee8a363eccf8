//! Unique playlist naming
//!
//! New playlists are called `Untitled`; a clash appends `-copy` until the
//! name is free (`Untitled`, `Untitled-copy`, `Untitled-copy-copy`, ...).

use super::models::PlaylistStore;

pub const DEFAULT_PLAYLIST_NAME: &str = "Untitled";
pub const COPY_SUFFIX: &str = "-copy";

/// Return `candidate` if no playlist uses it, otherwise the first free
/// `candidate-copy[-copy...]` variant.
pub fn unique_name(candidate: &str, existing: &PlaylistStore) -> String {
    let mut name = candidate.to_string();
    while existing.contains(&name) {
        name.push_str(COPY_SUFFIX);
    }
    name
}
