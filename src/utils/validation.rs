//! URL and input validation utilities

use anyhow::{anyhow, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

static PLAYLIST_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:&list=|\?list=|be/)((?-u:\w)*)").expect("valid playlist regex"));

/// Validate if URL is well formed
pub fn validate_url(url: &str) -> Result<Url> {
    Url::parse(url).map_err(|e| anyhow!("Invalid URL format: {}", e))
}

/// Grab the playlist ID from a pasted YouTube URL.
///
/// Anything without a `.` is taken to be an ID already. A URL that does not
/// carry a `list=` parameter (or a `be/` short link) is returned trimmed, as typed.
pub fn extract_playlist_id(term: &str) -> String {
    let term = term.trim();
    if !term.contains('.') {
        return term.to_string();
    }

    match PLAYLIST_ID_RE.captures(term).and_then(|c| c.get(1)) {
        Some(id) => id.as_str().to_string(),
        None => {
            tracing::debug!("No playlist id found in {:?}, using it verbatim", term);
            term.to_string()
        }
    }
}
