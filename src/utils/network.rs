//! Network utilities and helpers

use anyhow::{Context, Result};
use std::time::Duration;

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Get user agent string
pub fn get_user_agent() -> &'static str {
    concat!("yt-playlist-maker/", env!("CARGO_PKG_VERSION"))
}

/// Build the shared reqwest client used for upstream and proxy calls
pub fn build_http_client(timeout_seconds: u64, user_agent: &str) -> Result<reqwest::Client> {
    let timeout = if timeout_seconds == 0 {
        DEFAULT_TIMEOUT
    } else {
        Duration::from_secs(timeout_seconds)
    };

    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(user_agent)
        .build()
        .context("Failed to build HTTP client")
}
