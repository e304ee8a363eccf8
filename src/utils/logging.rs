use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "yt_playlist_maker=info,tower_http=info";

/// Target used for search analytics events
pub const ANALYTICS_TARGET: &str = "analytics";

pub fn init_tracing() {
    init_tracing_with(None);
}

/// Initialise the global subscriber. `level` (e.g. from configuration) is
/// only used when `RUST_LOG` is not set. Repeated calls are ignored.
pub fn init_tracing_with(level: Option<&str>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match level {
        Some(level) => format!("yt_playlist_maker={level},tower_http={level}").into(),
        None => DEFAULT_LOG_FILTER.into(),
    });

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Emit a search analytics event (category / action / label)
pub fn track_event(category: &str, action: &str, label: &str) {
    tracing::info!(
        target: ANALYTICS_TARGET,
        category = category,
        action = action,
        label = label,
        "analytics event"
    );
}
