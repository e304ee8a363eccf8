//! Application configuration management

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::utils::network::get_user_agent;
use crate::utils::validation::validate_url;

/// Environment variable carrying the YouTube Data API key
pub const API_KEY_ENV: &str = "YOUTUBE_API_V3";
/// Environment variable overriding the listen port
pub const PORT_ENV: &str = "PORT";
/// Environment variable overriding the playlist data directory
pub const DATA_DIR_ENV: &str = "YT_PLAYLIST_DATA_DIR";

/// Main application configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub youtube: YoutubeConfig,
    pub storage: StorageConfig,
    pub client: ClientConfig,
    pub advanced: AdvancedConfig,
}

/// Proxy server settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub enable_cors: bool,
}

/// Upstream YouTube Data API settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct YoutubeConfig {
    pub api_base_url: String,
    /// Server-held credential; `YOUTUBE_API_V3` takes precedence
    pub api_key: Option<String>,
    pub timeout_seconds: u64,
    pub user_agent: String,
}

/// Where local playlists are kept
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StorageConfig {
    /// Defaults to the platform data directory when unset
    pub data_dir: Option<String>,
}

/// Settings for the search front end
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientConfig {
    /// Base URL of the proxy the CLI searches through
    pub proxy_url: String,
    /// Query the upstream API directly instead of going through the proxy
    pub direct: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdvancedConfig {
    pub log_level: String, // "error", "warn", "info", "debug", "trace"
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            youtube: YoutubeConfig::default(),
            storage: StorageConfig::default(),
            client: ClientConfig::default(),
            advanced: AdvancedConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            enable_cors: true,
        }
    }
}

impl Default for YoutubeConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://www.googleapis.com/youtube/v3".to_string(),
            api_key: None,
            timeout_seconds: 30,
            user_agent: get_user_agent().to_string(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { data_dir: None }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            proxy_url: "http://127.0.0.1:3000".to_string(),
            direct: false,
        }
    }
}

impl Default for AdvancedConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default location, creating it if missing
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Self::default();
            config.save_to(&config_path)?;
            tracing::info!("Created default configuration at: {:?}", config_path);
            Ok(config)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: AppConfig =
            serde_json::from_str(&content).with_context(|| "Failed to parse config file")?;

        tracing::info!("Loaded configuration from: {:?}", path);
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = self.export()?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;

        tracing::info!("Saved configuration to: {:?}", path);
        Ok(())
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("com", "ytplaylistmaker", "yt-playlist-maker")
            .with_context(|| "Failed to get project directories")
    }

    /// Get the path to the configuration file
    pub fn get_config_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.json"))
    }

    /// Get the application data directory
    pub fn get_data_dir() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.data_dir().to_path_buf())
    }

    /// Directory holding the playlist store
    pub fn storage_dir(&self) -> Result<PathBuf> {
        match &self.storage.data_dir {
            Some(dir) => Ok(PathBuf::from(dir)),
            None => Self::get_data_dir(),
        }
    }

    /// Export configuration as JSON string
    pub fn export(&self) -> Result<String> {
        serde_json::to_string_pretty(self).with_context(|| "Failed to export configuration")
    }

    /// Parse and validate configuration from a JSON string
    pub fn import(json: &str) -> Result<Self> {
        let config: AppConfig =
            serde_json::from_str(json).with_context(|| "Failed to parse imported configuration")?;

        config
            .validate()
            .with_context(|| "Imported configuration is invalid")?;

        Ok(config)
    }

    /// Apply `YOUTUBE_API_V3`, `PORT` and `YT_PLAYLIST_DATA_DIR`
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup(API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            self.youtube.api_key = Some(key);
        }

        if let Some(port) = lookup(PORT_ENV) {
            match port.parse::<u16>() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!("Ignoring invalid {}={:?}", PORT_ENV, port),
            }
        }

        if let Some(dir) = lookup(DATA_DIR_ENV).filter(|d| !d.trim().is_empty()) {
            self.storage.data_dir = Some(dir);
        }
    }

    /// Credential sent upstream. Empty when unset; the upstream rejects it.
    pub fn api_key(&self) -> &str {
        self.youtube.api_key.as_deref().unwrap_or("")
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.server.host.trim().is_empty() {
            anyhow::bail!("Server host must not be empty");
        }

        if validate_url(&self.youtube.api_base_url).is_err() {
            anyhow::bail!("Invalid YouTube API base URL: {}", self.youtube.api_base_url);
        }

        if self.youtube.timeout_seconds == 0 || self.youtube.timeout_seconds > 300 {
            anyhow::bail!("Timeout should be between 1 and 300 seconds");
        }

        if validate_url(&self.client.proxy_url).is_err() {
            anyhow::bail!("Invalid proxy URL: {}", self.client.proxy_url);
        }

        if !["error", "warn", "info", "debug", "trace"].contains(&self.advanced.log_level.as_str())
        {
            anyhow::bail!(
                "Invalid log level: must be 'error', 'warn', 'info', 'debug', or 'trace'"
            );
        }

        Ok(())
    }
}
