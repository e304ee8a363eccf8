use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, warn};

use yt_playlist_maker::commands::{self, backend_for, create_playlist_from_search, open_repository};
use yt_playlist_maker::core::models::VideoItem;
use yt_playlist_maker::core::search::SearchSession;
use yt_playlist_maker::utils::logging::init_tracing_with;
use yt_playlist_maker::{AppConfig, PlaylistRecord, SearchError, SearchType};

#[derive(Debug, Parser)]
#[command(name = "yt-playlist-maker", version, about = "Search YouTube and build trimmed local playlists")]
struct Cli {
    /// Use this configuration file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Query the YouTube API directly instead of the proxy
    #[arg(long, global = true)]
    direct: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the proxy service
    Serve {
        #[arg(long)]
        port: Option<u16>,
    },
    /// Search videos, or look up a playlist with --playlist
    Search {
        term: String,
        #[arg(long)]
        playlist: bool,
        /// Print the raw JSON response
        #[arg(long)]
        json: bool,
    },
    /// Look up a playlist by ID or URL and save it locally
    CreatePlaylist { term: String },
    /// Manage local playlists
    #[command(subcommand)]
    Playlists(PlaylistsCommand),
    /// Inspect configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Debug, Subcommand)]
enum PlaylistsCommand {
    List,
    Show { name: String },
    Delete { name: String },
    Rename { name: String, new_name: String },
    /// Set the start/end markers (seconds) of one video; end 0 plays to the end
    Trim {
        name: String,
        index: usize,
        start: f64,
        end: f64,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigCommand {
    Show,
    Path,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_ref());
    init_tracing_with(Some(&config.advanced.log_level));

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("❌ {:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> AppConfig {
    let loaded = match path {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    };

    let mut config = match loaded {
        Ok(cfg) => match cfg.validate() {
            Ok(()) => cfg,
            Err(err) => {
                eprintln!("Invalid configuration ({}), falling back to defaults", err);
                AppConfig::default()
            }
        },
        Err(err) => {
            eprintln!("Failed to load configuration: {:#}. Using defaults", err);
            AppConfig::default()
        }
    };

    config.apply_env_overrides();
    config
}

async fn run(cli: Cli, mut config: AppConfig) -> Result<()> {
    if cli.direct {
        config.client.direct = true;
    }

    match cli.command {
        Command::Serve { port } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            if config.api_key().is_empty() {
                warn!("⚠️ YOUTUBE_API_V3 is not set");
            }
            commands::serve(&config).await
        }
        Command::Search {
            term,
            playlist,
            json,
        } => {
            let search_type = if playlist {
                SearchType::Playlist
            } else {
                SearchType::Video
            };
            let backend = backend_for(&config)?;
            let session = commands::run_search(backend, search_type, &term).await;
            print_session(&session, json)
        }
        Command::CreatePlaylist { term } => {
            let repo = open_repository(&config)?;
            let backend = backend_for(&config)?;
            let created = create_playlist_from_search(&repo, backend, &term).await?;
            println!(
                "Created playlist '{}' with {} video(s)",
                created.name,
                created.record.videos.len()
            );
            println!("Open: {}", created.route);
            Ok(())
        }
        Command::Playlists(cmd) => run_playlists(cmd, &config),
        Command::Config(ConfigCommand::Show) => {
            let mut shown = config.clone();
            if shown.youtube.api_key.is_some() {
                shown.youtube.api_key = Some("<redacted>".to_string());
            }
            println!("{}", shown.export()?);
            Ok(())
        }
        Command::Config(ConfigCommand::Path) => {
            println!("{}", AppConfig::get_config_path()?.display());
            println!("{}", config.storage_dir()?.display());
            Ok(())
        }
    }
}

fn run_playlists(cmd: PlaylistsCommand, config: &AppConfig) -> Result<()> {
    let repo = open_repository(config)?;

    match cmd {
        PlaylistsCommand::List => {
            let records = repo.list()?;
            if records.is_empty() {
                println!("No playlists yet");
            }
            for record in records {
                println!(
                    "{}  ({} videos, created {})",
                    record.name,
                    record.videos.len(),
                    record.created
                );
            }
        }
        PlaylistsCommand::Show { name } => {
            let record = repo
                .get(&name)?
                .with_context(|| format!("No playlist named '{}'", name))?;
            print_record(&record);
        }
        PlaylistsCommand::Delete { name } => {
            if repo.delete(&name)? {
                println!("Deleted '{}'", name);
            } else {
                println!("No playlist named '{}'", name);
            }
        }
        PlaylistsCommand::Rename { name, new_name } => {
            let used = repo.rename(&name, &new_name)?;
            println!("Renamed '{}' to '{}'", name, used);
        }
        PlaylistsCommand::Trim {
            name,
            index,
            start,
            end,
        } => {
            repo.set_trim(&name, index, start, end)?;
            println!("Trimmed '{}' #{} to {}s..{}s", name, index, start, end);
        }
    }
    Ok(())
}

fn print_session(session: &SearchSession, json: bool) -> Result<()> {
    if let Some(err) = session.error() {
        match err {
            SearchError::Upstream { status, body } => {
                anyhow::bail!("request failed with HTTP {}: {}", status, body)
            }
            SearchError::Transport { message } => anyhow::bail!("request failed: {}", message),
        }
    }

    let Some(data) = session.data() else {
        println!("No results");
        return Ok(());
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&data.0)?);
        return Ok(());
    }

    for (i, item) in data.items().iter().enumerate() {
        let view = VideoItem::new(item);
        println!(
            "{:>3}. {}  {}",
            i,
            view.playlist_video_id().unwrap_or_else(|| "?".to_string()),
            view.title().unwrap_or("")
        );
    }
    if session.can_create_playlist() {
        println!("\nSave these with: yt-playlist-maker create-playlist {:?}", session.term());
    }
    Ok(())
}

fn print_record(record: &PlaylistRecord) {
    println!("{} (created {})", record.name, record.created);
    for (i, video) in record.videos.iter().enumerate() {
        let end = if video.end == 0.0 {
            "end".to_string()
        } else {
            format!("{}s", video.end)
        };
        println!(
            "{:>3}. {}  {}  [{}s..{}]",
            i,
            video.id,
            video.title().unwrap_or(""),
            video.start,
            end
        );
    }
}
