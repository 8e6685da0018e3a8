//! CLI entry point for the cadence player backend.

use anyhow::{Result, bail};
use cadence::presence::LogPresence;
use cadence::{App, AppConfig, Track};
use clap::Parser;
use tracing::{debug, info};

mod cli;

use cli::{Args, Command};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Determine log level based on verbose/quiet flags
    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");

    let mut config = AppConfig::default();
    if let Some(path) = args.data_path {
        config.data_path = path;
    }
    if let Some(tool) = args.tool {
        config.tool_binary = tool;
    }

    info!(data_path = %config.data_path.display(), "Cadence starting");
    let app = App::bootstrap(&config, Box::new(LogPresence)).await?;

    match args.command {
        Command::Search { query } => {
            let results = app.search(&query).await;
            if results.is_empty() {
                info!("No results");
                return Ok(());
            }
            for track in &results {
                print_track(track);
            }
        }
        Command::Play { query } => {
            let results = app.search(&query).await;
            let Some(track) = results.first() else {
                bail!("No results for '{query}'");
            };
            let playback = app.play(track).await?;
            println!("{} - {}", track.artist, track.title);
            println!("{}", playback.stream_url);
            if playback.duration_ms > 0 {
                println!("{}ms", playback.duration_ms);
            }
        }
        Command::History => {
            for track in app.history() {
                print_track(&track);
            }
        }
        Command::Playlists => {
            for playlist in app.playlists() {
                let marker = if playlist.locked { " (locked)" } else { "" };
                println!("{}{} [{} songs]", playlist.name, marker, playlist.songs.len());
            }
        }
        Command::CreatePlaylist { name } => {
            app.create_playlist(&name);
            info!(%name, "Playlist created");
        }
        Command::DeletePlaylist { name } => {
            if app.delete_playlist(&name) {
                info!(%name, "Playlist deleted");
            } else {
                bail!("Cannot delete '{name}'");
            }
        }
        Command::Like { query } => {
            let results = app.search(&query).await;
            let Some(track) = results.first() else {
                bail!("No results for '{query}'");
            };
            if app.add_to_playlist(cadence::FAVORITES, track) {
                info!(id = %track.id, "Added to Favorites");
            } else {
                info!(id = %track.id, "Already in Favorites");
            }
        }
        Command::Unlike { track_id } => {
            app.remove_from_playlist(cadence::FAVORITES, &track_id);
            info!(%track_id, "Removed from Favorites");
        }
        Command::Import { url } => {
            let summary = app.import_playlist(&url).await?;
            info!(name = %summary.name, count = summary.count, "Import complete");
            println!("{} [{} songs]", summary.name, summary.count);
        }
        Command::Download { title, locator } => {
            let path = app.download(&title, &locator).await?;
            println!("{}", path.display());
        }
        Command::Settings => {
            for (key, value) in app.settings() {
                println!("{key} = {value}");
            }
        }
        Command::SetSetting { key, value } => {
            // Non-JSON input is stored as a plain string.
            let parsed = serde_json::from_str(&value)
                .unwrap_or_else(|_| serde_json::Value::String(value));
            app.set_setting(&key, parsed);
            info!(%key, "Setting updated");
        }
    }

    Ok(())
}

fn print_track(track: &Track) {
    println!("[{}] {} - {}", track.id, track.artist, track.title);
}
