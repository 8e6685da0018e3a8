//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Search, stream, and collect audio from multiple providers.
#[derive(Parser, Debug)]
#[command(name = "cadence")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Override the library document location
    #[arg(long)]
    pub data_path: Option<PathBuf>,

    /// Override the media tool binary
    #[arg(long)]
    pub tool: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Search all catalog providers for a query or single-track URL
    Search {
        /// Free-text query or recognized track URL
        query: String,
    },
    /// Search, pick the top result, and resolve it to a stream URL
    Play {
        /// Free-text query or recognized track URL
        query: String,
    },
    /// Show playback history, most recent first
    History,
    /// List playlists and their sizes
    Playlists,
    /// Create an empty playlist
    CreatePlaylist { name: String },
    /// Delete a playlist (Favorites is refused)
    DeletePlaylist { name: String },
    /// Search for a track and add the top result to Favorites
    Like {
        /// Free-text query or recognized track URL
        query: String,
    },
    /// Remove a track from Favorites by its id
    Unlike { track_id: String },
    /// Import a public playlist URL into the library
    Import { url: String },
    /// Download best-audio for a title, preferring a direct locator
    Download {
        title: String,
        /// Direct media URL; non-URL locators fall back to search
        #[arg(default_value = "")]
        locator: String,
    },
    /// Print all settings
    Settings,
    /// Set a settings key to a JSON value (unknown keys persist as-is)
    SetSetting { key: String, value: String },
}
