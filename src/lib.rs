//! Cadence Core Library
//!
//! Cadence turns a free-text query into a playable audio stream by
//! aggregating search across independent catalog providers, resolving the
//! chosen track through an ordered list of fallback strategies, and
//! persisting listening history and playlists across sessions.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`track`] - Normalized track model shared across components
//! - [`library`] - Durable document store for history, playlists, settings
//! - [`search`] - Search aggregation across catalog providers
//! - [`resolver`] - Ordered-strategy stream resolution
//! - [`importer`] - Third-party playlist import
//! - [`download`] - Local file materialization via the media tool
//! - [`media_tool`] - External media-tool invocation with timeout bounds
//! - [`auth`] - Rotating provider credential supplier
//! - [`app`] - Assembled application context and entry points

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod app;
pub mod auth;
pub mod config;
pub mod download;
pub mod importer;
pub mod library;
pub mod media_tool;
pub mod presence;
pub mod resolver;
pub mod search;
pub mod track;

// Re-export commonly used types
pub use app::{App, ImportSummary, Playback};
pub use config::AppConfig;
pub use download::{DownloadError, DownloadPipeline};
pub use importer::{ImportError, PlaylistImporter};
pub use library::{FAVORITES, HISTORY_CAPACITY, LibraryDocument, LibraryStore, Playlist};
pub use media_tool::{MediaTool, MediaToolError};
pub use resolver::{ResolveError, ResolvedStream, StreamResolver, build_default_resolver};
pub use search::{ItunesCatalog, SearchAggregator, SoundcloudCatalog, SpotifyLookup};
pub use track::{Track, TrackSource};
