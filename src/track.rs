//! Normalized track model shared by every component.
//!
//! A [`Track`] is the single schema that search hits, history entries,
//! playlist songs, and imported entries all normalize into. The opaque
//! `id` is the sole identity key for de-duplication everywhere.

use serde::{Deserialize, Serialize};

/// Which provider a track was normalized from.
///
/// The variant decides resolution behavior: only [`TrackSource::Soundcloud`]
/// tracks carry a usable direct stream hint; everything else goes straight
/// to the search fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TrackSource {
    /// Primary catalog (iTunes search API).
    Itunes,
    /// Secondary catalog (SoundCloud search API).
    Soundcloud,
    /// Single-track Spotify URL resolved directly from page metadata.
    Spotify,
    /// Entry merged in by the playlist importer.
    SpotifyImport,
    /// Origin unknown (e.g. documents written by older versions).
    #[default]
    #[serde(other)]
    Unknown,
}

/// Normalized descriptor of a playable audio item.
///
/// `duration_ms == 0` means "unknown, resolve later"; a nonzero value is
/// authoritative. Field names are camelCase on disk so documents written by
/// earlier builds keep loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    /// Opaque, provider-scoped, stable identifier. Never empty for tracks
    /// that enter the library.
    pub id: String,
    pub title: String,
    pub artist: String,
    /// Artwork URL when the provider supplies one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    /// Authoritative duration in milliseconds, or 0 when unknown.
    #[serde(default)]
    pub duration_ms: u64,
    #[serde(default)]
    pub source: TrackSource,
    /// Provider-specific locator that can skip search-based resolution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direct_stream_hint: Option<String>,
    /// Pre-formatted "artist - title" string used as the fallback query.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_hint: Option<String>,
}

impl Track {
    /// Builds the fallback search query: the pre-formatted hint when
    /// present, else `"{artist} - {title}"`.
    #[must_use]
    pub fn fallback_query(&self) -> String {
        self.search_hint
            .clone()
            .unwrap_or_else(|| format!("{} - {}", self.artist, self.title))
    }
}
