//! Third-party playlist import.
//!
//! Takes a public Spotify playlist URL, fetches the embeddable page for
//! its id, parses the `__NEXT_DATA__` structured-data block, and converts
//! the embedded track list to normalized tracks for the library store's
//! merge operation. Every step has its own failure message so the caller
//! sees which stage broke, not a generic error.

use rand::Rng;
use regex::Regex;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use crate::track::{Track, TrackSource};

const DEFAULT_BASE_URL: &str = "https://open.spotify.com";

/// Thumbnail used when the provider supplies no cover art.
const PLACEHOLDER_THUMBNAIL: &str = "https://placehold.co/200";

/// Stage-tagged import failures. The `Display` strings are the exact
/// user-visible messages.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The URL does not contain a playlist id.
    #[error("Invalid URL")]
    InvalidUrl,

    /// The embed page could not be fetched.
    #[error("Fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),

    /// The structured-data block is absent or not valid JSON.
    #[error("Parse Error")]
    ParseError,

    /// The structured data carries no track list.
    #[error("No tracks found")]
    NoTracks,
}

/// Result of a successful import: the playlist name and the tracks ready
/// for the store's merge operation.
#[derive(Debug)]
pub struct ImportedPlaylist {
    pub name: String,
    pub tracks: Vec<Track>,
}

/// Fetches and parses third-party playlist pages.
#[derive(Debug, Clone)]
pub struct PlaylistImporter {
    client: Client,
    base_url: String,
}

impl PlaylistImporter {
    /// Creates an importer against the production site.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self::with_base_url(client, DEFAULT_BASE_URL)
    }

    /// Creates an importer with a custom base URL (for testing with
    /// wiremock).
    #[must_use]
    pub fn with_base_url(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Fetches the playlist behind `url` and converts it to normalized
    /// tracks.
    ///
    /// # Errors
    ///
    /// Returns the stage-specific [`ImportError`]: `InvalidUrl` before any
    /// network call, `Fetch` on transport failure, `ParseError` when the
    /// structured-data block is missing or malformed, `NoTracks` when the
    /// entity carries no track list.
    #[tracing::instrument(skip(self))]
    pub async fn fetch(&self, url: &str) -> Result<ImportedPlaylist, ImportError> {
        let playlist_id = extract_playlist_id(url).ok_or(ImportError::InvalidUrl)?;
        debug!(%playlist_id, "Fetching playlist embed");

        let embed_url = format!("{}/embed/playlist/{playlist_id}", self.base_url);
        let html = self.client.get(&embed_url).send().await?.text().await?;

        let data = extract_next_data(&html).ok_or(ImportError::ParseError)?;

        let entity = data
            .pointer("/props/pageProps/state/data/entity")
            .ok_or(ImportError::NoTracks)?;
        let track_list = entity
            .get("trackList")
            .and_then(Value::as_array)
            .ok_or(ImportError::NoTracks)?;

        let name = entity
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or("Imported")
            .to_string();
        let tracks: Vec<Track> = track_list.iter().filter_map(map_entry).collect();

        info!(%name, count = tracks.len(), "Playlist import parsed");
        Ok(ImportedPlaylist { name, tracks })
    }
}

/// Extracts the provider playlist id from a URL.
fn extract_playlist_id(url: &str) -> Option<String> {
    let re = Regex::new(r"playlist/([a-zA-Z0-9]+)").ok()?;
    Some(re.captures(url)?.get(1)?.as_str().to_string())
}

/// Locates the embedded `__NEXT_DATA__` structured-data block and parses
/// it as JSON.
fn extract_next_data(html: &str) -> Option<Value> {
    let re = Regex::new(
        r#"(?s)<script id="__NEXT_DATA__" type="application/json">(.*?)</script>"#,
    )
    .ok()?;
    let raw = re.captures(html)?.get(1)?.as_str();
    serde_json::from_str(raw).ok()
}

/// Maps one track-list entry to a [`Track`], synthesizing a random
/// fallback id when the provider supplies none and defaulting the
/// thumbnail to a placeholder.
fn map_entry(entry: &Value) -> Option<Track> {
    let title = entry.get("title").and_then(Value::as_str)?.to_string();
    let artist = entry
        .get("subtitle")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();

    let id = entry
        .get("uri")
        .and_then(Value::as_str)
        .map_or_else(fallback_id, str::to_string);

    let thumbnail_url = entry
        .pointer("/coverArt/sources/0/url")
        .and_then(Value::as_str)
        .unwrap_or(PLACEHOLDER_THUMBNAIL)
        .to_string();

    let duration_ms = entry
        .get("duration")
        .and_then(Value::as_u64)
        .unwrap_or(0);

    Some(Track {
        search_hint: Some(format!("{artist} - {title}")),
        id,
        title,
        artist,
        thumbnail_url: Some(thumbnail_url),
        duration_ms,
        source: TrackSource::SpotifyImport,
        direct_stream_hint: None,
    })
}

fn fallback_id() -> String {
    format!("spot_{:08x}", rand::thread_rng().r#gen::<u32>())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_playlist_id() {
        assert_eq!(
            extract_playlist_id("https://open.spotify.com/playlist/37i9dQZF1DXcBWIGoYBM5M").unwrap(),
            "37i9dQZF1DXcBWIGoYBM5M"
        );
        assert!(extract_playlist_id("https://open.spotify.com/album/xyz!").is_none());
    }

    #[test]
    fn test_extract_next_data_requires_marker() {
        assert!(extract_next_data("<html><script>var x;</script></html>").is_none());
        let html = r#"<script id="__NEXT_DATA__" type="application/json">{"a":1}</script>"#;
        assert_eq!(extract_next_data(html).unwrap()["a"], 1);
    }

    #[test]
    fn test_extract_next_data_rejects_invalid_json() {
        let html = r#"<script id="__NEXT_DATA__" type="application/json">{broken</script>"#;
        assert!(extract_next_data(html).is_none());
    }

    #[test]
    fn test_map_entry_full() {
        let entry = serde_json::json!({
            "uri": "spotify:track:abc",
            "title": "Song",
            "subtitle": "Artist",
            "duration": 200_000,
            "coverArt": {"sources": [{"url": "https://cdn/art.jpg"}]}
        });
        let track = map_entry(&entry).unwrap();
        assert_eq!(track.id, "spotify:track:abc");
        assert_eq!(track.source, TrackSource::SpotifyImport);
        assert_eq!(track.thumbnail_url.unwrap(), "https://cdn/art.jpg");
        assert_eq!(track.search_hint.unwrap(), "Artist - Song");
    }

    #[test]
    fn test_map_entry_synthesizes_id_and_placeholder() {
        let entry = serde_json::json!({"title": "Song", "subtitle": "Artist"});
        let track = map_entry(&entry).unwrap();
        assert!(track.id.starts_with("spot_"));
        assert_eq!(track.thumbnail_url.unwrap(), PLACEHOLDER_THUMBNAIL);
        assert_eq!(track.duration_ms, 0);
    }

    #[test]
    fn test_map_entry_requires_title() {
        assert!(map_entry(&serde_json::json!({"subtitle": "Artist"})).is_none());
    }
}
