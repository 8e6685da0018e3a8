//! Primary catalog: the iTunes search API.
//!
//! Exact-match style search; durations from this provider are authoritative
//! and hits never carry a direct stream hint, so playback always goes
//! through the search fallback.

use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::track::{Track, TrackSource};

use super::SearchError;

const DEFAULT_BASE_URL: &str = "https://itunes.apple.com";
const RESULT_LIMIT: u32 = 10;

/// One hit from the iTunes search response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItunesHit {
    track_id: Option<i64>,
    track_name: Option<String>,
    artist_name: Option<String>,
    artwork_url100: Option<String>,
    track_time_millis: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ItunesResponse {
    #[serde(default)]
    results: Vec<ItunesHit>,
}

/// Client for the primary catalog.
#[derive(Debug, Clone)]
pub struct ItunesCatalog {
    client: Client,
    base_url: String,
}

impl ItunesCatalog {
    /// Creates a catalog client against the production endpoint.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self::with_base_url(client, DEFAULT_BASE_URL)
    }

    /// Creates a catalog client with a custom base URL (for testing with
    /// wiremock).
    #[must_use]
    pub fn with_base_url(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Searches the catalog and maps hits to normalized tracks.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] on network failure, non-success status, or
    /// an unexpected response shape. The aggregator treats any error as
    /// "this provider contributed nothing".
    #[tracing::instrument(skip(self), fields(provider = "itunes"))]
    pub async fn search(&self, query: &str) -> Result<Vec<Track>, SearchError> {
        let url = format!(
            "{}/search?term={}&media=music&limit={RESULT_LIMIT}",
            self.base_url,
            urlencoding::encode(query)
        );

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::status("itunes", status.as_u16()));
        }

        let body: ItunesResponse = response.json().await?;
        let tracks: Vec<Track> = body.results.into_iter().filter_map(map_hit).collect();
        debug!(count = tracks.len(), "iTunes search complete");
        Ok(tracks)
    }
}

/// Maps one hit to a [`Track`]; hits missing id, title, or artist are
/// dropped rather than producing entries with empty identity.
fn map_hit(hit: ItunesHit) -> Option<Track> {
    let id = hit.track_id?.to_string();
    let title = hit.track_name?;
    let artist = hit.artist_name?;
    Some(Track {
        search_hint: Some(format!("{artist} - {title}")),
        thumbnail_url: hit
            .artwork_url100
            .map(|art| art.replace("100x100bb", "600x600bb")),
        duration_ms: hit.track_time_millis.unwrap_or(0),
        source: TrackSource::Itunes,
        direct_stream_hint: None,
        id,
        title,
        artist,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_map_hit_upgrades_artwork() {
        let hit = ItunesHit {
            track_id: Some(7),
            track_name: Some("Song".to_string()),
            artist_name: Some("Artist".to_string()),
            artwork_url100: Some("https://cdn/img/100x100bb.jpg".to_string()),
            track_time_millis: Some(181_000),
        };
        let track = map_hit(hit).unwrap();
        assert_eq!(track.id, "7");
        assert_eq!(track.thumbnail_url.unwrap(), "https://cdn/img/600x600bb.jpg");
        assert_eq!(track.duration_ms, 181_000);
        assert_eq!(track.source, TrackSource::Itunes);
        assert!(track.direct_stream_hint.is_none());
        assert_eq!(track.search_hint.unwrap(), "Artist - Song");
    }

    #[test]
    fn test_map_hit_drops_incomplete_entries() {
        let hit = ItunesHit {
            track_id: None,
            track_name: Some("Song".to_string()),
            artist_name: Some("Artist".to_string()),
            artwork_url100: None,
            track_time_millis: None,
        };
        assert!(map_hit(hit).is_none());
    }
}
