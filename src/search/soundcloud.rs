//! Secondary catalog: the SoundCloud v2 search API.
//!
//! Streaming-oriented search. Each kept hit carries a direct stream hint
//! (a transcoding URL that, combined with the rotating client id, yields a
//! playable URL). The anti-snippet filter drops truncated previews, clips
//! under 30 seconds, and hits with no usable media variant.

use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::track::{Track, TrackSource};

use super::SearchError;

const DEFAULT_BASE_URL: &str = "https://api-v2.soundcloud.com";
const RESULT_LIMIT: u32 = 10;

/// Hits shorter than this are considered snippets and dropped.
const MIN_DURATION_MS: u64 = 30_000;

#[derive(Debug, Deserialize)]
struct ScResponse {
    #[serde(default)]
    collection: Vec<ScHit>,
}

#[derive(Debug, Deserialize)]
struct ScHit {
    permalink_url: Option<String>,
    title: Option<String>,
    user: Option<ScUser>,
    artwork_url: Option<String>,
    #[serde(default)]
    duration: u64,
    policy: Option<String>,
    media: Option<ScMedia>,
}

#[derive(Debug, Deserialize)]
struct ScUser {
    username: String,
}

#[derive(Debug, Deserialize)]
struct ScMedia {
    #[serde(default)]
    transcodings: Vec<ScTranscoding>,
}

#[derive(Debug, Deserialize)]
struct ScTranscoding {
    url: String,
    format: ScFormat,
}

#[derive(Debug, Deserialize)]
struct ScFormat {
    protocol: String,
}

/// Client for the secondary catalog.
#[derive(Debug, Clone)]
pub struct SoundcloudCatalog {
    client: Client,
    base_url: String,
    client_id: String,
}

impl SoundcloudCatalog {
    /// Creates a catalog client against the production endpoint.
    #[must_use]
    pub fn new(client: Client, client_id: impl Into<String>) -> Self {
        Self::with_base_url(client, client_id, DEFAULT_BASE_URL)
    }

    /// Creates a catalog client with a custom base URL (for testing with
    /// wiremock).
    #[must_use]
    pub fn with_base_url(
        client: Client,
        client_id: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            client_id: client_id.into(),
        }
    }

    /// Searches the catalog, applies the anti-snippet filter, and maps the
    /// survivors to normalized tracks.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] on network failure, non-success status, or
    /// an unexpected response shape.
    #[tracing::instrument(skip(self), fields(provider = "soundcloud"))]
    pub async fn search(&self, query: &str) -> Result<Vec<Track>, SearchError> {
        let url = format!(
            "{}/search/tracks?q={}&client_id={}&limit={RESULT_LIMIT}",
            self.base_url,
            urlencoding::encode(query),
            self.client_id
        );

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::status("soundcloud", status.as_u16()));
        }

        let body: ScResponse = response.json().await?;
        let total = body.collection.len();
        let tracks: Vec<Track> = body.collection.into_iter().filter_map(map_hit).collect();
        debug!(
            kept = tracks.len(),
            dropped = total - tracks.len(),
            "SoundCloud search complete"
        );
        Ok(tracks)
    }
}

/// Maps one hit to a [`Track`], applying the filter policy:
/// truncated previews (`policy == "SNIP"`), sub-30-second clips, and hits
/// with neither a progressive nor an hls transcoding are dropped.
fn map_hit(hit: ScHit) -> Option<Track> {
    if hit.policy.as_deref() == Some("SNIP") || hit.duration < MIN_DURATION_MS {
        return None;
    }
    let media = hit.media?;
    let transcoding = media
        .transcodings
        .into_iter()
        .find(|t| matches!(t.format.protocol.as_str(), "progressive" | "hls"))?;

    Some(Track {
        id: hit.permalink_url?,
        title: hit.title?,
        artist: hit.user?.username,
        thumbnail_url: hit.artwork_url.map(|art| art.replace("large", "t500x500")),
        duration_ms: hit.duration,
        source: TrackSource::Soundcloud,
        direct_stream_hint: Some(transcoding.url),
        search_hint: None,
    })
}
