//! Single-track Spotify URL bypass.
//!
//! When the search query is itself a Spotify track URL, catalog search is
//! skipped entirely: the track page's `og:` meta tags supply title, artist,
//! and artwork. Any failure yields "no results", never an error.

use regex::Regex;
use reqwest::Client;
use tracing::debug;

use crate::track::{Track, TrackSource};

const DEFAULT_BASE_URL: &str = "https://open.spotify.com";

/// True when the query matches the single-track URL pattern.
#[must_use]
pub fn is_track_url(query: &str) -> bool {
    query.contains("spotify.com/track")
}

/// Fetches single-track metadata from track pages.
#[derive(Debug, Clone)]
pub struct SpotifyLookup {
    client: Client,
    base_url: String,
}

impl SpotifyLookup {
    /// Creates a lookup against the production site.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self::with_base_url(client, DEFAULT_BASE_URL)
    }

    /// Creates a lookup with a custom base URL (for testing with wiremock).
    #[must_use]
    pub fn with_base_url(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Resolves a track URL to one normalized track via the page's meta
    /// tags. Returns `None` on any fetch or extraction failure; the caller
    /// surfaces that as an empty result list.
    #[tracing::instrument(skip(self))]
    pub async fn lookup(&self, track_url: &str) -> Option<Track> {
        let path = url::Url::parse(track_url)
            .ok()
            .map(|u| u.path().to_string())?;
        let page_url = format!("{}{path}", self.base_url);

        let html = self
            .client
            .get(&page_url)
            .send()
            .await
            .ok()?
            .text()
            .await
            .ok()?;

        let title = meta_content(&html, "og:title")?;
        let description = meta_content(&html, "og:description")?;
        // Description reads "Artist · Song · Year"; the artist leads.
        let artist = description
            .split('·')
            .next()
            .map(str::trim)
            .filter(|s| !s.is_empty())?
            .to_string();
        let thumbnail_url = meta_content(&html, "og:image");

        debug!(%title, %artist, "Resolved single-track metadata");
        Some(Track {
            id: track_url.to_string(),
            search_hint: Some(format!("{artist} - {title}")),
            title,
            artist,
            thumbnail_url,
            duration_ms: 0,
            source: TrackSource::Spotify,
            direct_stream_hint: None,
        })
    }
}

/// Extracts one `og:` meta tag's content, decoding the entities the pages
/// actually emit.
fn meta_content(html: &str, property: &str) -> Option<String> {
    let pattern = format!(r#"<meta property="{}" content="(.*?)""#, regex::escape(property));
    let re = Regex::new(&pattern).ok()?;
    let raw = re.captures(html)?.get(1)?.as_str();
    Some(raw.replace("&#039;", "'").replace("&quot;", "\""))
}
