//! Search aggregation across heterogeneous catalog providers.
//!
//! One free-text query fans out to the primary (iTunes) and secondary
//! (SoundCloud) catalogs concurrently, each bounded by a per-provider
//! timeout so a hung provider cannot block the other's contribution. A
//! recognized single-track URL bypasses catalog search entirely. The
//! aggregator never fails: a provider that errors or times out contributes
//! zero results, and total failure is an empty list.

mod itunes;
mod soundcloud;
mod spotify;

pub use itunes::ItunesCatalog;
pub use soundcloud::SoundcloudCatalog;
pub use spotify::{SpotifyLookup, is_track_url};

use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use crate::track::Track;

/// Errors from a single catalog provider. Never escapes the aggregator;
/// callers of [`SearchAggregator::search`] only ever see a (possibly
/// empty) result list.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Network or protocol failure reaching the provider.
    #[error("provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider answered with a non-success status.
    #[error("provider '{provider}' returned HTTP {status}")]
    Status {
        /// Which provider answered.
        provider: &'static str,
        /// The status code.
        status: u16,
    },
}

impl SearchError {
    pub(crate) fn status(provider: &'static str, status: u16) -> Self {
        Self::Status { provider, status }
    }
}

/// Fans one query out to every catalog provider and merges the results.
#[derive(Debug, Clone)]
pub struct SearchAggregator {
    itunes: ItunesCatalog,
    soundcloud: SoundcloudCatalog,
    spotify: SpotifyLookup,
    provider_timeout: Duration,
}

impl SearchAggregator {
    /// Creates an aggregator over the given provider clients.
    #[must_use]
    pub fn new(
        itunes: ItunesCatalog,
        soundcloud: SoundcloudCatalog,
        spotify: SpotifyLookup,
        provider_timeout: Duration,
    ) -> Self {
        Self {
            itunes,
            soundcloud,
            spotify,
            provider_timeout,
        }
    }

    /// Searches every provider for `query`.
    ///
    /// Single-track URLs bypass catalog search and yield at most one
    /// result. Otherwise both catalogs are queried concurrently and the
    /// results concatenated primary-first; no cross-provider
    /// de-duplication is performed.
    #[tracing::instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Vec<Track> {
        if is_track_url(query) {
            debug!("Query is a single-track URL, bypassing catalog search");
            return self.spotify.lookup(query).await.into_iter().collect();
        }

        let (primary, secondary) = tokio::join!(
            tokio::time::timeout(self.provider_timeout, self.itunes.search(query)),
            tokio::time::timeout(self.provider_timeout, self.soundcloud.search(query)),
        );

        let mut results = settle("itunes", primary);
        results.extend(settle("soundcloud", secondary));
        debug!(count = results.len(), "Search aggregation complete");
        results
    }
}

/// Collapses one provider's outcome to its contribution: results on
/// success, nothing on error or timeout.
fn settle(
    provider: &'static str,
    outcome: Result<Result<Vec<Track>, SearchError>, tokio::time::error::Elapsed>,
) -> Vec<Track> {
    match outcome {
        Ok(Ok(tracks)) => tracks,
        Ok(Err(error)) => {
            warn!(provider, %error, "Catalog provider failed, contributing nothing");
            Vec::new()
        }
        Err(_) => {
            warn!(provider, "Catalog provider timed out, contributing nothing");
            Vec::new()
        }
    }
}
