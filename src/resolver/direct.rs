//! Direct provider-stream strategy.
//!
//! Applies only to secondary-catalog tracks carrying a direct stream hint.
//! The hint plus the rotating client id yields a short-lived JSON body
//! whose `url` field is the playable stream. Every failure here is a soft
//! skip: direct-provider failure is expected and the search fallback is
//! always behind it.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::track::{Track, TrackSource};

use super::{ResolveError, ResolvedStream, Strategy, StreamStep};

#[derive(Debug, Deserialize)]
struct HintResponse {
    url: Option<String>,
}

/// Resolves secondary-catalog tracks through their direct stream hint.
#[derive(Debug, Clone)]
pub struct DirectStreamStrategy {
    client: Client,
    client_id: String,
}

impl DirectStreamStrategy {
    /// Creates the strategy with the process-wide rotating client id.
    #[must_use]
    pub fn new(client: Client, client_id: impl Into<String>) -> Self {
        Self {
            client,
            client_id: client_id.into(),
        }
    }
}

#[async_trait]
impl Strategy for DirectStreamStrategy {
    fn name(&self) -> &'static str {
        "direct"
    }

    fn can_handle(&self, track: &Track) -> bool {
        track.source == TrackSource::Soundcloud && track.direct_stream_hint.is_some()
    }

    #[tracing::instrument(skip(self, track), fields(strategy = "direct"))]
    async fn resolve(&self, track: &Track) -> Result<StreamStep, ResolveError> {
        let Some(hint) = track.direct_stream_hint.as_deref() else {
            return Ok(StreamStep::Skip("no direct stream hint".to_string()));
        };

        let separator = if hint.contains('?') { '&' } else { '?' };
        let url = format!("{hint}{separator}client_id={}", self.client_id);
        debug!(%url, "Fetching direct stream");

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(error) => {
                return Ok(StreamStep::Skip(format!("direct fetch failed: {error}")));
            }
        };

        let status = response.status();
        if !status.is_success() {
            return Ok(StreamStep::Skip(format!(
                "direct fetch returned HTTP {}",
                status.as_u16()
            )));
        }

        match response.json::<HintResponse>().await {
            Ok(HintResponse { url: Some(stream_url) }) => {
                Ok(StreamStep::Resolved(ResolvedStream {
                    stream_url,
                    duration_ms: track.duration_ms,
                }))
            }
            Ok(HintResponse { url: None }) => {
                Ok(StreamStep::Skip("direct response had no url field".to_string()))
            }
            Err(error) => Ok(StreamStep::Skip(format!(
                "direct response unparsable: {error}"
            ))),
        }
    }
}
