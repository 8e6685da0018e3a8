//! Search-fallback strategy: the external media tool.
//!
//! The last strategy in the chain and the only one that applies to every
//! track. It synthesizes a search query from the track metadata, asks the
//! tool for the best audio format's direct URL plus the media duration,
//! and parses both from whitespace-delimited stdout lines. Failures here
//! are hard: there is nothing left to fall back to.

use async_trait::async_trait;
use tracing::debug;

use crate::media_tool::MediaTool;
use crate::track::Track;

use super::{ResolveError, ResolvedStream, Strategy, StreamStep};

/// Format selector handed to the tool: prefer m4a for compatibility.
const FORMAT_SELECTOR: &str = "bestaudio[ext=m4a]/bestaudio";

/// Longest stdout line still considered a bare duration number.
const MAX_DURATION_LINE_LEN: usize = 15;

/// Resolves any track by searching with the external media tool.
#[derive(Debug, Clone)]
pub struct SearchFallbackStrategy {
    tool: MediaTool,
}

impl SearchFallbackStrategy {
    /// Creates the strategy around a tool handle.
    #[must_use]
    pub fn new(tool: MediaTool) -> Self {
        Self { tool }
    }
}

#[async_trait]
impl Strategy for SearchFallbackStrategy {
    fn name(&self) -> &'static str {
        "search-fallback"
    }

    fn can_handle(&self, _track: &Track) -> bool {
        true
    }

    #[tracing::instrument(skip(self, track), fields(strategy = "search-fallback"))]
    async fn resolve(&self, track: &Track) -> Result<StreamStep, ResolveError> {
        let query = sanitize_query(&track.fallback_query());
        let search_arg = format!("ytsearch1:{query} audio");
        debug!(%search_arg, "Invoking media search");

        let args = vec![
            search_arg,
            "-f".to_string(),
            FORMAT_SELECTOR.to_string(),
            "--get-url".to_string(),
            "--print".to_string(),
            "duration".to_string(),
            "--no-warnings".to_string(),
            "--force-ipv4".to_string(),
        ];

        let stdout = self
            .tool
            .run(&args)
            .await
            .map_err(|error| ResolveError::tool(error.to_string()))?;

        let Some(output) = parse_tool_output(&stdout, track.duration_ms) else {
            return Err(ResolveError::no_url_extracted(&query));
        };
        Ok(StreamStep::Resolved(output))
    }
}

/// Strips everything outside word, space, and hyphen classes. Defensive
/// sanitization before the query reaches the external tool's command line.
fn sanitize_query(query: &str) -> String {
    query
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || matches!(c, '-' | '_'))
        .collect()
}

/// Parses whitespace-delimited tool output: the first `http`-prefixed line
/// is the stream URL; a short bare-number line is the duration in seconds
/// and overwrites any previously known duration.
fn parse_tool_output(stdout: &str, known_duration_ms: u64) -> Option<ResolvedStream> {
    let lines: Vec<&str> = stdout.lines().map(str::trim).collect();

    let stream_url = lines.iter().find(|l| l.starts_with("http"))?.to_string();

    let duration_ms = lines
        .iter()
        .find_map(|l| {
            if l.len() >= MAX_DURATION_LINE_LEN {
                return None;
            }
            l.parse::<f64>().ok()
        })
        .map_or(known_duration_ms, |seconds| (seconds * 1000.0) as u64);

    Some(ResolvedStream {
        stream_url,
        duration_ms,
    })
}
