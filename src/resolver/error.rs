//! Error types for stream resolution.

use thiserror::Error;

/// Errors that end a resolution attempt.
///
/// Reaching any of these means every strategy was tried (or a strategy hit
/// a hard stop); soft per-strategy failures never surface here.
#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    /// The search fallback ran but printed no usable URL.
    #[error("no URL extracted for '{query}'\n  Suggestion: Refine the artist/title metadata and retry")]
    NoUrlExtracted {
        /// The sanitized query that was searched.
        query: String,
    },

    /// The external media tool failed; its message is preserved for
    /// diagnostics.
    #[error("could not resolve audio: {message}")]
    Tool {
        /// Error text from the tool invocation.
        message: String,
    },

    /// Every applicable strategy declined the track.
    #[error("all resolution strategies failed for '{track}': tried {tried_count} strategy(ies)\n  Suggestion: Check the track metadata or try a different source")]
    Exhausted {
        /// Track identity for diagnostics.
        track: String,
        /// Number of strategies that were tried.
        tried_count: usize,
    },
}

impl ResolveError {
    /// Creates a `NoUrlExtracted` error.
    #[must_use]
    pub fn no_url_extracted(query: &str) -> Self {
        Self::NoUrlExtracted {
            query: query.to_string(),
        }
    }

    /// Creates a `Tool` error preserving the tool's message.
    #[must_use]
    pub fn tool(message: impl Into<String>) -> Self {
        Self::Tool {
            message: message.into(),
        }
    }

    /// Creates an `Exhausted` error.
    #[must_use]
    pub fn exhausted(track: &str, tried_count: usize) -> Self {
        Self::Exhausted {
            track: track.to_string(),
            tried_count,
        }
    }
}
