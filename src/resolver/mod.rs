//! Stream resolution: turning one normalized track into a playable URL.
//!
//! Resolution is an ordered list of named strategies evaluated by a small
//! dispatcher. Each attempt returns a tagged result: success with a
//! stream, a soft failure that continues down the list, or a hard failure
//! that stops resolution. This makes the fallback policy a first-class,
//! testable artifact instead of nested exception handling.
//!
//! # Architecture
//!
//! - [`Strategy`] - Async trait that individual strategies implement
//! - [`StreamResolver`] - Ordered collection of strategies with the
//!   resolution loop
//! - [`StreamStep`] - Tagged result from one strategy attempt
//! - [`DirectStreamStrategy`] - Secondary-catalog hint plus rotating
//!   client id
//! - [`SearchFallbackStrategy`] - External media-tool search

mod direct;
mod error;
mod search_fallback;

pub use direct::DirectStreamStrategy;
pub use error::ResolveError;
pub use search_fallback::SearchFallbackStrategy;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};

use crate::media_tool::MediaTool;
use crate::track::Track;

/// A successfully resolved stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedStream {
    /// Playable audio URL.
    pub stream_url: String,
    /// Authoritative duration in milliseconds (0 when still unknown).
    pub duration_ms: u64,
}

/// Tagged result of a single strategy's attempt.
#[derive(Debug, Clone)]
pub enum StreamStep {
    /// Playable stream found; resolution stops here.
    Resolved(ResolvedStream),
    /// This strategy could not produce a stream; try the next one. The
    /// reason is diagnostic detail, never a user-visible error.
    Skip(String),
}

/// Trait that all resolution strategies implement.
///
/// Uses `async_trait` to support dynamic dispatch via `Box<dyn Strategy>`;
/// Rust 2024 native async traits are not object-safe.
#[async_trait]
pub trait Strategy: Send + Sync {
    /// The strategy's name (e.g. "direct", "search-fallback").
    fn name(&self) -> &str;

    /// True if this strategy applies to the given track.
    fn can_handle(&self, track: &Track) -> bool;

    /// Attempts to resolve the track.
    ///
    /// # Errors
    ///
    /// An `Err` is a hard failure that stops the whole resolution; soft
    /// failures are expressed as [`StreamStep::Skip`].
    async fn resolve(&self, track: &Track) -> Result<StreamStep, ResolveError>;
}

/// Ordered strategy list with the resolution loop.
pub struct StreamResolver {
    strategies: Vec<Box<dyn Strategy>>,
}

impl StreamResolver {
    /// Creates an empty resolver.
    #[must_use]
    pub fn new() -> Self {
        Self {
            strategies: Vec::new(),
        }
    }

    /// Appends a strategy; strategies run in registration order.
    pub fn register(&mut self, strategy: Box<dyn Strategy>) {
        debug!(name = strategy.name(), "Registering resolution strategy");
        self.strategies.push(strategy);
    }

    /// Resolves `track` by trying each applicable strategy in order.
    ///
    /// # Errors
    ///
    /// Returns the hard [`ResolveError`] from a stopping strategy, or
    /// `Exhausted` when every applicable strategy soft-failed. Either way
    /// the caller sees a single human-readable reason, not a stack of
    /// per-strategy errors.
    #[tracing::instrument(skip(self, track), fields(track_id = %track.id))]
    pub async fn resolve(&self, track: &Track) -> Result<ResolvedStream, ResolveError> {
        let mut tried_count: usize = 0;

        for strategy in &self.strategies {
            if !strategy.can_handle(track) {
                continue;
            }
            tried_count += 1;
            debug!(strategy = strategy.name(), "Trying strategy");

            match strategy.resolve(track).await? {
                StreamStep::Resolved(stream) => {
                    info!(
                        strategy = strategy.name(),
                        url = %stream.stream_url,
                        duration_ms = stream.duration_ms,
                        "Resolution successful"
                    );
                    return Ok(stream);
                }
                StreamStep::Skip(reason) => {
                    // Expected and silent toward the user; diagnostic only.
                    debug!(strategy = strategy.name(), %reason, "Strategy skipped, trying next");
                }
            }
        }

        Err(ResolveError::exhausted(&track.fallback_query(), tried_count))
    }
}

impl Default for StreamResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for StreamResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.strategies.iter().map(|s| s.name()).collect();
        f.debug_struct("StreamResolver")
            .field("strategies", &names)
            .finish()
    }
}

/// Builds the default strategy order: direct provider stream first, then
/// the external search fallback.
#[must_use]
pub fn build_default_resolver(
    client: Client,
    client_id: impl Into<String>,
    tool: MediaTool,
) -> StreamResolver {
    let mut resolver = StreamResolver::new();
    resolver.register(Box::new(DirectStreamStrategy::new(client, client_id)));
    resolver.register(Box::new(SearchFallbackStrategy::new(tool)));
    resolver
}
