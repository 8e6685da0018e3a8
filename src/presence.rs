//! Presence collaborator seam.
//!
//! The playback entry point reports "now playing" to an external presence
//! collaborator (a Discord-style rich presence). The broadcast protocol is
//! out of scope; this trait is the boundary, with a logging implementation
//! for local runs and a no-op for tests.

/// External presence collaborator.
pub trait PresenceSink: Send + Sync {
    /// Reports a track as now playing, with the wall-clock millisecond
    /// timestamp at which playback will end.
    fn playing(&self, title: &str, artist: &str, ends_at_ms: u64);

    /// Clears any reported activity.
    fn clear(&self);
}

/// Presence sink that does nothing.
#[derive(Debug, Default)]
pub struct NoopPresence;

impl PresenceSink for NoopPresence {
    fn playing(&self, _title: &str, _artist: &str, _ends_at_ms: u64) {}

    fn clear(&self) {}
}

/// Presence sink that logs activity instead of broadcasting it.
#[derive(Debug, Default)]
pub struct LogPresence;

impl PresenceSink for LogPresence {
    fn playing(&self, title: &str, artist: &str, ends_at_ms: u64) {
        tracing::info!(%title, %artist, ends_at_ms, "Now playing");
    }

    fn clear(&self) {
        tracing::debug!("Presence cleared");
    }
}
