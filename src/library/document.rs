//! Durable document schema for the library store.
//!
//! One JSON object holds everything: playback history, playlists, and
//! settings. There is no migration versioning; a document that fails to
//! parse is replaced wholesale with [`LibraryDocument::default()`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::track::Track;

/// Name of the permanent "liked tracks" playlist.
pub const FAVORITES: &str = "Favorites";

/// Maximum number of history entries retained.
pub const HISTORY_CAPACITY: usize = 50;

/// A named, ordered sequence of tracks.
///
/// `name` is the primary key (unique, case-sensitive). A `locked` playlist
/// can never be deleted or renamed; only [`FAVORITES`] is locked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Playlist {
    pub name: String,
    #[serde(default)]
    pub songs: Vec<Track>,
    #[serde(default)]
    pub locked: bool,
}

impl Playlist {
    /// Creates an empty unlocked playlist.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            songs: Vec::new(),
            locked: false,
        }
    }

    fn favorites() -> Self {
        Self {
            name: FAVORITES.to_string(),
            songs: Vec::new(),
            locked: true,
        }
    }

    /// True if the playlist contains a track with the given id.
    #[must_use]
    pub fn contains_id(&self, track_id: &str) -> bool {
        self.songs.iter().any(|s| s.id == track_id)
    }
}

/// Open mapping of named options. The recognized keys (`discordRpc`,
/// `volume`) are always present at rest; unknown keys persist as-is.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Settings(Map<String, Value>);

impl Settings {
    /// The defaults injected into fresh or repaired documents.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut settings = Self::default();
        settings.ensure_recognized();
        settings
    }

    /// Injects any missing recognized keys. Idempotent.
    pub fn ensure_recognized(&mut self) {
        self.0
            .entry("discordRpc".to_string())
            .or_insert(Value::Bool(true));
        self.0.entry("volume".to_string()).or_insert(Value::from(1.0));
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Sets a key without validation; unknown keys are stored as-is.
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    /// Whether presence updates are enabled. Defaults to true when the key
    /// is missing or not a bool.
    #[must_use]
    pub fn discord_rpc(&self) -> bool {
        self.0
            .get("discordRpc")
            .and_then(Value::as_bool)
            .unwrap_or(true)
    }

    /// Playback volume in `0.0..=1.0`.
    #[must_use]
    pub fn volume(&self) -> f64 {
        self.0.get("volume").and_then(Value::as_f64).unwrap_or(1.0)
    }

    /// Read-only view of the full mapping.
    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

/// The root aggregate persisted as one JSON file.
///
/// Missing top-level fields deserialize to their defaults so documents
/// written by older builds keep loading; `ensure_invariants` on the store
/// then fills in what a fresh document would have.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryDocument {
    #[serde(default)]
    pub history: Vec<Track>,
    #[serde(default)]
    pub playlists: Vec<Playlist>,
    #[serde(default)]
    pub settings: Settings,
}

impl Default for LibraryDocument {
    fn default() -> Self {
        Self {
            history: Vec::new(),
            playlists: vec![Playlist::favorites()],
            settings: Settings::with_defaults(),
        }
    }
}

impl LibraryDocument {
    /// Re-establishes the document invariants: Favorites exists (prepended,
    /// locked) and the recognized settings keys are present. Idempotent.
    pub fn ensure_invariants(&mut self) {
        if !self.playlists.iter().any(|p| p.name == FAVORITES) {
            self.playlists.insert(0, Playlist::favorites());
        }
        self.settings.ensure_recognized();
    }

    /// Finds a playlist by name.
    #[must_use]
    pub fn playlist(&self, name: &str) -> Option<&Playlist> {
        self.playlists.iter().find(|p| p.name == name)
    }

    pub(crate) fn playlist_mut(&mut self, name: &str) -> Option<&mut Playlist> {
        self.playlists.iter_mut().find(|p| p.name == name)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_document_schema() {
        let doc = LibraryDocument::default();
        assert!(doc.history.is_empty());
        assert_eq!(doc.playlists.len(), 1);
        assert_eq!(doc.playlists[0].name, FAVORITES);
        assert!(doc.playlists[0].locked);
        assert!(doc.settings.discord_rpc());
        assert!((doc.settings.volume() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_ensure_invariants_prepends_favorites() {
        let mut doc = LibraryDocument {
            history: Vec::new(),
            playlists: vec![Playlist::new("Road Trip")],
            settings: Settings::default(),
        };
        doc.ensure_invariants();
        assert_eq!(doc.playlists[0].name, FAVORITES);
        assert_eq!(doc.playlists[1].name, "Road Trip");
    }

    #[test]
    fn test_ensure_invariants_idempotent() {
        let mut doc = LibraryDocument::default();
        doc.ensure_invariants();
        doc.ensure_invariants();
        let favorites: Vec<_> = doc
            .playlists
            .iter()
            .filter(|p| p.name == FAVORITES)
            .collect();
        assert_eq!(favorites.len(), 1);
    }

    #[test]
    fn test_document_tolerates_missing_fields() {
        let doc: LibraryDocument = serde_json::from_str("{}").unwrap();
        assert!(doc.history.is_empty());
        assert!(doc.playlists.is_empty());
        assert!(doc.settings.as_map().is_empty());
    }

    #[test]
    fn test_settings_unknown_keys_round_trip() {
        let mut settings = Settings::with_defaults();
        settings.set("theme", Value::from("midnight"));
        let json = serde_json::to_string(&settings).unwrap();
        let back: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(back.get("theme").unwrap(), "midnight");
        assert!(back.discord_rpc());
    }
}
