//! Whole-document library store.
//!
//! The store exclusively owns the in-memory [`LibraryDocument`] and
//! re-persists the entire document synchronously after every mutation.
//! Durable-storage failures are logged and never propagated: the in-memory
//! document stays the source of truth for the rest of the process lifetime.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};

use crate::track::Track;

use super::document::{FAVORITES, HISTORY_CAPACITY, LibraryDocument, Playlist};

/// Durable key-value document store for history, playlists, and settings.
///
/// Mutation entry points assume sequential invocation; callers that share a
/// store across tasks must wrap it in a mutual-exclusion scope (the
/// [`App`](crate::app::App) does exactly that).
#[derive(Debug)]
pub struct LibraryStore {
    path: PathBuf,
    doc: LibraryDocument,
}

impl LibraryStore {
    /// Opens the store at `path`: loads the document (or the default on a
    /// missing/corrupt file), re-establishes invariants, and persists.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let doc = Self::load(&path);
        let mut store = Self { path, doc };
        store.doc.ensure_invariants();
        store.persist();
        store
    }

    /// Reads and parses the durable document. A missing file or parse
    /// failure yields the default document and a log line, never an error:
    /// corruption is recovered by full reset, not partial repair.
    fn load(path: &Path) -> LibraryDocument {
        match fs::read_to_string(path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(doc) => doc,
                Err(error) => {
                    warn!(path = %path.display(), %error, "Library document corrupt, resetting to defaults");
                    LibraryDocument::default()
                }
            },
            Err(error) => {
                debug!(path = %path.display(), %error, "No library document found, starting fresh");
                LibraryDocument::default()
            }
        }
    }

    /// Serializes the whole document to durable storage. Failure is logged
    /// only; in-memory state remains authoritative.
    fn persist(&self) {
        let serialized = match serde_json::to_string_pretty(&self.doc) {
            Ok(s) => s,
            Err(error) => {
                warn!(%error, "Failed to serialize library document");
                return;
            }
        };
        if let Err(error) = fs::write(&self.path, serialized) {
            warn!(path = %self.path.display(), %error, "Failed to persist library document");
        }
    }

    // ==================== History ====================

    /// Most-recent-first playback history.
    #[must_use]
    pub fn history(&self) -> &[Track] {
        &self.doc.history
    }

    /// Records a playback: removes any existing entry with the same id,
    /// prepends the track, truncates to capacity. No-op for empty ids.
    pub fn record_playback(&mut self, track: &Track) {
        if track.id.is_empty() {
            return;
        }
        self.doc.history.retain(|t| t.id != track.id);
        self.doc.history.insert(0, track.clone());
        self.doc.history.truncate(HISTORY_CAPACITY);
        self.persist();
    }

    // ==================== Playlists ====================

    /// All playlists, Favorites first.
    #[must_use]
    pub fn playlists(&self) -> &[Playlist] {
        &self.doc.playlists
    }

    /// Appends an unlocked empty playlist. No-op when the name is
    /// [`FAVORITES`] or already taken.
    pub fn create_playlist(&mut self, name: &str) {
        if name == FAVORITES || self.doc.playlist(name).is_some() {
            return;
        }
        self.doc.playlists.push(Playlist::new(name));
        self.persist();
    }

    /// Removes the named playlist. Returns false for [`FAVORITES`] or a
    /// name with no match.
    pub fn delete_playlist(&mut self, name: &str) -> bool {
        if name == FAVORITES {
            return false;
        }
        let Some(index) = self.doc.playlists.iter().position(|p| p.name == name) else {
            return false;
        };
        self.doc.playlists.remove(index);
        self.persist();
        true
    }

    /// Appends a track to the named playlist. Returns false when the
    /// playlist does not exist or already contains the id.
    pub fn add_to_playlist(&mut self, name: &str, track: &Track) -> bool {
        let Some(playlist) = self.doc.playlist_mut(name) else {
            return false;
        };
        if playlist.contains_id(&track.id) {
            return false;
        }
        playlist.songs.push(track.clone());
        self.persist();
        true
    }

    /// Removes all entries matching `track_id` from the named playlist.
    ///
    /// Lenient contract: returns true whether or not anything matched, and
    /// whether or not the playlist exists.
    pub fn remove_from_playlist(&mut self, name: &str, track_id: &str) -> bool {
        if let Some(playlist) = self.doc.playlist_mut(name) {
            playlist.songs.retain(|s| s.id != track_id);
        }
        self.persist();
        true
    }

    /// True iff the Favorites playlist contains the id.
    #[must_use]
    pub fn is_liked(&self, track_id: &str) -> bool {
        self.doc
            .playlist(FAVORITES)
            .is_some_and(|p| p.contains_id(track_id))
    }

    /// Merges imported tracks into the named playlist, creating it
    /// (unlocked) when absent. Returns the final song count.
    ///
    /// De-duplication is the explicit dual-key policy from the import flow:
    /// an incoming track is skipped when any existing song matches by id
    /// **or** by exact title. This tolerates providers that reuse ids across
    /// imports but reissue titles, and vice versa.
    pub fn merge_imported_playlist(&mut self, name: &str, tracks: &[Track]) -> usize {
        if self.doc.playlist(name).is_none() {
            self.doc.playlists.push(Playlist::new(name));
        }
        let Some(playlist) = self.doc.playlist_mut(name) else {
            return 0;
        };
        for track in tracks {
            let duplicate = playlist
                .songs
                .iter()
                .any(|existing| is_import_duplicate(existing, track));
            if !duplicate {
                playlist.songs.push(track.clone());
            }
        }
        let count = playlist.songs.len();
        self.persist();
        count
    }

    // ==================== Settings ====================

    /// Value for a settings key, if present.
    #[must_use]
    pub fn setting(&self, key: &str) -> Option<Value> {
        self.doc.settings.get(key).cloned()
    }

    /// Full settings mapping.
    #[must_use]
    pub fn settings(&self) -> &super::document::Settings {
        &self.doc.settings
    }

    /// Sets a settings key without validation and persists immediately.
    pub fn set_setting(&mut self, key: &str, value: Value) {
        self.doc.settings.set(key, value);
        self.persist();
    }
}

/// Dual-key duplicate test used only by playlist import merges.
///
/// Kept as a named two-predicate function rather than a generic comparator:
/// the OR of id and title equality is a deliberate tolerance policy.
fn is_import_duplicate(existing: &Track, incoming: &Track) -> bool {
    existing.id == incoming.id || existing.title == incoming.title
}
