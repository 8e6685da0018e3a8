//! Persistent library: history, playlists, and settings.
//!
//! The [`LibraryStore`] owns one [`LibraryDocument`] loaded at startup and
//! re-persisted wholesale after every mutation (last-writer-wins at document
//! granularity). All other components only observe copies or call its
//! mutation API.

mod document;
mod store;

pub use document::{FAVORITES, HISTORY_CAPACITY, LibraryDocument, Playlist, Settings};
pub use store::LibraryStore;
