//! Process-scoped application context and public entry points.
//!
//! [`App`] owns every component and exposes the operation surface the
//! outer process (CLI, UI shell) calls: search, play, playlist mutation,
//! import, download, and settings. The library store sits behind a mutex
//! so each logical mutation is a single load-modify-persist scope even if
//! callers go concurrent.

use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::Value;
use tracing::debug;

use crate::auth;
use crate::config::{AppConfig, build_http_client};
use crate::download::{DownloadError, DownloadPipeline};
use crate::importer::{ImportError, PlaylistImporter};
use crate::library::{LibraryStore, Playlist};
use crate::media_tool::MediaTool;
use crate::presence::PresenceSink;
use crate::resolver::{ResolveError, StreamResolver, build_default_resolver};
use crate::search::{ItunesCatalog, SearchAggregator, SoundcloudCatalog, SpotifyLookup};
use crate::track::Track;

/// Number of history entries surfaced on the home view.
const HOME_HISTORY_LIMIT: usize = 12;

/// Result of a successful playback resolution.
#[derive(Debug, Clone)]
pub struct Playback {
    /// Playable stream URL for the audio element.
    pub stream_url: String,
    /// Resolved duration in milliseconds (0 when still unknown).
    pub duration_ms: u64,
}

/// Result of a successful playlist import.
#[derive(Debug, Clone)]
pub struct ImportSummary {
    pub name: String,
    /// Final song count of the merged playlist.
    pub count: usize,
}

/// The assembled application: components plus the store behind a mutex.
pub struct App {
    store: Mutex<LibraryStore>,
    aggregator: SearchAggregator,
    resolver: StreamResolver,
    importer: PlaylistImporter,
    downloads: DownloadPipeline,
    presence: Box<dyn PresenceSink>,
}

impl App {
    /// Boots the full application from configuration: opens the store,
    /// resolves the rotating client id once (static fallback on failure),
    /// and wires every component.
    ///
    /// # Errors
    ///
    /// Returns the underlying error when HTTP client construction fails;
    /// everything else degrades per component policy instead of failing
    /// startup.
    pub async fn bootstrap(
        config: &AppConfig,
        presence: Box<dyn PresenceSink>,
    ) -> Result<Self, reqwest::Error> {
        let client = build_http_client()?;

        if let Some(parent) = config.data_path.parent() {
            // Store persistence itself logs-and-continues on failure.
            let _ = fs::create_dir_all(parent);
        }
        let store = LibraryStore::open(&config.data_path);

        let client_id = auth::resolve_client_id(&client, &config.soundcloud_site_url).await;

        let aggregator = SearchAggregator::new(
            ItunesCatalog::with_base_url(client.clone(), &config.itunes_base_url),
            SoundcloudCatalog::with_base_url(
                client.clone(),
                &client_id,
                &config.soundcloud_api_base_url,
            ),
            SpotifyLookup::with_base_url(client.clone(), &config.spotify_base_url),
            config.provider_timeout,
        );

        let tool = MediaTool::new(&config.tool_binary, config.tool_timeout);
        let resolver = build_default_resolver(client.clone(), &client_id, tool.clone());
        let importer = PlaylistImporter::with_base_url(client, &config.spotify_base_url);
        let downloads = DownloadPipeline::new(tool, &config.downloads_dir);

        Ok(Self {
            store: Mutex::new(store),
            aggregator,
            resolver,
            importer,
            downloads,
            presence,
        })
    }

    /// Assembles an application from prebuilt components. Used by tests
    /// that point the providers at mock servers.
    #[must_use]
    pub fn from_components(
        store: LibraryStore,
        aggregator: SearchAggregator,
        resolver: StreamResolver,
        importer: PlaylistImporter,
        downloads: DownloadPipeline,
        presence: Box<dyn PresenceSink>,
    ) -> Self {
        Self {
            store: Mutex::new(store),
            aggregator,
            resolver,
            importer,
            downloads,
            presence,
        }
    }

    fn lock_store(&self) -> std::sync::MutexGuard<'_, LibraryStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ==================== Search & playback ====================

    /// Searches all catalog providers. Never fails; "no results" is an
    /// empty list.
    pub async fn search(&self, query: &str) -> Vec<Track> {
        self.aggregator.search(query).await
    }

    /// Resolves a track to a playable stream. On success the track is
    /// recorded in history and the presence collaborator is updated with
    /// an end timestamp derived from the resolved duration.
    ///
    /// # Errors
    ///
    /// Returns the single human-readable [`ResolveError`] when every
    /// strategy is exhausted.
    pub async fn play(&self, track: &Track) -> Result<Playback, ResolveError> {
        let stream = self.resolver.resolve(track).await?;

        let mut played = track.clone();
        if stream.duration_ms > 0 {
            played.duration_ms = stream.duration_ms;
        }
        let presence_enabled = {
            let mut store = self.lock_store();
            store.record_playback(&played);
            store.settings().discord_rpc()
        };

        if presence_enabled {
            self.presence
                .playing(&track.title, &track.artist, now_ms() + stream.duration_ms);
        } else {
            debug!("Presence disabled by settings");
        }

        Ok(Playback {
            stream_url: stream.stream_url,
            duration_ms: stream.duration_ms,
        })
    }

    /// Clears the presence collaborator's reported activity.
    pub fn reset_presence(&self) {
        self.presence.clear();
    }

    // ==================== Library ====================

    /// Full playback history, most recent first.
    #[must_use]
    pub fn history(&self) -> Vec<Track> {
        self.lock_store().history().to_vec()
    }

    /// The home-view slice of history.
    #[must_use]
    pub fn recent_history(&self) -> Vec<Track> {
        let store = self.lock_store();
        store.history().iter().take(HOME_HISTORY_LIMIT).cloned().collect()
    }

    #[must_use]
    pub fn playlists(&self) -> Vec<Playlist> {
        self.lock_store().playlists().to_vec()
    }

    pub fn create_playlist(&self, name: &str) {
        self.lock_store().create_playlist(name);
    }

    pub fn delete_playlist(&self, name: &str) -> bool {
        self.lock_store().delete_playlist(name)
    }

    pub fn add_to_playlist(&self, name: &str, track: &Track) -> bool {
        self.lock_store().add_to_playlist(name, track)
    }

    pub fn remove_from_playlist(&self, name: &str, track_id: &str) -> bool {
        self.lock_store().remove_from_playlist(name, track_id)
    }

    #[must_use]
    pub fn is_liked(&self, track_id: &str) -> bool {
        self.lock_store().is_liked(track_id)
    }

    // ==================== Import & download ====================

    /// Imports a third-party playlist and merges it into the library.
    ///
    /// # Errors
    ///
    /// Returns the stage-specific [`ImportError`]; the store is untouched
    /// on any failure.
    pub async fn import_playlist(&self, url: &str) -> Result<ImportSummary, ImportError> {
        let imported = self.importer.fetch(url).await?;
        let count = self
            .lock_store()
            .merge_imported_playlist(&imported.name, &imported.tracks);
        Ok(ImportSummary {
            name: imported.name,
            count,
        })
    }

    /// Downloads best-audio for a title/locator pair.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError`] from the pipeline.
    pub async fn download(&self, title: &str, media_locator: &str) -> Result<PathBuf, DownloadError> {
        self.downloads.download(title, media_locator).await
    }

    // ==================== Settings ====================

    #[must_use]
    pub fn settings(&self) -> serde_json::Map<String, Value> {
        self.lock_store().settings().as_map().clone()
    }

    pub fn set_setting(&self, key: &str, value: Value) {
        self.lock_store().set_setting(key, value);
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App").finish_non_exhaustive()
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}
