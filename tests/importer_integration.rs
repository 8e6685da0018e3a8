//! Integration tests for playlist import.
//!
//! Fetches mock embed pages end to end and checks every stage-specific
//! failure message, plus the merge semantics into the library store.

use cadence::config::build_http_client;
use cadence::track::TrackSource;
use cadence::{ImportError, LibraryStore, PlaylistImporter};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn embed_page(entity: &serde_json::Value) -> String {
    let data = serde_json::json!({
        "props": {"pageProps": {"state": {"data": {"entity": entity}}}}
    });
    format!(
        r#"<html><body><script id="__NEXT_DATA__" type="application/json">{data}</script></body></html>"#
    )
}

fn road_trip_entity() -> serde_json::Value {
    serde_json::json!({
        "title": "Road Trip",
        "trackList": [
            {
                "uri": "spotify:track:aaa",
                "title": "Song A",
                "subtitle": "Artist A",
                "duration": 200_000,
                "coverArt": {"sources": [{"url": "https://cdn.example/a.jpg"}]}
            },
            {
                // No uri and no cover art: id is synthesized, thumbnail
                // falls back to the placeholder.
                "title": "Song B",
                "subtitle": "Artist B"
            }
        ]
    })
}

fn importer_against(server: &MockServer) -> PlaylistImporter {
    PlaylistImporter::with_base_url(build_http_client().unwrap(), server.uri())
}

#[tokio::test]
async fn test_import_parses_embed_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/embed/playlist/37i9dQZF1DXcBWIGoYBM5M"))
        .respond_with(ResponseTemplate::new(200).set_body_string(embed_page(&road_trip_entity())))
        .mount(&server)
        .await;

    let imported = importer_against(&server)
        .fetch("https://open.spotify.com/playlist/37i9dQZF1DXcBWIGoYBM5M?si=xyz")
        .await
        .unwrap();

    assert_eq!(imported.name, "Road Trip");
    assert_eq!(imported.tracks.len(), 2);

    let first = &imported.tracks[0];
    assert_eq!(first.id, "spotify:track:aaa");
    assert_eq!(first.source, TrackSource::SpotifyImport);
    assert_eq!(first.search_hint.as_deref().unwrap(), "Artist A - Song A");
    assert_eq!(first.duration_ms, 200_000);

    let second = &imported.tracks[1];
    assert!(second.id.starts_with("spot_"));
    assert_eq!(
        second.thumbnail_url.as_deref().unwrap(),
        "https://placehold.co/200"
    );
}

#[tokio::test]
async fn test_import_invalid_url_makes_no_request() {
    let server = MockServer::start().await;
    let err = importer_against(&server)
        .fetch("https://open.spotify.com/album/not-a-playlist!")
        .await
        .unwrap_err();

    assert!(matches!(err, ImportError::InvalidUrl));
    assert_eq!(err.to_string(), "Invalid URL");
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_import_missing_structured_data_is_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/embed/playlist/abc123"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("<html><body>no data here</body></html>"),
        )
        .mount(&server)
        .await;

    let err = importer_against(&server)
        .fetch("https://open.spotify.com/playlist/abc123")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Parse Error");
}

#[tokio::test]
async fn test_import_entity_without_track_list_is_no_tracks() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/embed/playlist/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_string(embed_page(&serde_json::json!({
            "title": "Empty Shell"
        }))))
        .mount(&server)
        .await;

    let err = importer_against(&server)
        .fetch("https://open.spotify.com/playlist/abc123")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "No tracks found");
}

#[tokio::test]
async fn test_import_untitled_playlist_gets_default_name() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/embed/playlist/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_string(embed_page(&serde_json::json!({
            "trackList": [{"title": "Only Song", "subtitle": "Artist"}]
        }))))
        .mount(&server)
        .await;

    let imported = importer_against(&server)
        .fetch("https://open.spotify.com/playlist/abc123")
        .await
        .unwrap();
    assert_eq!(imported.name, "Imported");
}

#[tokio::test]
async fn test_import_then_merge_is_idempotent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/embed/playlist/37i9dQZF1DXcBWIGoYBM5M"))
        .respond_with(ResponseTemplate::new(200).set_body_string(embed_page(&road_trip_entity())))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut store = LibraryStore::open(dir.path().join("library.json"));
    let importer = importer_against(&server);

    let first = importer
        .fetch("https://open.spotify.com/playlist/37i9dQZF1DXcBWIGoYBM5M")
        .await
        .unwrap();
    assert_eq!(store.merge_imported_playlist(&first.name, &first.tracks), 2);

    // Re-import: the synthesized ids differ but the titles match, so the
    // dual-key de-duplication keeps the playlist unchanged.
    let second = importer
        .fetch("https://open.spotify.com/playlist/37i9dQZF1DXcBWIGoYBM5M")
        .await
        .unwrap();
    assert_eq!(store.merge_imported_playlist(&second.name, &second.tracks), 2);
}
