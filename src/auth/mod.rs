//! Rotating SoundCloud client-id supplier.
//!
//! The secondary catalog and the direct stream strategy both need an
//! anonymous client id that SoundCloud rotates across deploys. We scrape it
//! once at startup from the newest public script asset and fall back to a
//! static id when the scrape yields nothing. The id is read-mostly state
//! afterwards and is shared without synchronization.

use regex::Regex;
use reqwest::Client;
use tracing::{debug, info, warn};

/// Static fallback used when the dynamic scrape fails.
pub const FALLBACK_CLIENT_ID: &str = "BeGNuC2J617a23cT7f5aK4y5E89a1c6a";

/// Resolves the rotating client id, falling back to
/// [`FALLBACK_CLIENT_ID`] when the supplier comes up empty.
pub async fn resolve_client_id(client: &Client, site_url: &str) -> String {
    match scrape_client_id(client, site_url).await {
        Some(id) => {
            info!(client_id = %id, "Scraped rotating client id");
            id
        }
        None => {
            warn!("Client id scrape failed, using static fallback");
            FALLBACK_CLIENT_ID.to_string()
        }
    }
}

/// Opaque credential supplier: fetches the site's landing page, walks its
/// script assets newest-first, and extracts the embedded client id. Any
/// failure along the way yields `None`.
async fn scrape_client_id(client: &Client, site_url: &str) -> Option<String> {
    let html = client.get(site_url).send().await.ok()?.text().await.ok()?;

    let asset_re = Regex::new(r#"src="(https?://[^"]+/assets/[^"]+\.js)""#).ok()?;
    let id_re = Regex::new(r#"client_id:"([a-zA-Z0-9]{32})""#).ok()?;

    let assets: Vec<String> = asset_re
        .captures_iter(&html)
        .map(|c| c[1].to_string())
        .collect();
    debug!(asset_count = assets.len(), "Found script assets");

    for asset_url in assets.iter().rev() {
        let Ok(response) = client.get(asset_url).send().await else {
            continue;
        };
        let Ok(script) = response.text().await else {
            continue;
        };
        if let Some(captures) = id_re.captures(&script) {
            return Some(captures[1].to_string());
        }
    }
    None
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::build_http_client;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_resolve_client_id_falls_back_on_unreachable_site() {
        let client = build_http_client().unwrap();
        let id = resolve_client_id(&client, "http://127.0.0.1:9").await;
        assert_eq!(id, FALLBACK_CLIENT_ID);
    }

    #[tokio::test]
    async fn test_resolve_client_id_falls_back_without_assets() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .mount(&server)
            .await;

        let client = build_http_client().unwrap();
        let id = resolve_client_id(&client, &server.uri()).await;
        assert_eq!(id, FALLBACK_CLIENT_ID);
    }

    #[tokio::test]
    async fn test_scrape_walks_assets_newest_first() {
        let server = MockServer::start().await;
        let landing = format!(
            r#"<script src="{base}/assets/app-old.js"></script>
               <script src="{base}/assets/app-new.js"></script>"#,
            base = server.uri()
        );
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(landing))
            .mount(&server)
            .await;
        // Newest asset carries the id; oldest would carry a stale one.
        Mock::given(method("GET"))
            .and(path("/assets/app-new.js"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"var cfg={client_id:"AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA"};"#,
            ))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/assets/app-old.js"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"var cfg={client_id:"BBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBB"};"#,
            ))
            .mount(&server)
            .await;

        let client = build_http_client().unwrap();
        let id = resolve_client_id(&client, &server.uri()).await;
        assert_eq!(id, "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA");
    }
}
