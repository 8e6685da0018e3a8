//! Process-scoped configuration.
//!
//! All provider endpoints, filesystem locations, and timeout bounds live in
//! one [`AppConfig`] passed to component constructors, never in ambient
//! globals. Base URLs are overridable so integration tests can point
//! components at local mock servers.

use std::path::PathBuf;
use std::time::Duration;

use reqwest::Client;

/// Connect timeout applied to every provider HTTP client.
const CONNECT_TIMEOUT_SECS: u64 = 10;
/// Read timeout applied to every provider HTTP client.
const READ_TIMEOUT_SECS: u64 = 30;

/// Bound on each catalog provider's contribution to one search call.
pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(10);

/// Bound on a single external media-tool invocation. The tool itself has no
/// network-level timeout, so this is the only bound between a hung
/// extraction and an indefinitely blocked resolution.
pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(60);

/// Static configuration resolved once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Location of the durable library document.
    pub data_path: PathBuf,
    /// Directory the download pipeline materializes files into.
    pub downloads_dir: PathBuf,
    /// Path to the external media-resolution tool binary.
    pub tool_binary: PathBuf,
    /// Bound on one media-tool invocation.
    pub tool_timeout: Duration,
    /// Bound on each catalog provider during search fan-out.
    pub provider_timeout: Duration,
    /// Primary catalog (iTunes search API) base URL.
    pub itunes_base_url: String,
    /// Secondary catalog (SoundCloud API v2) base URL.
    pub soundcloud_api_base_url: String,
    /// SoundCloud site base URL, scraped for the rotating client id.
    pub soundcloud_site_url: String,
    /// Spotify site base URL (single-track pages and playlist embeds).
    pub spotify_base_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("cadence");
        Self {
            data_path: data_dir.join("library.json"),
            downloads_dir: dirs::download_dir().unwrap_or_else(|| PathBuf::from(".")),
            tool_binary: PathBuf::from("yt-dlp"),
            tool_timeout: DEFAULT_TOOL_TIMEOUT,
            provider_timeout: DEFAULT_PROVIDER_TIMEOUT,
            itunes_base_url: "https://itunes.apple.com".to_string(),
            soundcloud_api_base_url: "https://api-v2.soundcloud.com".to_string(),
            soundcloud_site_url: "https://soundcloud.com".to_string(),
            spotify_base_url: "https://open.spotify.com".to_string(),
        }
    }
}

/// Builds an HTTP client with the shared networking policy: one user agent,
/// gzip, and the project connect/read timeouts.
///
/// # Errors
///
/// Returns the underlying `reqwest` error when client construction fails.
pub fn build_http_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .timeout(Duration::from_secs(READ_TIMEOUT_SECS))
        .user_agent(concat!("cadence/", env!("CARGO_PKG_VERSION")))
        .gzip(true)
        .build()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_endpoints() {
        let config = AppConfig::default();
        assert!(config.itunes_base_url.starts_with("https://"));
        assert!(config.soundcloud_api_base_url.contains("api-v2"));
        assert_eq!(config.tool_binary, PathBuf::from("yt-dlp"));
        assert_eq!(config.tool_timeout, DEFAULT_TOOL_TIMEOUT);
    }

    #[test]
    fn test_build_http_client_succeeds() {
        assert!(build_http_client().is_ok());
    }
}
