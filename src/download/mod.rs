//! Download pipeline: materialize a track as a local audio file.
//!
//! Mirrors the stream resolver's fallback query construction: a locator
//! that is not itself a direct URL, or that belongs to the API-only
//! domain, is discarded in favor of a synthesized search query. Success is
//! an explicit existence check on the target file, not the tool's exit
//! status alone.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::media_tool::{MediaTool, MediaToolError};

/// Domain marker for API-only locators that the tool cannot download from.
const API_ONLY_MARKER: &str = "api-v2";

/// Download failures. `Display` strings are user-visible.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The tool invocation itself failed.
    #[error(transparent)]
    Tool(#[from] MediaToolError),

    /// The tool exited cleanly but the target file does not exist.
    #[error("File missing")]
    FileMissing,
}

/// Materializes audio files into a fixed downloads location.
#[derive(Debug, Clone)]
pub struct DownloadPipeline {
    tool: MediaTool,
    downloads_dir: PathBuf,
}

impl DownloadPipeline {
    /// Creates a pipeline writing into `downloads_dir`.
    #[must_use]
    pub fn new(tool: MediaTool, downloads_dir: impl Into<PathBuf>) -> Self {
        Self {
            tool,
            downloads_dir: downloads_dir.into(),
        }
    }

    /// Downloads best-audio for `title`, preferring `media_locator` when it
    /// is directly usable. Returns the path of the materialized file.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::Tool`] when the tool fails and
    /// [`DownloadError::FileMissing`] when a non-erroring invocation left
    /// no file behind.
    #[tracing::instrument(skip(self))]
    pub async fn download(&self, title: &str, media_locator: &str) -> Result<PathBuf, DownloadError> {
        let stem = sanitize_title(title);
        let target = self.downloads_dir.join(format!("{stem}.mp3"));

        let input = if is_downloadable_locator(media_locator) {
            media_locator.to_string()
        } else {
            let clean_title: String = title
                .chars()
                .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '_')
                .collect();
            format!("ytsearch1:{clean_title} audio")
        };
        debug!(%input, target = %target.display(), "Starting download");

        let args = vec![
            input,
            "-o".to_string(),
            target.display().to_string(),
            "-f".to_string(),
            "bestaudio".to_string(),
            "--no-playlist".to_string(),
        ];
        self.tool.run(&args).await?;

        // Do not trust the exit status alone.
        if !target.exists() {
            return Err(DownloadError::FileMissing);
        }
        info!(path = %target.display(), "Download complete");
        Ok(target)
    }
}

/// A locator is downloadable when it is a direct URL outside the API-only
/// domain.
fn is_downloadable_locator(locator: &str) -> bool {
    locator.starts_with("http") && !locator.contains(API_ONLY_MARKER)
}

/// Collapses a title into a filesystem-safe stem: alphanumerics survive,
/// everything else becomes an underscore.
fn sanitize_title(title: &str) -> String {
    let replaced: String = title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    replaced.trim_matches('_').to_string()
}


#[cfg(all(test, unix))]
#[allow(clippy::unwrap_used)]
mod pipeline_tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::time::Duration;
    use tempfile::TempDir;

    /// Writes a fake tool script that copies its `-o` argument handling:
    /// `touch_target` controls whether the "download" leaves a file behind.
    fn fake_tool(dir: &Path, touch_target: bool) -> PathBuf {
        let script_path = dir.join("fake-yt-dlp");
        let body = if touch_target {
            "#!/bin/sh\nwhile [ $# -gt 0 ]; do\n  if [ \"$1\" = \"-o\" ]; then touch \"$2\"; fi\n  shift\ndone\n"
        } else {
            "#!/bin/sh\nexit 0\n"
        };
        fs::write(&script_path, body).unwrap();
        fs::set_permissions(&script_path, fs::Permissions::from_mode(0o755)).unwrap();
        script_path
    }

    #[tokio::test]
    async fn test_download_success_checks_existence() {
        let dir = TempDir::new().unwrap();
        let tool = MediaTool::new(fake_tool(dir.path(), true), Duration::from_secs(5));
        let pipeline = DownloadPipeline::new(tool, dir.path());

        let path = pipeline
            .download("My Song", "https://cdn.example/a.mp3")
            .await
            .unwrap();
        assert!(path.exists());
        assert!(path.file_name().unwrap().to_str().unwrap().starts_with("My_Song"));
    }

    #[tokio::test]
    async fn test_download_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        let tool = MediaTool::new(fake_tool(dir.path(), false), Duration::from_secs(5));
        let pipeline = DownloadPipeline::new(tool, dir.path());

        let err = pipeline
            .download("My Song", "https://cdn.example/a.mp3")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "File missing");
    }
}
