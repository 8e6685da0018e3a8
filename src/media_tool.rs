//! Wrapper around the external command-line media-resolution tool.
//!
//! Both the stream resolver's search fallback and the download pipeline
//! shell out to `yt-dlp`. This module centralizes process invocation:
//! stdout capture, non-zero exit mapping, and the explicit per-invocation
//! timeout bound (the tool itself has no network-level timeout).

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, warn};

/// Errors from one media-tool invocation.
#[derive(Debug, Error)]
pub enum MediaToolError {
    /// The tool binary could not be spawned at all.
    #[error("media tool '{binary}' could not be started: {source}\n  Suggestion: Install yt-dlp or set the tool path in the configuration")]
    Spawn {
        /// Configured binary path.
        binary: String,
        /// Underlying spawn error.
        #[source]
        source: std::io::Error,
    },

    /// The tool ran but exited non-zero.
    #[error("media tool failed: {stderr}")]
    Failed {
        /// Trimmed stderr from the tool, preserved for diagnostics.
        stderr: String,
    },

    /// The invocation exceeded the configured bound.
    #[error("media tool timed out after {}s\n  Suggestion: Retry, or raise the tool timeout for slow networks", timeout.as_secs())]
    Timeout {
        /// The bound that was exceeded.
        timeout: Duration,
    },
}

/// Handle to the external media tool binary.
#[derive(Debug, Clone)]
pub struct MediaTool {
    binary: PathBuf,
    timeout: Duration,
}

impl MediaTool {
    /// Creates a tool handle for `binary`, bounding every invocation at
    /// `timeout`.
    #[must_use]
    pub fn new(binary: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }

    /// Runs the tool with `args` and returns its stdout.
    ///
    /// # Errors
    ///
    /// Returns [`MediaToolError`] when the process cannot spawn, exits
    /// non-zero, or exceeds the timeout bound. There is no cancellation
    /// beyond the bound: a timed-out child is killed, not resumed.
    #[tracing::instrument(skip(self), fields(binary = %self.binary.display()))]
    pub async fn run(&self, args: &[String]) -> Result<String, MediaToolError> {
        debug!(?args, "Invoking media tool");

        let mut child = Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| MediaToolError::Spawn {
                binary: self.binary.display().to_string(),
                source,
            })?;

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(source)) => {
                return Err(MediaToolError::Spawn {
                    binary: self.binary.display().to_string(),
                    source,
                });
            }
            Err(_) => {
                warn!(timeout_secs = self.timeout.as_secs(), "Media tool timed out");
                return Err(MediaToolError::Timeout {
                    timeout: self.timeout,
                });
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!(status = ?output.status.code(), %stderr, "Media tool exited non-zero");
            return Err(MediaToolError::Failed { stderr });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_missing_binary_is_spawn_error() {
        let tool = MediaTool::new("/nonexistent/definitely-not-a-tool", Duration::from_secs(5));
        let err = tool.run(&["--version".to_string()]).await.unwrap_err();
        assert!(matches!(err, MediaToolError::Spawn { .. }));
        assert!(err.to_string().contains("could not be started"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_captures_stdout() {
        let tool = MediaTool::new("/bin/echo", Duration::from_secs(5));
        let out = tool.run(&["hello".to_string()]).await.unwrap();
        assert_eq!(out.trim(), "hello");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_nonzero_exit_preserves_stderr() {
        let tool = MediaTool::new("/bin/sh", Duration::from_secs(5));
        let err = tool
            .run(&[
                "-c".to_string(),
                "echo boom >&2; exit 3".to_string(),
            ])
            .await
            .unwrap_err();
        match err {
            MediaToolError::Failed { stderr } => assert_eq!(stderr, "boom"),
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_times_out() {
        let tool = MediaTool::new("/bin/sleep", Duration::from_millis(50));
        let err = tool.run(&["5".to_string()]).await.unwrap_err();
        assert!(matches!(err, MediaToolError::Timeout { .. }));
    }
}
