//! `yt-dlp` download collaborator.
//!
//! Shells out to the `yt-dlp` CLI and downloads only the leading section of
//! a video (`--download-sections "*0-N"`) at the configured format, which
//! defaults to the lowest available quality to bound transfer cost.

use std::path::Path;
use std::process::Stdio;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use tokio::process::Command;

use clipscout_config::DownloadConfig;

use crate::connector::VideoDownloader;

const WATCH_URL_BASE: &str = "https://www.youtube.com/watch?v=";

/// Downloader backed by the `yt-dlp` binary.
#[derive(Debug, Clone)]
pub struct YtDlpDownloader {
    binary: String,
    format: String,
}

impl YtDlpDownloader {
    /// Creates a downloader with an explicit binary path and format selector.
    pub fn new(binary: impl Into<String>, format: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            format: format.into(),
        }
    }

    /// Creates a downloader from the `[download]` config section.
    pub fn from_config(config: &DownloadConfig) -> Self {
        Self::new(&config.yt_dlp_path, &config.format)
    }

    /// Command-line arguments for one download.
    pub fn download_args(&self, video_id: &str, max_duration_secs: u64, dest: &Path) -> Vec<String> {
        vec![
            "--format".to_string(),
            self.format.clone(),
            "--output".to_string(),
            dest.to_string_lossy().into_owned(),
            "--force-overwrites".to_string(),
            "--no-part".to_string(),
            "--no-playlist".to_string(),
            "--quiet".to_string(),
            "--no-warnings".to_string(),
            "--download-sections".to_string(),
            format!("*0-{}", max_duration_secs),
            format!("{}{}", WATCH_URL_BASE, video_id),
        ]
    }
}

#[async_trait]
impl VideoDownloader for YtDlpDownloader {
    async fn download(&self, video_id: &str, max_duration_secs: u64, dest: &Path) -> Result<()> {
        let output = Command::new(&self.binary)
            .args(self.download_args(video_id, max_duration_secs, dest))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                anyhow!(
                    "Failed to run yt-dlp (is it installed? path='{}'): {}",
                    self.binary,
                    e
                )
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "yt-dlp failed for '{}' (exit code {}): {}",
                video_id,
                output.status.code().unwrap_or(-1),
                stderr.trim()
            );
        }

        let size = tokio::fs::metadata(dest)
            .await
            .with_context(|| format!("yt-dlp produced no file for '{}'", video_id))?
            .len();
        if size == 0 {
            bail!("yt-dlp produced an empty file for '{}'", video_id);
        }

        Ok(())
    }
}
