//! FFmpeg trim and probe collaborator.
//!
//! Trimming uses input seeking with stream copy (`-ss … -to … -i src -c copy`),
//! so clips are cut without decoding or re-encoding. Durations come from
//! `ffprobe`'s container-level `format=duration` entry.

use std::path::Path;
use std::process::Stdio;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use tokio::process::Command;

use clipscout_config::MediaConfig;

use crate::connector::MediaTranscoder;

/// Transcoder backed by the `ffmpeg` and `ffprobe` binaries.
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    ffmpeg: String,
    ffprobe: String,
}

impl FfmpegTranscoder {
    /// Creates a transcoder with explicit binary paths.
    pub fn new(ffmpeg: impl Into<String>, ffprobe: impl Into<String>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
        }
    }

    /// Creates a transcoder from the `[media]` config section.
    pub fn from_config(config: &MediaConfig) -> Self {
        Self::new(&config.ffmpeg_path, &config.ffprobe_path)
    }

    /// Command-line arguments for a stream-copy trim.
    pub fn trim_args(source: &Path, start_secs: u64, end_secs: u64, dest: &Path) -> Vec<String> {
        vec![
            "-y".to_string(),
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            "-ss".to_string(),
            format_timestamp(start_secs),
            "-to".to_string(),
            format_timestamp(end_secs),
            "-i".to_string(),
            source.to_string_lossy().into_owned(),
            "-c".to_string(),
            "copy".to_string(),
            dest.to_string_lossy().into_owned(),
        ]
    }

    /// Command-line arguments for a duration probe.
    pub fn probe_args(path: &Path) -> Vec<String> {
        vec![
            "-v".to_string(),
            "error".to_string(),
            "-show_entries".to_string(),
            "format=duration".to_string(),
            "-of".to_string(),
            "default=noprint_wrappers=1:nokey=1".to_string(),
            path.to_string_lossy().into_owned(),
        ]
    }
}

#[async_trait]
impl MediaTranscoder for FfmpegTranscoder {
    async fn probe_duration(&self, path: &Path) -> Result<f64> {
        let output = Command::new(&self.ffprobe)
            .args(Self::probe_args(path))
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                anyhow!(
                    "Failed to run ffprobe (is it installed? path='{}'): {}",
                    self.ffprobe,
                    e
                )
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "ffprobe failed (exit code {}): {}",
                output.status.code().unwrap_or(-1),
                stderr.trim()
            );
        }

        parse_probe_duration(&String::from_utf8_lossy(&output.stdout))
    }

    async fn trim(
        &self,
        source: &Path,
        start_secs: u64,
        end_secs: u64,
        dest: &Path,
    ) -> Result<()> {
        if start_secs >= end_secs {
            bail!("Invalid trim window [{}, {})", start_secs, end_secs);
        }

        let output = Command::new(&self.ffmpeg)
            .args(Self::trim_args(source, start_secs, end_secs, dest))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                anyhow!(
                    "Failed to run ffmpeg (is it installed? path='{}'): {}",
                    self.ffmpeg,
                    e
                )
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "ffmpeg trim failed (exit code {}): {}",
                output.status.code().unwrap_or(-1),
                stderr.trim()
            );
        }

        let size = tokio::fs::metadata(dest)
            .await
            .context("ffmpeg produced no output file")?
            .len();
        if size == 0 {
            bail!("ffmpeg produced an empty clip");
        }
        Ok(())
    }
}

/// Formats whole seconds as a zero-padded `HH:MM:SS` timestamp.
pub fn format_timestamp(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, secs)
}

fn parse_probe_duration(stdout: &str) -> Result<f64> {
    let line = stdout
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .context("ffprobe reported no duration")?;
    let duration: f64 = line
        .parse()
        .with_context(|| format!("ffprobe reported a non-numeric duration: '{}'", line))?;
    if !duration.is_finite() || duration < 0.0 {
        bail!("ffprobe reported an invalid duration: {}", duration);
    }
    Ok(duration)
}
