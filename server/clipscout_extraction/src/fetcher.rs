//! Download stage: fetches the leading part of a video into a temp clip.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use clipscout_connectors::{MediaTranscoder, VideoDownloader};

use crate::error::HitError;
use crate::resource::{ResourceLedger, TempClip};

/// A downloaded source video and its usable duration.
#[derive(Debug)]
pub struct FetchedVideo {
    pub clip: TempClip,
    /// Duration in whole seconds, never above the download cap.
    pub duration_secs: u64,
}

/// Wraps the download collaborator with capped, leak-free fetching.
pub struct VideoFetcher {
    downloader: Arc<dyn VideoDownloader>,
    transcoder: Arc<dyn MediaTranscoder>,
    download_cap_secs: u64,
    temp_dir: Option<PathBuf>,
    ledger: ResourceLedger,
}

impl VideoFetcher {
    pub fn new(
        downloader: Arc<dyn VideoDownloader>,
        transcoder: Arc<dyn MediaTranscoder>,
        download_cap_secs: u64,
        temp_dir: Option<PathBuf>,
        ledger: ResourceLedger,
    ) -> Self {
        Self {
            downloader,
            transcoder,
            download_cap_secs,
            temp_dir,
            ledger,
        }
    }

    /// Seconds to request for a video the search reported as `reported_secs` long.
    ///
    /// Unknown lengths (0, as for live streams) fall back to the cap.
    pub fn download_length(&self, reported_secs: u64) -> u64 {
        if reported_secs == 0 {
            self.download_cap_secs
        } else {
            reported_secs.min(self.download_cap_secs)
        }
    }

    /// Downloads at most the capped length of `video_id`.
    ///
    /// On failure the partially-written clip is released before returning.
    pub async fn fetch(&self, video_id: &str, reported_secs: u64) -> Result<FetchedVideo, HitError> {
        let clip = TempClip::create(self.temp_dir.as_deref(), &self.ledger)
            .map_err(|e| HitError::Fetch(format!("cannot create temp file: {}", e)))?;
        let max_secs = self.download_length(reported_secs);

        if let Err(e) = self.downloader.download(video_id, max_secs, clip.path()).await {
            if let Err(io) = clip.release() {
                debug!(video_id, error = %io, "Failed to remove partial download");
            }
            return Err(HitError::Fetch(format!("{:#}", e)));
        }

        let duration_secs = match self.transcoder.probe_duration(clip.path()).await {
            Ok(probed) => (probed.floor() as u64).min(self.download_cap_secs),
            Err(e) => {
                let reason = format!("{:#}", e);
                debug!(
                    video_id,
                    error = %reason,
                    fallback_secs = max_secs,
                    "Duration probe failed, using search-reported length"
                );
                max_secs
            }
        };

        Ok(FetchedVideo {
            clip,
            duration_secs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::Mutex;

    use anyhow::{bail, Result};
    use async_trait::async_trait;

    struct RecordingDownloader {
        fail: bool,
        requested: Mutex<Vec<u64>>,
    }

    #[async_trait]
    impl VideoDownloader for RecordingDownloader {
        async fn download(&self, _video_id: &str, max_secs: u64, dest: &Path) -> Result<()> {
            self.requested.lock().unwrap().push(max_secs);
            std::fs::write(dest, b"partial")?;
            if self.fail {
                bail!("HTTP Error 403: Forbidden");
            }
            Ok(())
        }
    }

    struct FixedProbe(Option<f64>);

    #[async_trait]
    impl MediaTranscoder for FixedProbe {
        async fn probe_duration(&self, _path: &Path) -> Result<f64> {
            match self.0 {
                Some(d) => Ok(d),
                None => bail!("moov atom not found"),
            }
        }

        async fn trim(&self, _s: &Path, _a: u64, _b: u64, _d: &Path) -> Result<()> {
            unreachable!("fetcher never trims")
        }
    }

    fn make_fetcher(
        fail: bool,
        probe: Option<f64>,
        dir: &Path,
        ledger: &ResourceLedger,
    ) -> (VideoFetcher, Arc<RecordingDownloader>) {
        let downloader = Arc::new(RecordingDownloader {
            fail,
            requested: Mutex::new(Vec::new()),
        });
        let fetcher = VideoFetcher::new(
            downloader.clone(),
            Arc::new(FixedProbe(probe)),
            300,
            Some(dir.to_path_buf()),
            ledger.clone(),
        );
        (fetcher, downloader)
    }

    #[test]
    fn test_download_length() {
        let dir = tempfile::tempdir().unwrap();
        let (fetcher, _) = make_fetcher(false, None, dir.path(), &ResourceLedger::new());
        assert_eq!(fetcher.download_length(60), 60);
        assert_eq!(fetcher.download_length(3600), 300);
        assert_eq!(fetcher.download_length(0), 300);
    }

    #[tokio::test]
    async fn test_fetch_uses_probed_duration() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ResourceLedger::new();
        let (fetcher, downloader) = make_fetcher(false, Some(212.7), dir.path(), &ledger);

        let fetched = fetcher.fetch("abc", 3600).await.unwrap();
        assert_eq!(fetched.duration_secs, 212);
        assert_eq!(*downloader.requested.lock().unwrap(), vec![300]);
        assert!(fetched.clip.path().exists());

        fetched.clip.release().unwrap();
        assert_eq!(ledger.outstanding(), 0);
    }

    #[tokio::test]
    async fn test_fetch_caps_probed_duration() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ResourceLedger::new();
        let (fetcher, _) = make_fetcher(false, Some(900.0), dir.path(), &ledger);
        let fetched = fetcher.fetch("abc", 900).await.unwrap();
        assert_eq!(fetched.duration_secs, 300);
    }

    #[tokio::test]
    async fn test_fetch_probe_failure_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ResourceLedger::new();
        let (fetcher, _) = make_fetcher(false, None, dir.path(), &ledger);
        let fetched = fetcher.fetch("abc", 95).await.unwrap();
        assert_eq!(fetched.duration_secs, 95);
    }

    #[tokio::test]
    async fn test_fetch_failure_releases_clip() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ResourceLedger::new();
        let (fetcher, _) = make_fetcher(true, Some(10.0), dir.path(), &ledger);

        let err = fetcher.fetch("abc", 60).await.unwrap_err();
        assert!(matches!(err, HitError::Fetch(ref msg) if msg.contains("403")));
        assert_eq!(ledger.acquired(), 1);
        assert_eq!(ledger.released(), 1);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
