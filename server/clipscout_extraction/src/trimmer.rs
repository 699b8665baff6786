//! Trim stage: cuts the selected window out of a fetched video.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use clipscout_connectors::MediaTranscoder;

use crate::candidate::ClipWindow;
use crate::error::HitError;
use crate::fetcher::FetchedVideo;
use crate::resource::{ResourceLedger, TempClip};

/// Wraps the transcode collaborator, producing a new temp clip per trim.
pub struct ClipTrimmer {
    transcoder: Arc<dyn MediaTranscoder>,
    temp_dir: Option<PathBuf>,
    ledger: ResourceLedger,
}

impl ClipTrimmer {
    pub fn new(
        transcoder: Arc<dyn MediaTranscoder>,
        temp_dir: Option<PathBuf>,
        ledger: ResourceLedger,
    ) -> Self {
        Self {
            transcoder,
            temp_dir,
            ledger,
        }
    }

    /// Writes `window` of `source` into a fresh temp clip.
    ///
    /// Fails without allocating when the window ends past the source duration.
    pub async fn trim(&self, source: &FetchedVideo, window: ClipWindow) -> Result<TempClip, HitError> {
        if window.end_secs() > source.duration_secs {
            return Err(HitError::Trim(format!(
                "window [{}, {}) lies outside the {}s source",
                window.start_secs(),
                window.end_secs(),
                source.duration_secs
            )));
        }

        let output = TempClip::create(self.temp_dir.as_deref(), &self.ledger)
            .map_err(|e| HitError::Trim(format!("cannot create temp file: {}", e)))?;

        let result = self
            .transcoder
            .trim(
                source.clip.path(),
                window.start_secs(),
                window.end_secs(),
                output.path(),
            )
            .await;

        match result {
            Ok(()) => Ok(output),
            Err(e) => {
                if let Err(io) = output.release() {
                    debug!(error = %io, "Failed to remove partial trim output");
                }
                Err(HitError::Trim(format!("{:#}", e)))
            }
        }
    }
}
