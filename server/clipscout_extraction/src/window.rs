//! Relevance window selection.
//!
//! A [`WindowSelector`] picks the `[start, end)` span of a fetched video to
//! keep. The default [`FullSpanSelector`] keeps the leading span up to the
//! maximum clip length; smarter selectors (scene or transcript analysis) can be
//! plugged in as long as they return a window inside
//! `[0, min(duration, max_clip_secs)]`.

use anyhow::{bail, Result};

use crate::candidate::ClipWindow;

/// Chooses which part of a video to clip for a query.
pub trait WindowSelector: Send + Sync {
    /// Returns a window with `end_secs <= min(duration_secs, max_clip_secs)`.
    fn select(&self, query: &str, duration_secs: u64) -> Result<ClipWindow>;
}

/// Keeps `[0, min(duration, max_clip_secs))`.
#[derive(Debug, Clone, Copy)]
pub struct FullSpanSelector {
    max_clip_secs: u64,
}

impl FullSpanSelector {
    pub fn new(max_clip_secs: u64) -> Self {
        Self { max_clip_secs }
    }
}

impl WindowSelector for FullSpanSelector {
    fn select(&self, _query: &str, duration_secs: u64) -> Result<ClipWindow> {
        let end = duration_secs.min(self.max_clip_secs);
        if end == 0 {
            bail!("video has no usable duration");
        }
        Ok(ClipWindow::new(0, end)?)
    }
}

/// Checks a selector's output against `[0, min(duration_secs, max_clip_secs)]`.
pub(crate) fn check_bounds(window: ClipWindow, duration_secs: u64, max_clip_secs: u64) -> Result<ClipWindow> {
    if window.end_secs() > duration_secs {
        bail!(
            "window end {}s is past the video duration {}s",
            window.end_secs(),
            duration_secs
        );
    }
    if window.end_secs() > max_clip_secs {
        bail!(
            "window end {}s is past the {}s clip limit",
            window.end_secs(),
            max_clip_secs
        );
    }
    Ok(window)
}
