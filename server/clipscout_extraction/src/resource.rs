//! Temporary clip files with counted, guaranteed release.
//!
//! Every [`TempClip`] registers with a [`ResourceLedger`] when it is created
//! and records exactly one release, whether it is released explicitly with
//! [`TempClip::release`] or implicitly when dropped on an error or
//! cancellation path.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tempfile::TempPath;
use tracing::debug;

#[derive(Debug, Default)]
struct LedgerCounts {
    acquired: AtomicUsize,
    released: AtomicUsize,
}

/// Shared acquisition/release counters for temporary clips.
///
/// Cloning is cheap; clones observe the same counters.
#[derive(Debug, Clone, Default)]
pub struct ResourceLedger {
    counts: Arc<LedgerCounts>,
}

impl ResourceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total clips created through this ledger.
    pub fn acquired(&self) -> usize {
        self.counts.acquired.load(Ordering::SeqCst)
    }

    /// Total clips released through this ledger.
    pub fn released(&self) -> usize {
        self.counts.released.load(Ordering::SeqCst)
    }

    /// Clips currently alive.
    pub fn outstanding(&self) -> usize {
        self.acquired().saturating_sub(self.released())
    }

    fn record_acquire(&self) {
        self.counts.acquired.fetch_add(1, Ordering::SeqCst);
    }

    fn record_release(&self) {
        self.counts.released.fetch_add(1, Ordering::SeqCst);
    }
}

/// A file-backed temporary media artifact (downloaded video or trimmed clip).
///
/// The backing file exists, empty, from creation onward so external tools can
/// overwrite it in place.
#[derive(Debug)]
pub struct TempClip {
    path: PathBuf,
    handle: Option<TempPath>,
    ledger: ResourceLedger,
}

impl TempClip {
    /// Creates an empty `.mp4` temp file in `dir`, or in the OS temp dir when `None`.
    pub fn create(dir: Option<&Path>, ledger: &ResourceLedger) -> io::Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("clipscout-").suffix(".mp4");
        let file = match dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        let handle = file.into_temp_path();
        ledger.record_acquire();
        Ok(Self {
            path: handle.to_path_buf(),
            handle: Some(handle),
            ledger: ledger.clone(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Deletes the backing file, reporting any deletion error.
    ///
    /// The release is counted even when deletion fails.
    pub fn release(mut self) -> io::Result<()> {
        match self.handle.take() {
            Some(handle) => {
                self.ledger.record_release();
                match handle.close() {
                    Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
                    other => other,
                }
            }
            None => Ok(()),
        }
    }
}

impl Drop for TempClip {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.ledger.record_release();
            if let Err(e) = handle.close() {
                if e.kind() != io::ErrorKind::NotFound {
                    debug!(path = %self.path.display(), error = %e, "Failed to remove temp clip");
                }
            }
        }
    }
}
