//! Core collaborator traits and types for the acquisition pipeline.
//!
//! Each external system the pipeline talks to (video search, download,
//! transcode, multimodal embedding, text completion) sits behind one trait
//! here, so the orchestrator can run against real backends in production and
//! lightweight mocks in tests.

use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A single raw search result, before any pipeline processing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Opaque external identifier (e.g., a YouTube video ID).
    pub video_id: String,
    /// Video title.
    pub title: String,
    /// Description as published on the source platform (may be empty).
    pub description: String,
    /// Full length of the video in seconds, as reported by the search backend.
    pub duration_secs: u64,
    /// View count at search time.
    pub views: u64,
}

/// Aligned embedding vectors for a batch of (description, clip) pairs.
///
/// The i-th vector of each field corresponds to the i-th input pair.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmbeddingBatch {
    /// Visual embeddings, one per clip.
    pub video: Vec<Vec<f32>>,
    /// Audio-track embeddings, one per clip.
    pub audio: Vec<Vec<f32>>,
    /// Text embeddings, one per description.
    pub description: Vec<Vec<f32>>,
}

impl EmbeddingBatch {
    /// Returns true if all three vector lists hold exactly `n` entries.
    pub fn is_aligned(&self, n: usize) -> bool {
        self.video.len() == n && self.audio.len() == n && self.description.len() == n
    }
}

/// Video search backend.
#[async_trait]
pub trait VideoSearch: Send + Sync {
    /// Returns the backend name (e.g., "youtube").
    fn name(&self) -> &str;

    /// Returns up to `max_results` hits for `query`, in the backend's relevance order.
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>>;
}

/// Video download backend.
#[async_trait]
pub trait VideoDownloader: Send + Sync {
    /// Downloads at most the first `max_duration_secs` seconds of `video_id` into `dest`.
    ///
    /// `dest` already exists (an empty placeholder owned by the caller) and is
    /// overwritten.
    async fn download(&self, video_id: &str, max_duration_secs: u64, dest: &Path) -> Result<()>;
}

/// Media probe / trim backend.
#[async_trait]
pub trait MediaTranscoder: Send + Sync {
    /// Returns the container duration of the media file in seconds.
    async fn probe_duration(&self, path: &Path) -> Result<f64>;

    /// Writes `[start_secs, end_secs)` of `source` into `dest`, stream-copying when possible.
    async fn trim(&self, source: &Path, start_secs: u64, end_secs: u64, dest: &Path)
        -> Result<()>;
}

/// Multimodal embedding backend.
#[async_trait]
pub trait MultimodalEmbedder: Send + Sync {
    /// Embeds each (description, clip) pair. Fails for the whole batch on any error.
    async fn embed(&self, descriptions: &[String], clips: &[&Path]) -> Result<EmbeddingBatch>;
}

/// Text-completion backend used to refine descriptions.
#[async_trait]
pub trait TextEnhancer: Send + Sync {
    /// Returns the completion for `prompt`.
    async fn enhance(&self, prompt: &str) -> Result<String>;
}
