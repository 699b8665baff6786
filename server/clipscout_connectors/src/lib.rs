//! Clipscout Connectors: external collaborators of the acquisition pipeline.
//!
//! This crate provides one trait per external system (see [`connector`]) and
//! a production implementation of each:
//!
//! - [`youtube`]: YouTube Data API v3 search
//! - [`ytdlp`]: `yt-dlp` capped download
//! - [`ffmpeg`]: `ffmpeg` stream-copy trim and `ffprobe` duration probe
//! - [`embedding`]: HTTP multimodal embedding service
//! - [`enhancer`]: OpenAI-compatible description enhancer

pub mod connector;
pub mod embedding;
pub mod enhancer;
pub mod ffmpeg;
pub mod youtube;
pub mod ytdlp;

// Re-export primary types for convenience
pub use connector::{
    EmbeddingBatch, MediaTranscoder, MultimodalEmbedder, SearchHit, TextEnhancer,
    VideoDownloader, VideoSearch,
};
pub use embedding::HttpEmbedder;
pub use enhancer::OpenAiEnhancer;
pub use ffmpeg::{format_timestamp, FfmpegTranscoder};
pub use youtube::{parse_iso8601_duration, YouTubeSearch};
pub use ytdlp::YtDlpDownloader;
