//! Clipscout Extraction: the clip acquisition pipeline.
//!
//! Turns a text query into a bounded, deduplicated list of embedded video
//! clips:
//!
//! - [`resource`]: counted temp clips with guaranteed release
//! - [`fetcher`] / [`trimmer`]: download and cut stages
//! - [`window`]: relevance window selection
//! - [`description`]: base and enhanced descriptions
//! - [`embedding`]: validated multimodal embeddings
//! - [`fuzzy`] / [`dedup`]: exact and near-duplicate filtering
//! - [`pipeline`]: the [`CandidatePipeline`] orchestrator

pub mod candidate;
pub mod dedup;
pub mod description;
pub mod embedding;
pub mod error;
pub mod fetcher;
pub mod fuzzy;
pub mod pipeline;
pub mod resource;
pub mod trimmer;
pub mod window;

pub use candidate::{ClipWindow, EmbeddingTriplet, VideoCandidate};
pub use dedup::{DedupOutcome, DeduplicationFilter};
pub use description::{base_description, enhancement_prompt, DescriptionBuilder};
pub use embedding::EmbeddingClient;
pub use error::{CandidateError, HitError, PipelineError, Stage};
pub use fetcher::{FetchedVideo, VideoFetcher};
pub use fuzzy::weighted_ratio;
pub use pipeline::{
    CandidatePipeline, Collaborators, PipelineOutcome, PipelineSettings, RunReport, SkippedHit,
};
pub use resource::{ResourceLedger, TempClip};
pub use trimmer::ClipTrimmer;
pub use window::{FullSpanSelector, WindowSelector};
