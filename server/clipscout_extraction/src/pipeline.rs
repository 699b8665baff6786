//! Candidate pipeline orchestrator.
//!
//! Drives one query end to end:
//! 1. **Search**: request an oversampled batch of hits
//! 2. **Fetch**: download the capped leading part of each video
//! 3. **Window**: pick the span to keep
//! 4. **Describe**: build (and optionally enhance) the description
//! 5. **Trim**: cut the window into its own clip
//! 6. **Embed**: produce video/audio/description vectors
//! 7. **Dedup**: exact then fuzzy, once over everything accepted
//!
//! Hits are consumed in search order until the target count is reached. A
//! failing hit is logged, recorded in the [`RunReport`], and skipped; only a
//! search failure fails the run. Every temp clip a hit creates is released
//! before the hit finishes, including when it fails, times out, or is dropped
//! because the target was already met.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span, warn, Instrument};

use clipscout_config::ClipscoutConfig;
use clipscout_connectors::{
    MediaTranscoder, MultimodalEmbedder, SearchHit, TextEnhancer, VideoDownloader, VideoSearch,
};

use crate::candidate::VideoCandidate;
use crate::dedup::DeduplicationFilter;
use crate::description::DescriptionBuilder;
use crate::embedding::EmbeddingClient;
use crate::error::{HitError, PipelineError, Stage};
use crate::fetcher::{FetchedVideo, VideoFetcher};
use crate::resource::{ResourceLedger, TempClip};
use crate::trimmer::ClipTrimmer;
use crate::window::{check_bounds, FullSpanSelector, WindowSelector};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Run-time knobs for the pipeline. Read-only for the duration of a run.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Maximum clip length in seconds.
    pub max_clip_secs: u64,
    /// Maximum seconds downloaded per video.
    pub download_cap_secs: u64,
    /// Hits requested per wanted candidate.
    pub oversample_factor: f64,
    /// Fuzzy similarity (0-100) at which descriptions count as duplicates.
    pub fuzzy_threshold: u8,
    /// Hits processed at once. Results are still consumed in search order.
    pub concurrency: usize,
    /// Deadline for a single hit, if any.
    pub hit_timeout: Option<Duration>,
    /// Directory for temp clips. `None` uses the OS temp dir.
    pub temp_dir: Option<PathBuf>,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            max_clip_secs: 120,
            download_cap_secs: 300,
            oversample_factor: 1.5,
            fuzzy_threshold: 90,
            concurrency: 1,
            hit_timeout: None,
            temp_dir: None,
        }
    }
}

impl PipelineSettings {
    pub fn from_config(config: &ClipscoutConfig) -> Self {
        let pipeline = &config.pipeline;
        Self {
            max_clip_secs: pipeline.max_clip_secs,
            download_cap_secs: pipeline.download_cap_secs,
            oversample_factor: pipeline.oversample_factor,
            fuzzy_threshold: pipeline.fuzzy_threshold,
            concurrency: pipeline.concurrency,
            hit_timeout: (pipeline.hit_timeout_secs > 0)
                .then(|| Duration::from_secs(pipeline.hit_timeout_secs)),
            temp_dir: config.media.temp_dir.as_ref().map(PathBuf::from),
        }
    }
}

/// External collaborators the pipeline is wired to.
pub struct Collaborators {
    pub search: Arc<dyn VideoSearch>,
    pub downloader: Arc<dyn VideoDownloader>,
    pub transcoder: Arc<dyn MediaTranscoder>,
    pub embedder: Arc<dyn MultimodalEmbedder>,
    /// Absent when no enhancement credential is configured.
    pub enhancer: Option<Arc<dyn TextEnhancer>>,
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// A hit abandoned during processing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedHit {
    pub video_id: String,
    pub stage: Stage,
    pub reason: String,
}

/// Counters and diagnostics for a single run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunReport {
    /// Hits asked of the search backend.
    pub hits_requested: usize,
    /// Hits the search backend returned.
    pub hits_received: usize,
    /// Hits whose processing finished before the run stopped.
    pub hits_attempted: usize,
    /// Candidates produced before deduplication.
    pub succeeded: usize,
    pub skipped: Vec<SkippedHit>,
    pub exact_duplicates_removed: usize,
    pub near_duplicates_removed: usize,
    /// Temp clips created during the run.
    pub resources_acquired: usize,
    /// Temp clips released during the run.
    pub resources_released: usize,
    pub elapsed_ms: u64,
}

/// Candidates returned by a run, with its report.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub candidates: Vec<VideoCandidate>,
    pub report: RunReport,
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

pub struct CandidatePipeline {
    search: Arc<dyn VideoSearch>,
    fetcher: VideoFetcher,
    selector: Arc<dyn WindowSelector>,
    describer: DescriptionBuilder,
    trimmer: ClipTrimmer,
    embedder: EmbeddingClient,
    dedup: DeduplicationFilter,
    settings: PipelineSettings,
    ledger: ResourceLedger,
}

impl CandidatePipeline {
    pub fn new(settings: PipelineSettings, collaborators: Collaborators) -> Self {
        let ledger = ResourceLedger::new();
        let Collaborators {
            search,
            downloader,
            transcoder,
            embedder,
            enhancer,
        } = collaborators;

        Self {
            search,
            fetcher: VideoFetcher::new(
                downloader,
                transcoder.clone(),
                settings.download_cap_secs,
                settings.temp_dir.clone(),
                ledger.clone(),
            ),
            selector: Arc::new(FullSpanSelector::new(settings.max_clip_secs)),
            describer: DescriptionBuilder::new(enhancer),
            trimmer: ClipTrimmer::new(transcoder, settings.temp_dir.clone(), ledger.clone()),
            embedder: EmbeddingClient::new(embedder),
            dedup: DeduplicationFilter::new(settings.fuzzy_threshold),
            settings,
            ledger,
        }
    }

    /// Replaces the default leading-span window selector.
    pub fn with_window_selector(mut self, selector: Arc<dyn WindowSelector>) -> Self {
        self.selector = selector;
        self
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Ledger of every temp clip this pipeline has created and released.
    pub fn ledger(&self) -> &ResourceLedger {
        &self.ledger
    }

    /// `ceil(target_count × oversample_factor)`, never below `target_count`.
    pub fn hits_to_request(&self, target_count: usize) -> usize {
        let factor = self.settings.oversample_factor.max(1.0);
        // the epsilon absorbs float error such as 10 × 1.1 = 11.000000000000002
        let wanted = (target_count as f64 * factor - 1e-9).ceil() as usize;
        wanted.max(target_count)
    }

    /// Runs the pipeline for `query`, returning at most `target_count` candidates.
    pub async fn run(
        &self,
        query: &str,
        target_count: usize,
    ) -> Result<PipelineOutcome, PipelineError> {
        if target_count == 0 {
            return Err(PipelineError::InvalidArgument(
                "target count must be at least 1".to_string(),
            ));
        }

        let run_span = info_span!(
            "pipeline_run",
            query = %query,
            target = target_count,
            hits = tracing::field::Empty,
            candidates = tracing::field::Empty,
            skipped = tracing::field::Empty,
            duration_ms = tracing::field::Empty,
        );

        let outcome = self
            .run_inner(query, target_count)
            .instrument(run_span.clone())
            .await?;

        run_span.record("hits", outcome.report.hits_received);
        run_span.record("candidates", outcome.candidates.len());
        run_span.record("skipped", outcome.report.skipped.len());
        run_span.record("duration_ms", outcome.report.elapsed_ms);
        Ok(outcome)
    }

    async fn run_inner(
        &self,
        query: &str,
        target_count: usize,
    ) -> Result<PipelineOutcome, PipelineError> {
        let started = Instant::now();
        let acquired_before = self.ledger.acquired();
        let released_before = self.ledger.released();

        let requested = self.hits_to_request(target_count);
        let mut hits = self
            .search
            .search(query, requested)
            .await
            .map_err(|e| PipelineError::Search(format!("{:#}", e)))?;
        hits.truncate(requested);
        info!(
            backend = self.search.name(),
            requested,
            received = hits.len(),
            "Search complete"
        );

        let mut report = RunReport {
            hits_requested: requested,
            hits_received: hits.len(),
            ..Default::default()
        };

        let mut accepted: Vec<VideoCandidate> = Vec::with_capacity(target_count);
        {
            let mut outcomes = stream::iter(hits.iter())
                .map(|hit| async move { (hit, self.process_hit_with_deadline(query, hit).await) })
                .buffered(self.settings.concurrency.max(1));

            while let Some((hit, outcome)) = outcomes.next().await {
                report.hits_attempted += 1;
                match outcome {
                    Ok(candidate) => {
                        debug!(video_id = %hit.video_id, "Candidate accepted");
                        accepted.push(candidate);
                        if accepted.len() >= target_count {
                            break;
                        }
                    }
                    Err(err) => {
                        warn!(
                            video_id = %hit.video_id,
                            stage = %err.stage(),
                            error = %err,
                            "Skipping hit"
                        );
                        report.skipped.push(SkippedHit {
                            video_id: hit.video_id.clone(),
                            stage: err.stage(),
                            reason: err.to_string(),
                        });
                    }
                }
            }
            // dropping the stream here cancels in-flight hits and releases their clips
        }
        report.succeeded = accepted.len();

        let deduped = self.dedup.filter(accepted);
        report.exact_duplicates_removed = deduped.exact_removed;
        report.near_duplicates_removed = deduped.near_removed;

        let mut candidates = deduped.candidates;
        candidates.truncate(target_count);

        report.resources_acquired = self.ledger.acquired().saturating_sub(acquired_before);
        report.resources_released = self.ledger.released().saturating_sub(released_before);
        report.elapsed_ms = started.elapsed().as_millis() as u64;

        info!(
            candidates = candidates.len(),
            attempted = report.hits_attempted,
            skipped = report.skipped.len(),
            exact_duplicates = report.exact_duplicates_removed,
            near_duplicates = report.near_duplicates_removed,
            duration_ms = report.elapsed_ms,
            "Pipeline run complete"
        );

        Ok(PipelineOutcome { candidates, report })
    }

    async fn process_hit_with_deadline(
        &self,
        query: &str,
        hit: &SearchHit,
    ) -> Result<VideoCandidate, HitError> {
        let hit_span = info_span!(
            "hit",
            video_id = %hit.video_id,
            reported_secs = hit.duration_secs,
        );
        let work = self.process_hit(query, hit).instrument(hit_span);
        match self.settings.hit_timeout {
            Some(limit) => tokio::time::timeout(limit, work)
                .await
                .unwrap_or_else(|_| Err(HitError::Timeout(limit))),
            None => work.await,
        }
    }

    async fn process_hit(&self, query: &str, hit: &SearchHit) -> Result<VideoCandidate, HitError> {
        let source = self.fetcher.fetch(&hit.video_id, hit.duration_secs).await?;
        let result = self.build_candidate(query, hit, &source).await;
        release(source.clip, &hit.video_id);
        result
    }

    async fn build_candidate(
        &self,
        query: &str,
        hit: &SearchHit,
        source: &FetchedVideo,
    ) -> Result<VideoCandidate, HitError> {
        let window = self
            .selector
            .select(query, source.duration_secs)
            .and_then(|w| check_bounds(w, source.duration_secs, self.settings.max_clip_secs))
            .map_err(|e| HitError::Window(format!("{:#}", e)))?;

        let description = self
            .describer
            .build(&hit.title, &hit.description, query)
            .await?;

        let clip = self.trimmer.trim(source, window).await?;
        let embedded = self
            .embedder
            .embed(std::slice::from_ref(&description), &[&clip])
            .await;
        release(clip, &hit.video_id);

        let triplet = embedded?
            .into_iter()
            .next()
            .ok_or_else(|| HitError::Embedding("no embedding returned".to_string()))?;

        VideoCandidate::new(hit, description, window, triplet)
            .map_err(|e| HitError::Embedding(e.to_string()))
    }
}

fn release(clip: TempClip, video_id: &str) {
    let path = clip.path().display().to_string();
    if let Err(e) = clip.release() {
        warn!(video_id, path = %path, error = %e, "Failed to delete temp clip");
    }
}
