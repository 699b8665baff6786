//! JSON shape of the `search` command's output.

use serde::Serialize;

use clipscout_extraction::{RunReport, VideoCandidate};

/// Results for one query.
#[derive(Debug, Serialize)]
pub struct QueryResult<'a> {
    pub query: &'a str,
    pub candidates: Vec<CandidateOutput<'a>>,
    pub report: &'a RunReport,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum CandidateOutput<'a> {
    Full(&'a VideoCandidate),
    Summary(CandidateSummary<'a>),
}

/// A candidate without its embedding vectors.
#[derive(Debug, Serialize)]
pub struct CandidateSummary<'a> {
    pub video_id: &'a str,
    pub description: &'a str,
    pub views: u64,
    pub start_time: u64,
    pub end_time: u64,
    pub embedding_dims: [usize; 3],
}

impl<'a> CandidateOutput<'a> {
    pub fn new(candidate: &'a VideoCandidate, summary_only: bool) -> Self {
        if !summary_only {
            return CandidateOutput::Full(candidate);
        }
        CandidateOutput::Summary(CandidateSummary {
            video_id: candidate.video_id(),
            description: candidate.description(),
            views: candidate.views(),
            start_time: candidate.start_time(),
            end_time: candidate.end_time(),
            embedding_dims: [
                candidate.video_embedding().len(),
                candidate.audio_embedding().len(),
                candidate.description_embedding().len(),
            ],
        })
    }
}

impl<'a> QueryResult<'a> {
    pub fn new(
        query: &'a str,
        candidates: &'a [VideoCandidate],
        report: &'a RunReport,
        summary_only: bool,
    ) -> Self {
        Self {
            query,
            candidates: candidates
                .iter()
                .map(|c| CandidateOutput::new(c, summary_only))
                .collect(),
            report,
        }
    }
}
