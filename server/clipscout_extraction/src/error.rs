//! Error types for the candidate pipeline.
//!
//! Per-hit failures ([`HitError`]) are absorbed by the orchestrator and
//! reported in the run report; only [`PipelineError`] ever reaches the caller.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Pipeline stage at which a hit was abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Fetch,
    Window,
    Describe,
    Trim,
    Embed,
    Deadline,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Fetch => "fetch",
            Stage::Window => "window",
            Stage::Describe => "describe",
            Stage::Trim => "trim",
            Stage::Embed => "embed",
            Stage::Deadline => "deadline",
        };
        f.write_str(name)
    }
}

/// Failure of a single hit. Never aborts the run.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HitError {
    #[error("fetch failed: {0}")]
    Fetch(String),
    #[error("window selection failed: {0}")]
    Window(String),
    #[error("description failed: {0}")]
    Describe(String),
    #[error("trim failed: {0}")]
    Trim(String),
    #[error("embedding failed: {0}")]
    Embedding(String),
    #[error("hit exceeded its {0:?} deadline")]
    Timeout(std::time::Duration),
}

impl HitError {
    /// The stage the hit was abandoned at.
    pub fn stage(&self) -> Stage {
        match self {
            HitError::Fetch(_) => Stage::Fetch,
            HitError::Window(_) => Stage::Window,
            HitError::Describe(_) => Stage::Describe,
            HitError::Trim(_) => Stage::Trim,
            HitError::Embedding(_) => Stage::Embed,
            HitError::Timeout(_) => Stage::Deadline,
        }
    }
}

/// Failure of a whole pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("search failed: {0}")]
    Search(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Rejected construction of a window or candidate.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CandidateError {
    #[error("invalid clip window [{start}, {end})")]
    InvalidWindow { start: u64, end: u64 },
    #[error("description is empty")]
    EmptyDescription,
    #[error("{0} embedding is empty")]
    EmptyEmbedding(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_hit_error_stage() {
        assert_eq!(HitError::Fetch("x".into()).stage(), Stage::Fetch);
        assert_eq!(HitError::Trim("x".into()).stage(), Stage::Trim);
        assert_eq!(HitError::Embedding("x".into()).stage(), Stage::Embed);
        assert_eq!(
            HitError::Timeout(Duration::from_secs(3)).stage(),
            Stage::Deadline
        );
    }

    #[test]
    fn test_error_messages() {
        let err = HitError::Fetch("yt-dlp exited with 1".into());
        assert_eq!(err.to_string(), "fetch failed: yt-dlp exited with 1");
        let err = CandidateError::InvalidWindow { start: 5, end: 5 };
        assert_eq!(err.to_string(), "invalid clip window [5, 5)");
    }

    #[test]
    fn test_stage_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&Stage::Embed).unwrap(), "\"embed\"");
        assert_eq!(Stage::Deadline.to_string(), "deadline");
    }
}
