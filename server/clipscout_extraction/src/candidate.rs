//! The pipeline's output record and its building blocks.

use serde::{Deserialize, Serialize};

use clipscout_connectors::SearchHit;

use crate::error::CandidateError;

/// A `[start_secs, end_secs)` interval of a video, in whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipWindow {
    start_secs: u64,
    end_secs: u64,
}

impl ClipWindow {
    /// Builds a window, rejecting `start_secs >= end_secs`.
    pub fn new(start_secs: u64, end_secs: u64) -> Result<Self, CandidateError> {
        if start_secs >= end_secs {
            return Err(CandidateError::InvalidWindow {
                start: start_secs,
                end: end_secs,
            });
        }
        Ok(Self {
            start_secs,
            end_secs,
        })
    }

    pub fn start_secs(&self) -> u64 {
        self.start_secs
    }

    pub fn end_secs(&self) -> u64 {
        self.end_secs
    }

    pub fn duration(&self) -> u64 {
        self.end_secs - self.start_secs
    }
}

/// The three embeddings produced for one (description, clip) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingTriplet {
    pub video: Vec<f32>,
    pub audio: Vec<f32>,
    pub description: Vec<f32>,
}

/// A fully processed hit: described, trimmed and embedded.
///
/// Instances only exist once every stage has succeeded; there is no
/// partially-populated candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoCandidate {
    video_id: String,
    description: String,
    views: u64,
    start_time: u64,
    end_time: u64,
    video_embedding: Vec<f32>,
    audio_embedding: Vec<f32>,
    description_embedding: Vec<f32>,
}

impl VideoCandidate {
    pub fn new(
        hit: &SearchHit,
        description: String,
        window: ClipWindow,
        embeddings: EmbeddingTriplet,
    ) -> Result<Self, CandidateError> {
        if description.trim().is_empty() {
            return Err(CandidateError::EmptyDescription);
        }
        if embeddings.video.is_empty() {
            return Err(CandidateError::EmptyEmbedding("video"));
        }
        if embeddings.audio.is_empty() {
            return Err(CandidateError::EmptyEmbedding("audio"));
        }
        if embeddings.description.is_empty() {
            return Err(CandidateError::EmptyEmbedding("description"));
        }

        Ok(Self {
            video_id: hit.video_id.clone(),
            description,
            views: hit.views,
            start_time: window.start_secs(),
            end_time: window.end_secs(),
            video_embedding: embeddings.video,
            audio_embedding: embeddings.audio,
            description_embedding: embeddings.description,
        })
    }

    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn views(&self) -> u64 {
        self.views
    }

    pub fn start_time(&self) -> u64 {
        self.start_time
    }

    pub fn end_time(&self) -> u64 {
        self.end_time
    }

    pub fn video_embedding(&self) -> &[f32] {
        &self.video_embedding
    }

    pub fn audio_embedding(&self) -> &[f32] {
        &self.audio_embedding
    }

    pub fn description_embedding(&self) -> &[f32] {
        &self.description_embedding
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit() -> SearchHit {
        SearchHit {
            video_id: "abc".to_string(),
            title: "Title".to_string(),
            description: String::new(),
            duration_secs: 90,
            views: 42,
        }
    }

    fn triplet() -> EmbeddingTriplet {
        EmbeddingTriplet {
            video: vec![0.1; 3],
            audio: vec![0.2; 3],
            description: vec![0.3; 3],
        }
    }

    #[test]
    fn test_clip_window_bounds() {
        let window = ClipWindow::new(0, 120).unwrap();
        assert_eq!(window.duration(), 120);
        assert!(ClipWindow::new(10, 10).is_err());
        assert!(ClipWindow::new(11, 10).is_err());
    }

    #[test]
    fn test_candidate_new() {
        let window = ClipWindow::new(0, 60).unwrap();
        let candidate = VideoCandidate::new(&hit(), "Title".to_string(), window, triplet()).unwrap();
        assert_eq!(candidate.video_id(), "abc");
        assert_eq!(candidate.views(), 42);
        assert_eq!(candidate.start_time(), 0);
        assert_eq!(candidate.end_time(), 60);
        assert_eq!(candidate.audio_embedding(), &[0.2, 0.2, 0.2]);
    }

    #[test]
    fn test_candidate_rejects_blank_description() {
        let window = ClipWindow::new(0, 60).unwrap();
        let err = VideoCandidate::new(&hit(), "  \n".to_string(), window, triplet()).unwrap_err();
        assert_eq!(err, CandidateError::EmptyDescription);
    }

    #[test]
    fn test_candidate_rejects_empty_embedding() {
        let window = ClipWindow::new(0, 60).unwrap();
        let mut embeddings = triplet();
        embeddings.audio.clear();
        let err = VideoCandidate::new(&hit(), "Title".to_string(), window, embeddings).unwrap_err();
        assert_eq!(err, CandidateError::EmptyEmbedding("audio"));
    }

    #[test]
    fn test_candidate_serialization_field_names() {
        let window = ClipWindow::new(5, 65).unwrap();
        let candidate = VideoCandidate::new(&hit(), "Title".to_string(), window, triplet()).unwrap();
        let json = serde_json::to_value(&candidate).unwrap();
        assert_eq!(json["video_id"], "abc");
        assert_eq!(json["start_time"], 5);
        assert_eq!(json["end_time"], 65);
        assert_eq!(json["description_embedding"].as_array().unwrap().len(), 3);
    }
}
