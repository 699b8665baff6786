//! Two-stage deduplication of accumulated candidates.
//!
//! 1. Exact: the first candidate per `video_id` wins.
//! 2. Fuzzy: a candidate whose description scores at or above the threshold
//!    against any already-kept description is dropped.
//!
//! Both stages are stable, and running the filter on its own output is a
//! no-op.

use std::collections::HashSet;

use tracing::debug;

use crate::candidate::VideoCandidate;
use crate::fuzzy::weighted_ratio;

/// Output of [`DeduplicationFilter::filter`].
#[derive(Debug, Clone, Default)]
pub struct DedupOutcome {
    pub candidates: Vec<VideoCandidate>,
    pub exact_removed: usize,
    pub near_removed: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct DeduplicationFilter {
    threshold: u8,
}

impl DeduplicationFilter {
    /// `threshold` is a 0-100 similarity score; scores at or above it are duplicates.
    pub fn new(threshold: u8) -> Self {
        Self {
            threshold: threshold.min(100),
        }
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    pub fn filter(&self, candidates: Vec<VideoCandidate>) -> DedupOutcome {
        let total = candidates.len();

        let mut seen_ids = HashSet::with_capacity(total);
        let unique: Vec<VideoCandidate> = candidates
            .into_iter()
            .filter(|c| seen_ids.insert(c.video_id().to_string()))
            .collect();
        let exact_removed = total - unique.len();

        let mut kept: Vec<VideoCandidate> = Vec::with_capacity(unique.len());
        let mut near_removed = 0;
        for candidate in unique {
            let closest = kept
                .iter()
                .map(|k| (weighted_ratio(candidate.description(), k.description()), k.video_id()))
                .max_by_key(|(score, _)| *score);

            match closest {
                Some((score, similar_to)) if score >= self.threshold => {
                    debug!(
                        video_id = candidate.video_id(),
                        similar_to,
                        score,
                        "Dropping near-duplicate candidate"
                    );
                    near_removed += 1;
                }
                _ => kept.push(candidate),
            }
        }

        DedupOutcome {
            candidates: kept,
            exact_removed,
            near_removed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::{ClipWindow, EmbeddingTriplet};
    use clipscout_connectors::SearchHit;

    fn candidate(id: &str, description: &str) -> VideoCandidate {
        let hit = SearchHit {
            video_id: id.to_string(),
            title: description.to_string(),
            description: String::new(),
            duration_secs: 60,
            views: 0,
        };
        VideoCandidate::new(
            &hit,
            description.to_string(),
            ClipWindow::new(0, 60).unwrap(),
            EmbeddingTriplet {
                video: vec![1.0],
                audio: vec![1.0],
                description: vec![1.0],
            },
        )
        .unwrap()
    }

    fn ids(outcome: &DedupOutcome) -> Vec<&str> {
        outcome.candidates.iter().map(|c| c.video_id()).collect()
    }

    #[test]
    fn test_exact_duplicates_first_wins() {
        let filter = DeduplicationFilter::new(90);
        let outcome = filter.filter(vec![
            candidate("abc", "Alpine glacier hike"),
            candidate("def", "Street food in Bangkok"),
            candidate("abc", "Jazz piano improvisation"),
        ]);
        assert_eq!(ids(&outcome), vec!["abc", "def"]);
        assert_eq!(outcome.candidates[0].description(), "Alpine glacier hike");
        assert_eq!(outcome.exact_removed, 1);
        assert_eq!(outcome.near_removed, 0);
    }

    #[test]
    fn test_near_duplicates_dropped() {
        let filter = DeduplicationFilter::new(90);
        let outcome = filter.filter(vec![
            candidate("a", "Relaxing ocean waves at sunset\n\nFour hours of calm ocean sounds for sleep"),
            candidate("b", "Rocket launch countdown"),
            candidate(
                "c",
                "Relaxing ocean waves at sunset\n\nFour hours of calm ocean sounds for sleep and study",
            ),
        ]);
        assert_eq!(ids(&outcome), vec!["a", "b"]);
        assert_eq!(outcome.near_removed, 1);
    }

    #[test]
    fn test_distinct_descriptions_kept() {
        let filter = DeduplicationFilter::new(90);
        let input = vec![
            candidate("1", "Alpine glacier hike"),
            candidate("2", "Coral reef snorkeling"),
            candidate("3", "Chess endgame tutorial"),
        ];
        let outcome = filter.filter(input.clone());
        assert_eq!(outcome.candidates, input);
    }

    #[test]
    fn test_threshold_boundary_is_inclusive() {
        // "new york mets" vs "mets new york" scores exactly 95
        let at = DeduplicationFilter::new(95).filter(vec![
            candidate("1", "new york mets"),
            candidate("2", "mets new york"),
        ]);
        assert_eq!(at.candidates.len(), 1);

        let above = DeduplicationFilter::new(96).filter(vec![
            candidate("1", "new york mets"),
            candidate("2", "mets new york"),
        ]);
        assert_eq!(above.candidates.len(), 2);
    }

    #[test]
    fn test_idempotent() {
        let filter = DeduplicationFilter::new(90);
        let once = filter.filter(vec![
            candidate("a", "Vintage car restoration"),
            candidate("a", "Vintage car restoration"),
            candidate("b", "Vintage car restoration!"),
            candidate("c", "Desert sandstorm timelapse"),
        ]);
        let twice = filter.filter(once.candidates.clone());
        assert_eq!(twice.candidates, once.candidates);
        assert_eq!(twice.exact_removed, 0);
        assert_eq!(twice.near_removed, 0);
    }

    #[test]
    fn test_empty_input() {
        let outcome = DeduplicationFilter::new(90).filter(Vec::new());
        assert!(outcome.candidates.is_empty());
        assert_eq!(outcome.exact_removed + outcome.near_removed, 0);
    }

    #[test]
    fn test_threshold_clamped() {
        assert_eq!(DeduplicationFilter::new(250).threshold(), 100);
    }
}
