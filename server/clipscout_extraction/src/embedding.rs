//! Embedding stage: turns (description, clip) pairs into embedding triplets.

use std::path::Path;
use std::sync::Arc;

use clipscout_connectors::MultimodalEmbedder;

use crate::candidate::EmbeddingTriplet;
use crate::error::HitError;
use crate::resource::TempClip;

/// Validating wrapper around the embedding collaborator.
///
/// A batch either yields one complete triplet per input pair or fails as a
/// whole.
pub struct EmbeddingClient {
    embedder: Arc<dyn MultimodalEmbedder>,
}

impl EmbeddingClient {
    pub fn new(embedder: Arc<dyn MultimodalEmbedder>) -> Self {
        Self { embedder }
    }

    pub async fn embed(
        &self,
        descriptions: &[String],
        clips: &[&TempClip],
    ) -> Result<Vec<EmbeddingTriplet>, HitError> {
        if descriptions.len() != clips.len() {
            return Err(HitError::Embedding(format!(
                "got {} descriptions for {} clips",
                descriptions.len(),
                clips.len()
            )));
        }
        if descriptions.is_empty() {
            return Ok(Vec::new());
        }

        let paths: Vec<&Path> = clips.iter().map(|c| c.path()).collect();
        let batch = self
            .embedder
            .embed(descriptions, &paths)
            .await
            .map_err(|e| HitError::Embedding(format!("{:#}", e)))?;

        let n = descriptions.len();
        if !batch.is_aligned(n) {
            return Err(HitError::Embedding(format!(
                "expected {} vectors per modality, got video={} audio={} description={}",
                n,
                batch.video.len(),
                batch.audio.len(),
                batch.description.len()
            )));
        }

        batch
            .video
            .into_iter()
            .zip(batch.audio)
            .zip(batch.description)
            .enumerate()
            .map(|(i, ((video, audio), description))| {
                if video.is_empty() || audio.is_empty() || description.is_empty() {
                    return Err(HitError::Embedding(format!("empty vector for pair {}", i)));
                }
                Ok(EmbeddingTriplet {
                    video,
                    audio,
                    description,
                })
            })
            .collect()
    }
}
