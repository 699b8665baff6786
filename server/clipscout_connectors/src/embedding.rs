//! HTTP client for a multimodal (video / audio / text) embedding service.
//!
//! The service receives descriptions and local clip paths and answers with
//! three index-aligned vector lists:
//!
//! ```text
//! POST {endpoint}/embed
//! {"descriptions": ["…"], "video_paths": ["/tmp/clip.mp4"]}
//!
//! {"video": [[…]], "audio": [[…]], "description": [[…]]}
//! ```

use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use serde::Serialize;

use clipscout_config::EmbeddingConfig;

use crate::connector::{EmbeddingBatch, MultimodalEmbedder};

/// Embedding backend reached over HTTP.
pub struct HttpEmbedder {
    client: reqwest::Client,
    endpoint: String,
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    descriptions: &'a [String],
    video_paths: Vec<String>,
}

impl HttpEmbedder {
    /// Creates an embedder for `endpoint` with a custom HTTP client.
    pub fn with_client(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        }
    }

    /// Creates an embedder from the `[embedding]` config section.
    pub fn from_config(config: &EmbeddingConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client for embedding service")?;
        Ok(Self::with_client(client, &config.endpoint))
    }

    fn embed_url(&self) -> String {
        format!("{}/embed", self.endpoint)
    }
}

#[async_trait]
impl MultimodalEmbedder for HttpEmbedder {
    async fn embed(&self, descriptions: &[String], clips: &[&Path]) -> Result<EmbeddingBatch> {
        let request = EmbedRequest {
            descriptions,
            video_paths: clips
                .iter()
                .map(|p| p.to_string_lossy().into_owned())
                .collect(),
        };

        let response = self
            .client
            .post(self.embed_url())
            .json(&request)
            .send()
            .await
            .map_err(|e| anyhow!("Embedding request failed: {}", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            bail!("Embedding service returned {}: {}", status, body);
        }

        let batch: EmbeddingBatch = response
            .json()
            .await
            .context("Failed to parse embedding service response")?;
        Ok(batch)
    }
}
