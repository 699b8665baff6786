//! YouTube search collaborator: finds videos for a text query.
//!
//! Uses the YouTube Data API v3: `search.list` for ranked video IDs, then
//! `videos.list` for full titles, descriptions, durations and view counts.

use std::collections::HashMap;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

use clipscout_config::SearchConfig;

use crate::connector::{SearchHit, VideoSearch};

/// YouTube API page size limit for both `search.list` and `videos.list`.
const MAX_PAGE_SIZE: usize = 50;

/// YouTube search backend.
///
/// Requires a YouTube Data API v3 key. Results keep the ranking returned by
/// `search.list`; videos that `videos.list` no longer knows about (deleted or
/// private since indexing) are dropped.
pub struct YouTubeSearch {
    client: reqwest::Client,
    api_key: String,
    api_base: String,
}

impl YouTubeSearch {
    /// Creates a search backend with an explicit key and API base.
    pub fn new(api_key: impl Into<String>, api_base: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), api_key, api_base)
    }

    /// Creates a search backend with a custom HTTP client.
    pub fn with_client(
        client: reqwest::Client,
        api_key: impl Into<String>,
        api_base: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    /// Builds the backend from config, reading the key from `config.api_key_env`.
    pub fn from_config(config: &SearchConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .with_context(|| {
                format!(
                    "YouTube search requires an API key in the '{}' env var",
                    config.api_key_env
                )
            })?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client for YouTube search")?;
        Ok(Self::with_client(client, api_key, &config.api_base))
    }

    /// Runs `search.list`, following page tokens until `max_results` IDs are collected.
    async fn search_video_ids(&self, query: &str, max_results: usize) -> Result<Vec<String>> {
        let mut video_ids = Vec::new();
        let mut page_token: Option<String> = None;

        while video_ids.len() < max_results {
            let page_size = (max_results - video_ids.len()).min(MAX_PAGE_SIZE);
            let mut params = vec![
                ("key".to_string(), self.api_key.clone()),
                ("q".to_string(), query.to_string()),
                ("part".to_string(), "id".to_string()),
                ("type".to_string(), "video".to_string()),
                ("maxResults".to_string(), page_size.to_string()),
            ];
            if let Some(ref token) = page_token {
                params.push(("pageToken".to_string(), token.clone()));
            }

            let resp: SearchListResponse = self
                .client
                .get(format!("{}/search", self.api_base))
                .query(&params)
                .send()
                .await
                .context("Failed to call YouTube search.list API")?
                .json()
                .await
                .context("Failed to parse YouTube search.list response")?;

            if let Some(error) = resp.error {
                bail!("YouTube API error: {} ({})", error.message, error.code);
            }

            let items = resp.items.unwrap_or_default();
            if items.is_empty() {
                break;
            }
            for item in items {
                if let Some(id) = item.id.video_id {
                    if !video_ids.contains(&id) {
                        video_ids.push(id);
                    }
                }
            }

            match resp.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        video_ids.truncate(max_results);
        Ok(video_ids)
    }

    /// Fetches video details (metadata) for a list of video IDs.
    async fn fetch_video_details(&self, video_ids: &[String]) -> Result<Vec<VideoDetails>> {
        let mut all_details = Vec::new();

        for chunk in video_ids.chunks(MAX_PAGE_SIZE) {
            let ids = chunk.join(",");
            let resp: VideoListResponse = self
                .client
                .get(format!("{}/videos", self.api_base))
                .query(&[
                    ("key", self.api_key.as_str()),
                    ("id", ids.as_str()),
                    ("part", "snippet,contentDetails,statistics"),
                ])
                .send()
                .await
                .context("Failed to call YouTube videos.list API")?
                .json()
                .await
                .context("Failed to parse YouTube videos.list response")?;

            if let Some(error) = resp.error {
                bail!("YouTube API error: {} ({})", error.message, error.code);
            }

            all_details.extend(resp.items.unwrap_or_default());
        }

        Ok(all_details)
    }
}

#[async_trait]
impl VideoSearch for YouTubeSearch {
    fn name(&self) -> &str {
        "youtube"
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>> {
        if max_results == 0 {
            return Ok(Vec::new());
        }

        let video_ids = self.search_video_ids(query, max_results).await?;
        if video_ids.is_empty() {
            return Ok(Vec::new());
        }

        let details = self.fetch_video_details(&video_ids).await?;
        let hits = order_hits(&video_ids, details);
        tracing::debug!(
            "YouTube search '{}': {} ids, {} hits with details",
            query,
            video_ids.len(),
            hits.len()
        );
        Ok(hits)
    }
}

/// Maps video details back onto the ranked ID list, dropping IDs without details.
fn order_hits(ranked_ids: &[String], details: Vec<VideoDetails>) -> Vec<SearchHit> {
    let mut by_id: HashMap<String, VideoDetails> =
        details.into_iter().map(|d| (d.id.clone(), d)).collect();

    ranked_ids
        .iter()
        .filter_map(|id| by_id.remove(id))
        .map(details_to_hit)
        .collect()
}

fn details_to_hit(video: VideoDetails) -> SearchHit {
    let duration_secs = video
        .content_details
        .as_ref()
        .and_then(|cd| cd.duration.as_deref())
        .and_then(parse_iso8601_duration)
        .unwrap_or(0);
    let views = video
        .statistics
        .as_ref()
        .and_then(|s| s.view_count.as_deref())
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);

    SearchHit {
        video_id: video.id,
        title: video.snippet.title,
        description: video.snippet.description,
        duration_secs,
        views,
    }
}

/// Parses an ISO 8601 duration (e.g., "PT1H2M3S", "P1DT30M", "P0D") into seconds.
///
/// Returns `None` for anything that is not a `P[nD][T[nH][nM][nS]]` duration.
/// Fractional seconds are truncated.
pub fn parse_iso8601_duration(s: &str) -> Option<u64> {
    let rest = s.strip_prefix('P')?;
    if rest.is_empty() {
        return None;
    }

    let mut total: u64 = 0;
    let mut number = String::new();
    let mut in_time = false;
    let mut saw_component = false;

    for c in rest.chars() {
        match c {
            'T' => {
                if in_time || !number.is_empty() {
                    return None;
                }
                in_time = true;
            }
            '0'..='9' | '.' => number.push(c),
            unit => {
                if number.is_empty() {
                    return None;
                }
                let value: f64 = number.parse().ok()?;
                number.clear();
                let multiplier = match (unit, in_time) {
                    ('W', false) => 7 * 86_400,
                    ('D', false) => 86_400,
                    ('H', true) => 3_600,
                    ('M', true) => 60,
                    ('S', true) => 1,
                    _ => return None,
                };
                total += (value * multiplier as f64) as u64;
                saw_component = true;
            }
        }
    }

    if !number.is_empty() || !saw_component {
        return None;
    }
    Some(total)
}

// --- YouTube Data API v3 response types ---

#[derive(Debug, Deserialize)]
struct ApiError {
    code: u32,
    message: String,
}

#[derive(Debug, Deserialize)]
struct SearchListResponse {
    #[serde(default)]
    items: Option<Vec<SearchItem>>,
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
}

#[derive(Debug, Deserialize)]
struct SearchItemId {
    #[serde(rename = "videoId")]
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Option<Vec<VideoDetails>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct VideoDetails {
    id: String,
    snippet: VideoSnippet,
    #[serde(rename = "contentDetails")]
    content_details: Option<VideoContentDetails>,
    statistics: Option<VideoStatistics>,
}

#[derive(Debug, Deserialize)]
struct VideoSnippet {
    title: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct VideoContentDetails {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideoStatistics {
    #[serde(rename = "viewCount")]
    view_count: Option<String>,
}
