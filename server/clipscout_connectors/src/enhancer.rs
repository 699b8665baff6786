//! OpenAI-compatible chat-completions client used to refine descriptions.

use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

use clipscout_config::EnhancerConfig;

use crate::connector::TextEnhancer;

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageContent,
}

#[derive(Debug, Deserialize)]
struct ChatMessageContent {
    #[serde(default)]
    content: Option<String>,
}

/// Text enhancer backed by an OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiEnhancer {
    api_key: String,
    endpoint: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
    client: reqwest::Client,
}

impl OpenAiEnhancer {
    /// Builds the enhancer from config.
    ///
    /// Returns `Ok(None)` when the enhancer is disabled or its API key env var
    /// is unset or empty.
    pub fn from_config(config: &EnhancerConfig) -> Result<Option<Self>> {
        let Some(api_key) = config.resolve_api_key() else {
            return Ok(None);
        };
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client for text enhancer")?;
        Ok(Some(Self {
            api_key,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            client,
        }))
    }

    fn build_request(&self, prompt: &str) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user",
                content: prompt.to_string(),
            }],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }
}

#[async_trait]
impl TextEnhancer for OpenAiEnhancer {
    async fn enhance(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.endpoint);
        let response = self
            .client
            .post(&url)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(CONTENT_TYPE, "application/json")
            .json(&self.build_request(prompt))
            .send()
            .await
            .map_err(|e| anyhow!("Completion request failed: {}", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            bail!("Completion API error ({}): {}", status, body);
        }

        let chat: ChatResponse = response
            .json()
            .await
            .context("Failed to parse completion response")?;
        extract_content(chat)
    }
}

fn extract_content(chat: ChatResponse) -> Result<String> {
    let choice = chat
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("No completion choices returned"))?;
    Ok(choice.message.content.unwrap_or_default().trim().to_string())
}
