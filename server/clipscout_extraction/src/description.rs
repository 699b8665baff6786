//! Description stage.
//!
//! The base description is the video title, followed by a blank line and
//! the native description when one exists. If a text enhancer is configured
//! it is asked for a refined description; any enhancer error or blank answer
//! falls back to the base text.

use std::sync::Arc;

use tracing::{debug, warn};

use clipscout_connectors::TextEnhancer;

use crate::error::HitError;

pub struct DescriptionBuilder {
    enhancer: Option<Arc<dyn TextEnhancer>>,
}

impl DescriptionBuilder {
    pub fn new(enhancer: Option<Arc<dyn TextEnhancer>>) -> Self {
        Self { enhancer }
    }

    pub fn is_enhanced(&self) -> bool {
        self.enhancer.is_some()
    }

    pub async fn build(&self, title: &str, native: &str, query: &str) -> Result<String, HitError> {
        let base = base_description(title, native);
        if base.trim().is_empty() {
            return Err(HitError::Describe("hit has neither title nor description".to_string()));
        }

        let Some(enhancer) = &self.enhancer else {
            return Ok(base);
        };

        match enhancer.enhance(&enhancement_prompt(query, &base)).await {
            Ok(text) if !text.trim().is_empty() => {
                debug!(chars = text.len(), "Description enhanced");
                Ok(text.trim().to_string())
            }
            Ok(_) => {
                warn!("Enhancer returned an empty description, keeping base text");
                Ok(base)
            }
            Err(e) => {
                let reason = format!("{:#}", e);
                warn!(error = %reason, "Description enhancement failed, keeping base text");
                Ok(base)
            }
        }
    }
}

/// `title`, plus `"\n\n" + native` when the native description is non-empty.
pub fn base_description(title: &str, native: &str) -> String {
    match (title.is_empty(), native.is_empty()) {
        (_, true) => title.to_string(),
        (true, false) => native.to_string(),
        (false, false) => format!("{}\n\n{}", title, native),
    }
}

pub fn enhancement_prompt(query: &str, base: &str) -> String {
    format!(
        "Generate a concise and informative video description for the following query: '{}'.\n\nExisting description: {}",
        query, base
    )
}
