//! # Clipscout Config
//!
//! Configuration system for the clipscout video acquisition pipeline.
//!
//! Provides TOML-based configuration parsing and validation for the pipeline
//! limits, the external collaborators (search, download, media tools, embedding
//! service, text enhancer) and logging.
//!
//! # Configuration Schema
//!
//! The configuration file (`clipscout.toml`) supports the following sections:
//! - `[pipeline]`: clip length cap, download cap, oversampling, fuzzy threshold, concurrency
//! - `[search]`: YouTube Data API settings
//! - `[download]`: `yt-dlp` binary and format selection
//! - `[media]`: `ffmpeg` / `ffprobe` binaries and temp storage
//! - `[embedding]`: multimodal embedding service endpoint
//! - `[enhancer]`: optional OpenAI-compatible description enhancer
//! - `[logging]`: log level and format
//!
//! # Environment Variable Overrides
//!
//! Every config field can be overridden via environment variables using the
//! `CLIPSCOUT_` prefix and `_` as section separator:
//! - `CLIPSCOUT_PIPELINE_MAX_CLIP_SECS` → `pipeline.max_clip_secs`
//! - `CLIPSCOUT_PIPELINE_CONCURRENCY` → `pipeline.concurrency`
//! - `CLIPSCOUT_EMBEDDING_ENDPOINT` → `embedding.endpoint`
//! - `CLIPSCOUT_LOGGING_LEVEL` → `logging.level`
//! - etc.

use serde::{Deserialize, Serialize};

/// Top-level clipscout configuration.
///
/// Parsed from `clipscout.toml` or constructed programmatically.
/// Environment variables with the `CLIPSCOUT_` prefix override TOML values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClipscoutConfig {
    /// Pipeline limits and dedup settings.
    #[serde(default)]
    pub pipeline: PipelineConfig,
    /// Search collaborator settings.
    #[serde(default)]
    pub search: SearchConfig,
    /// Download collaborator settings.
    #[serde(default)]
    pub download: DownloadConfig,
    /// Trim / probe collaborator settings.
    #[serde(default)]
    pub media: MediaConfig,
    /// Embedding collaborator settings.
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    /// Optional text-enhancement collaborator settings.
    #[serde(default)]
    pub enhancer: EnhancerConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Pipeline limits. Read-only for the duration of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Maximum length of a returned clip in seconds (default: 120).
    #[serde(default = "default_max_clip_secs")]
    pub max_clip_secs: u64,
    /// Maximum number of seconds downloaded per video (default: 300).
    #[serde(default = "default_download_cap_secs")]
    pub download_cap_secs: u64,
    /// Hits requested per wanted candidate (default: 1.5).
    #[serde(default = "default_oversample_factor")]
    pub oversample_factor: f64,
    /// Fuzzy similarity (0-100) at or above which two descriptions are near-duplicates (default: 90).
    #[serde(default = "default_fuzzy_threshold")]
    pub fuzzy_threshold: u8,
    /// Number of hits processed concurrently (default: 1).
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Per-hit deadline in seconds; 0 disables the deadline (default: 0).
    #[serde(default)]
    pub hit_timeout_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_clip_secs: default_max_clip_secs(),
            download_cap_secs: default_download_cap_secs(),
            oversample_factor: default_oversample_factor(),
            fuzzy_threshold: default_fuzzy_threshold(),
            concurrency: default_concurrency(),
            hit_timeout_secs: 0,
        }
    }
}

fn default_max_clip_secs() -> u64 {
    120
}
fn default_download_cap_secs() -> u64 {
    300
}
fn default_oversample_factor() -> f64 {
    1.5
}
fn default_fuzzy_threshold() -> u8 {
    90
}
fn default_concurrency() -> usize {
    1
}

/// YouTube Data API v3 search settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Name of the env var holding the API key (default: "YOUTUBE_API_KEY").
    #[serde(default = "default_search_api_key_env")]
    pub api_key_env: String,
    /// API base URL.
    #[serde(default = "default_search_api_base")]
    pub api_base: String,
    /// HTTP timeout in seconds (default: 30).
    #[serde(default = "default_http_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_search_api_key_env(),
            api_base: default_search_api_base(),
            timeout_secs: default_http_timeout_secs(),
        }
    }
}

fn default_search_api_key_env() -> String {
    "YOUTUBE_API_KEY".to_string()
}
fn default_search_api_base() -> String {
    "https://www.googleapis.com/youtube/v3".to_string()
}
fn default_http_timeout_secs() -> u64 {
    30
}

/// `yt-dlp` download settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Path to the `yt-dlp` binary (default: "yt-dlp").
    #[serde(default = "default_yt_dlp_path")]
    pub yt_dlp_path: String,
    /// `yt-dlp` format selector (default: "worst").
    #[serde(default = "default_download_format")]
    pub format: String,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            yt_dlp_path: default_yt_dlp_path(),
            format: default_download_format(),
        }
    }
}

fn default_yt_dlp_path() -> String {
    "yt-dlp".to_string()
}
fn default_download_format() -> String {
    "worst".to_string()
}

/// FFmpeg tooling and temp storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Path to the `ffmpeg` binary (default: "ffmpeg").
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: String,
    /// Path to the `ffprobe` binary (default: "ffprobe").
    #[serde(default = "default_ffprobe_path")]
    pub ffprobe_path: String,
    /// Directory for temporary clips. `None` uses the OS temp dir.
    #[serde(default)]
    pub temp_dir: Option<String>,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            ffprobe_path: default_ffprobe_path(),
            temp_dir: None,
        }
    }
}

fn default_ffmpeg_path() -> String {
    "ffmpeg".to_string()
}
fn default_ffprobe_path() -> String {
    "ffprobe".to_string()
}

/// Multimodal embedding service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Base URL of the embedding service (default: "http://127.0.0.1:8091").
    #[serde(default = "default_embedding_endpoint")]
    pub endpoint: String,
    /// HTTP timeout in seconds (default: 120).
    #[serde(default = "default_embedding_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            endpoint: default_embedding_endpoint(),
            timeout_secs: default_embedding_timeout_secs(),
        }
    }
}

fn default_embedding_endpoint() -> String {
    "http://127.0.0.1:8091".to_string()
}
fn default_embedding_timeout_secs() -> u64 {
    120
}

/// OpenAI-compatible description enhancer.
///
/// The enhancer is only wired when `enabled` is true and the env var named by
/// `api_key_env` holds a non-empty key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnhancerConfig {
    /// Whether to use the enhancer when a key is available (default: true).
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Name of the env var holding the API key (default: "OPENAI_API_KEY").
    #[serde(default = "default_enhancer_api_key_env")]
    pub api_key_env: String,
    /// Chat completions base URL (default: "https://api.openai.com/v1").
    #[serde(default = "default_enhancer_endpoint")]
    pub endpoint: String,
    /// Model name (default: "gpt-4o-mini").
    #[serde(default = "default_enhancer_model")]
    pub model: String,
    /// Completion token cap (default: 150).
    #[serde(default = "default_enhancer_max_tokens")]
    pub max_tokens: u32,
    /// Sampling temperature (default: 0.7).
    #[serde(default = "default_enhancer_temperature")]
    pub temperature: f32,
    /// HTTP timeout in seconds (default: 30).
    #[serde(default = "default_http_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EnhancerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key_env: default_enhancer_api_key_env(),
            endpoint: default_enhancer_endpoint(),
            model: default_enhancer_model(),
            max_tokens: default_enhancer_max_tokens(),
            temperature: default_enhancer_temperature(),
            timeout_secs: default_http_timeout_secs(),
        }
    }
}

impl EnhancerConfig {
    /// Returns the API key if the enhancer is enabled and the key env var is set and non-empty.
    pub fn resolve_api_key(&self) -> Option<String> {
        if !self.enabled {
            return None;
        }
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

fn default_true() -> bool {
    true
}
fn default_enhancer_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}
fn default_enhancer_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}
fn default_enhancer_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_enhancer_max_tokens() -> u32 {
    150
}
fn default_enhancer_temperature() -> f32 {
    0.7
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (default: "info").
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format: "text" (default) or "json".
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "text".to_string()
}

impl ClipscoutConfig {
    /// Load configuration from a TOML file, then apply environment variable overrides.
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path, e))?;
        Self::parse_toml(&contents)
    }

    /// Parse configuration from a TOML string, apply env overrides, then validate.
    pub fn parse_toml(toml_str: &str) -> anyhow::Result<Self> {
        let mut config: ClipscoutConfig = toml::from_str(toml_str)
            .map_err(|e| anyhow::anyhow!("Failed to parse TOML config: {}", e))?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Unparseable numeric values are ignored and the TOML value is kept.
    pub fn apply_env_overrides(&mut self) {
        // Pipeline overrides
        if let Some(v) = env_parse("CLIPSCOUT_PIPELINE_MAX_CLIP_SECS") {
            self.pipeline.max_clip_secs = v;
        }
        if let Some(v) = env_parse("CLIPSCOUT_PIPELINE_DOWNLOAD_CAP_SECS") {
            self.pipeline.download_cap_secs = v;
        }
        if let Some(v) = env_parse("CLIPSCOUT_PIPELINE_OVERSAMPLE_FACTOR") {
            self.pipeline.oversample_factor = v;
        }
        if let Some(v) = env_parse("CLIPSCOUT_PIPELINE_FUZZY_THRESHOLD") {
            self.pipeline.fuzzy_threshold = v;
        }
        if let Some(v) = env_parse("CLIPSCOUT_PIPELINE_CONCURRENCY") {
            self.pipeline.concurrency = v;
        }
        if let Some(v) = env_parse("CLIPSCOUT_PIPELINE_HIT_TIMEOUT_SECS") {
            self.pipeline.hit_timeout_secs = v;
        }

        // Search overrides
        if let Ok(v) = std::env::var("CLIPSCOUT_SEARCH_API_KEY_ENV") {
            self.search.api_key_env = v;
        }
        if let Ok(v) = std::env::var("CLIPSCOUT_SEARCH_API_BASE") {
            self.search.api_base = v;
        }
        if let Some(v) = env_parse("CLIPSCOUT_SEARCH_TIMEOUT_SECS") {
            self.search.timeout_secs = v;
        }

        // Download overrides
        if let Ok(v) = std::env::var("CLIPSCOUT_DOWNLOAD_YT_DLP_PATH") {
            self.download.yt_dlp_path = v;
        }
        if let Ok(v) = std::env::var("CLIPSCOUT_DOWNLOAD_FORMAT") {
            self.download.format = v;
        }

        // Media overrides
        if let Ok(v) = std::env::var("CLIPSCOUT_MEDIA_FFMPEG_PATH") {
            self.media.ffmpeg_path = v;
        }
        if let Ok(v) = std::env::var("CLIPSCOUT_MEDIA_FFPROBE_PATH") {
            self.media.ffprobe_path = v;
        }
        if let Ok(v) = std::env::var("CLIPSCOUT_MEDIA_TEMP_DIR") {
            self.media.temp_dir = Some(v);
        }

        // Embedding overrides
        if let Ok(v) = std::env::var("CLIPSCOUT_EMBEDDING_ENDPOINT") {
            self.embedding.endpoint = v;
        }
        if let Some(v) = env_parse("CLIPSCOUT_EMBEDDING_TIMEOUT_SECS") {
            self.embedding.timeout_secs = v;
        }

        // Enhancer overrides
        if let Some(v) = env_parse_bool("CLIPSCOUT_ENHANCER_ENABLED") {
            self.enhancer.enabled = v;
        }
        if let Ok(v) = std::env::var("CLIPSCOUT_ENHANCER_API_KEY_ENV") {
            self.enhancer.api_key_env = v;
        }
        if let Ok(v) = std::env::var("CLIPSCOUT_ENHANCER_ENDPOINT") {
            self.enhancer.endpoint = v;
        }
        if let Ok(v) = std::env::var("CLIPSCOUT_ENHANCER_MODEL") {
            self.enhancer.model = v;
        }
        if let Some(v) = env_parse("CLIPSCOUT_ENHANCER_MAX_TOKENS") {
            self.enhancer.max_tokens = v;
        }
        if let Some(v) = env_parse("CLIPSCOUT_ENHANCER_TEMPERATURE") {
            self.enhancer.temperature = v;
        }
        if let Some(v) = env_parse("CLIPSCOUT_ENHANCER_TIMEOUT_SECS") {
            self.enhancer.timeout_secs = v;
        }

        // Logging overrides
        if let Ok(v) = std::env::var("CLIPSCOUT_LOGGING_LEVEL") {
            self.logging.level = v;
        }
        if let Ok(v) = std::env::var("CLIPSCOUT_LOGGING_FORMAT") {
            self.logging.format = v;
        }
    }

    /// Validate the configuration, returning a descriptive error on the first problem found.
    pub fn validate(&self) -> anyhow::Result<()> {
        // --- Pipeline validation ---
        if self.pipeline.max_clip_secs == 0 {
            anyhow::bail!(
                "pipeline.max_clip_secs must be > 0 (got 0). Set it in clipscout.toml or via CLIPSCOUT_PIPELINE_MAX_CLIP_SECS env var."
            );
        }
        if self.pipeline.download_cap_secs == 0 {
            anyhow::bail!(
                "pipeline.download_cap_secs must be > 0 (got 0). Set it in clipscout.toml or via CLIPSCOUT_PIPELINE_DOWNLOAD_CAP_SECS env var."
            );
        }
        if !self.pipeline.oversample_factor.is_finite() || self.pipeline.oversample_factor < 1.0 {
            anyhow::bail!(
                "pipeline.oversample_factor must be >= 1.0 (got {}). Set it via CLIPSCOUT_PIPELINE_OVERSAMPLE_FACTOR env var.",
                self.pipeline.oversample_factor
            );
        }
        if self.pipeline.fuzzy_threshold > 100 {
            anyhow::bail!(
                "pipeline.fuzzy_threshold must be in 0..=100 (got {}). Set it via CLIPSCOUT_PIPELINE_FUZZY_THRESHOLD env var.",
                self.pipeline.fuzzy_threshold
            );
        }
        if self.pipeline.concurrency == 0 {
            anyhow::bail!(
                "pipeline.concurrency must be > 0 (got 0). Set it via CLIPSCOUT_PIPELINE_CONCURRENCY env var."
            );
        }

        // --- Collaborator validation ---
        let required = [
            ("search.api_base", &self.search.api_base),
            ("search.api_key_env", &self.search.api_key_env),
            ("download.yt_dlp_path", &self.download.yt_dlp_path),
            ("download.format", &self.download.format),
            ("media.ffmpeg_path", &self.media.ffmpeg_path),
            ("media.ffprobe_path", &self.media.ffprobe_path),
            ("embedding.endpoint", &self.embedding.endpoint),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                anyhow::bail!("{} must not be empty.", field);
            }
        }
        if self.enhancer.enabled && self.enhancer.endpoint.trim().is_empty() {
            anyhow::bail!("enhancer.endpoint must not be empty when enhancer.enabled = true.");
        }

        // --- Logging validation ---
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            anyhow::bail!(
                "logging.level must be one of: {} (got '{}').",
                valid_log_levels.join(", "),
                self.logging.level
            );
        }
        let valid_log_formats = ["text", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            anyhow::bail!(
                "logging.format must be one of: {} (got '{}').",
                valid_log_formats.join(", "),
                self.logging.format
            );
        }

        Ok(())
    }

    /// Serialize the current configuration as TOML.
    pub fn example_toml() -> String {
        toml::to_string_pretty(&ClipscoutConfig::default()).unwrap_or_default()
    }

    /// An example configuration file with every default spelled out and documented.
    pub fn example_toml_commented() -> String {
        r#"# =============================================================================
# clipscout configuration
# =============================================================================
# All values shown below are defaults: uncomment and modify as needed.
#
# Environment variables override TOML values. Use the CLIPSCOUT_ prefix:
#   CLIPSCOUT_PIPELINE_CONCURRENCY=4 clipscout search "ocean documentary"

# -----------------------------------------------------------------------------
# [pipeline]: acquisition limits
# -----------------------------------------------------------------------------
[pipeline]
# Longest clip returned, in seconds.
max_clip_secs = 120
# Only the first N seconds of each video are downloaded.
download_cap_secs = 300
# Search hits requested per wanted result.
oversample_factor = 1.5
# Descriptions scoring at or above this (0-100) are near-duplicates.
fuzzy_threshold = 90
# Hits processed at the same time. Output order is unaffected.
concurrency = 1
# Per-hit deadline in seconds (0 = none).
hit_timeout_secs = 0

# -----------------------------------------------------------------------------
# [search]: YouTube Data API v3
# -----------------------------------------------------------------------------
[search]
api_key_env = "YOUTUBE_API_KEY"
api_base = "https://www.googleapis.com/youtube/v3"
timeout_secs = 30

# -----------------------------------------------------------------------------
# [download]: yt-dlp
# -----------------------------------------------------------------------------
[download]
yt_dlp_path = "yt-dlp"
format = "worst"

# -----------------------------------------------------------------------------
# [media]: ffmpeg / ffprobe and temporary storage
# -----------------------------------------------------------------------------
[media]
ffmpeg_path = "ffmpeg"
ffprobe_path = "ffprobe"
# temp_dir = "/var/tmp/clipscout"

# -----------------------------------------------------------------------------
# [embedding]: multimodal embedding service
# -----------------------------------------------------------------------------
[embedding]
endpoint = "http://127.0.0.1:8091"
timeout_secs = 120

# -----------------------------------------------------------------------------
# [enhancer]: optional description enhancer (OpenAI-compatible)
# -----------------------------------------------------------------------------
# Only used when enabled = true AND the env var named by api_key_env is set.
[enhancer]
enabled = true
api_key_env = "OPENAI_API_KEY"
endpoint = "https://api.openai.com/v1"
model = "gpt-4o-mini"
max_tokens = 150
temperature = 0.7
timeout_secs = 30

# -----------------------------------------------------------------------------
# [logging]
# -----------------------------------------------------------------------------
[logging]
# trace, debug, info, warn, error
level = "info"
# "text" or "json"
format = "text"
"#
        .to_string()
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

fn env_parse_bool(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .and_then(|v| match v.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => Some(true),
            "0" | "false" | "no" => Some(false),
            _ => None,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClipscoutConfig::default();
        assert_eq!(config.pipeline.max_clip_secs, 120);
        assert_eq!(config.pipeline.download_cap_secs, 300);
        assert!((config.pipeline.oversample_factor - 1.5).abs() < f64::EPSILON);
        assert_eq!(config.pipeline.fuzzy_threshold, 90);
        assert_eq!(config.pipeline.concurrency, 1);
        assert_eq!(config.pipeline.hit_timeout_secs, 0);
        assert_eq!(config.download.format, "worst");
        assert_eq!(config.enhancer.max_tokens, 150);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "text");
        assert!(config.media.temp_dir.is_none());
    }

    #[test]
    fn test_parse_minimal_toml() {
        let config = ClipscoutConfig::parse_toml("").unwrap();
        assert_eq!(config.pipeline.max_clip_secs, 120);
        assert_eq!(config.embedding.endpoint, "http://127.0.0.1:8091");
    }

    #[test]
    fn test_parse_custom_toml() {
        let toml = r#"
[pipeline]
max_clip_secs = 60
download_cap_secs = 180
oversample_factor = 2.0
fuzzy_threshold = 85
concurrency = 4

[media]
temp_dir = "/tmp/clips"

[enhancer]
enabled = false
"#;
        let config = ClipscoutConfig::parse_toml(toml).unwrap();
        assert_eq!(config.pipeline.max_clip_secs, 60);
        assert_eq!(config.pipeline.download_cap_secs, 180);
        assert!((config.pipeline.oversample_factor - 2.0).abs() < f64::EPSILON);
        assert_eq!(config.pipeline.fuzzy_threshold, 85);
        assert_eq!(config.pipeline.concurrency, 4);
        assert_eq!(config.media.temp_dir.as_deref(), Some("/tmp/clips"));
        assert!(!config.enhancer.enabled);
    }

    #[test]
    fn test_invalid_max_clip_secs() {
        let toml = r#"
[pipeline]
max_clip_secs = 0
"#;
        let err = ClipscoutConfig::parse_toml(toml).unwrap_err().to_string();
        assert!(err.contains("pipeline.max_clip_secs"));
    }

    #[test]
    fn test_invalid_oversample_factor() {
        let toml = r#"
[pipeline]
oversample_factor = 0.5
"#;
        let err = ClipscoutConfig::parse_toml(toml).unwrap_err().to_string();
        assert!(err.contains("pipeline.oversample_factor"));
        assert!(err.contains("0.5"));
    }

    #[test]
    fn test_invalid_fuzzy_threshold() {
        let toml = r#"
[pipeline]
fuzzy_threshold = 101
"#;
        let err = ClipscoutConfig::parse_toml(toml).unwrap_err().to_string();
        assert!(err.contains("pipeline.fuzzy_threshold"));
    }

    #[test]
    fn test_invalid_concurrency() {
        let toml = r#"
[pipeline]
concurrency = 0
"#;
        let err = ClipscoutConfig::parse_toml(toml).unwrap_err().to_string();
        assert!(err.contains("pipeline.concurrency"));
    }

    #[test]
    fn test_empty_binary_path_rejected() {
        let toml = r#"
[media]
ffmpeg_path = ""
"#;
        let err = ClipscoutConfig::parse_toml(toml).unwrap_err().to_string();
        assert!(err.contains("media.ffmpeg_path"));
    }

    #[test]
    fn test_invalid_log_level() {
        let toml = r#"
[logging]
level = "verbose"
"#;
        let err = ClipscoutConfig::parse_toml(toml).unwrap_err().to_string();
        assert!(err.contains("logging.level"));
        assert!(err.contains("verbose"));
    }

    #[test]
    fn test_invalid_log_format() {
        let toml = r#"
[logging]
format = "xml"
"#;
        let err = ClipscoutConfig::parse_toml(toml).unwrap_err().to_string();
        assert!(err.contains("logging.format"));
    }

    #[test]
    fn test_env_override_hit_timeout() {
        std::env::set_var("CLIPSCOUT_PIPELINE_HIT_TIMEOUT_SECS", "45");
        let mut config = ClipscoutConfig::default();
        config.apply_env_overrides();
        assert_eq!(config.pipeline.hit_timeout_secs, 45);
        std::env::remove_var("CLIPSCOUT_PIPELINE_HIT_TIMEOUT_SECS");
    }

    #[test]
    fn test_env_override_unparseable_number_ignored() {
        std::env::set_var("CLIPSCOUT_PIPELINE_DOWNLOAD_CAP_SECS", "five minutes");
        let mut config = ClipscoutConfig::default();
        config.apply_env_overrides();
        assert_eq!(config.pipeline.download_cap_secs, 300);
        std::env::remove_var("CLIPSCOUT_PIPELINE_DOWNLOAD_CAP_SECS");
    }

    #[test]
    fn test_env_override_enhancer_enabled() {
        std::env::set_var("CLIPSCOUT_ENHANCER_ENABLED", "false");
        let mut config = ClipscoutConfig::default();
        config.apply_env_overrides();
        assert!(!config.enhancer.enabled);
        std::env::remove_var("CLIPSCOUT_ENHANCER_ENABLED");
    }

    #[test]
    fn test_env_override_enhancer_sampling() {
        std::env::set_var("CLIPSCOUT_ENHANCER_TEMPERATURE", "0.2");
        std::env::set_var("CLIPSCOUT_ENHANCER_TIMEOUT_SECS", "12");
        let mut config = ClipscoutConfig::default();
        config.apply_env_overrides();
        assert!((config.enhancer.temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(config.enhancer.timeout_secs, 12);
        std::env::remove_var("CLIPSCOUT_ENHANCER_TEMPERATURE");
        std::env::remove_var("CLIPSCOUT_ENHANCER_TIMEOUT_SECS");
    }

    #[test]
    fn test_enhancer_key_absent() {
        let config = EnhancerConfig {
            api_key_env: "CLIPSCOUT_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            ..Default::default()
        };
        assert!(config.resolve_api_key().is_none());
    }

    #[test]
    fn test_enhancer_key_blank_treated_as_absent() {
        std::env::set_var("CLIPSCOUT_TEST_BLANK_KEY", "   ");
        let config = EnhancerConfig {
            api_key_env: "CLIPSCOUT_TEST_BLANK_KEY".to_string(),
            ..Default::default()
        };
        assert!(config.resolve_api_key().is_none());
        std::env::remove_var("CLIPSCOUT_TEST_BLANK_KEY");
    }

    #[test]
    fn test_enhancer_key_disabled() {
        std::env::set_var("CLIPSCOUT_TEST_DISABLED_KEY", "sk-test");
        let config = EnhancerConfig {
            enabled: false,
            api_key_env: "CLIPSCOUT_TEST_DISABLED_KEY".to_string(),
            ..Default::default()
        };
        assert!(config.resolve_api_key().is_none());
        std::env::remove_var("CLIPSCOUT_TEST_DISABLED_KEY");
    }

    #[test]
    fn test_enhancer_key_present() {
        std::env::set_var("CLIPSCOUT_TEST_PRESENT_KEY", "sk-test");
        let config = EnhancerConfig {
            api_key_env: "CLIPSCOUT_TEST_PRESENT_KEY".to_string(),
            ..Default::default()
        };
        assert_eq!(config.resolve_api_key().as_deref(), Some("sk-test"));
        std::env::remove_var("CLIPSCOUT_TEST_PRESENT_KEY");
    }

    #[test]
    fn test_example_toml_roundtrip() {
        let example = ClipscoutConfig::example_toml();
        assert!(example.contains("max_clip_secs"));
        let _config = ClipscoutConfig::parse_toml(&example).unwrap();
    }

    #[test]
    fn test_example_toml_commented() {
        let commented = ClipscoutConfig::example_toml_commented();
        for section in [
            "[pipeline]",
            "[search]",
            "[download]",
            "[media]",
            "[embedding]",
            "[enhancer]",
            "[logging]",
        ] {
            assert!(commented.contains(section), "missing {section}");
        }
        let config = ClipscoutConfig::parse_toml(&commented).unwrap();
        assert_eq!(config.pipeline.fuzzy_threshold, 90);
    }
}
