//! # clipscout
//!
//! Acquires short, described and embedded video clips for text queries.
//!
//! # Configuration
//!
//! Set `CLIPSCOUT_CONFIG` to a TOML config file path, or pass `--config`.
//! Without either, defaults plus `CLIPSCOUT_*` env overrides are used.
//!
//! # CLI Usage
//!
//! ```bash
//! # Collect 8 clips for one query
//! YOUTUBE_API_KEY=... clipscout search "ocean waves"
//!
//! # Several queries, 4 clips each, written to a file without vectors
//! clipscout search "ocean waves" "city timelapse" --count 4 --summary-only -o clips.json
//!
//! # Generate an example config file with inline documentation
//! clipscout --init-config > clipscout.toml
//! ```

mod output;
mod telemetry;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};

use clipscout_config::ClipscoutConfig;
use clipscout_connectors::{
    FfmpegTranscoder, HttpEmbedder, OpenAiEnhancer, TextEnhancer, YouTubeSearch, YtDlpDownloader,
};
use clipscout_extraction::{CandidatePipeline, Collaborators, PipelineOutcome, PipelineSettings};

use crate::output::QueryResult;

/// Video clip acquisition pipeline.
#[derive(Parser, Debug)]
#[command(name = "clipscout")]
#[command(about = "Search, fetch, trim, describe and embed short video clips for text queries")]
#[command(version)]
struct Cli {
    /// Path to clipscout.toml config file.
    /// Can also be set via CLIPSCOUT_CONFIG env var.
    #[arg(short, long, env = "CLIPSCOUT_CONFIG", global = true)]
    config: Option<String>,

    /// Print an example clipscout.toml with documentation and exit.
    #[arg(long)]
    init_config: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the pipeline for one or more queries and print the results as JSON.
    Search {
        /// Queries to search for.
        #[arg(required = true)]
        queries: Vec<String>,

        /// Maximum clips to return per query.
        #[arg(short = 'n', long, default_value_t = 8, value_parser = clap::value_parser!(u64).range(1..))]
        count: u64,

        /// Write results to this file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Omit embedding vectors, reporting only their dimensions.
        #[arg(long)]
        summary_only: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.init_config {
        print!("{}", ClipscoutConfig::example_toml_commented());
        return Ok(());
    }

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let config = load_config(cli.config.as_deref())?;
    telemetry::init_logging(&config.logging)?;

    match command {
        Commands::Search {
            queries,
            count,
            output,
            summary_only,
        } => run_search(&config, &queries, count as usize, output, summary_only).await,
    }
}

fn load_config(path: Option<&str>) -> anyhow::Result<ClipscoutConfig> {
    match path {
        Some(path) => ClipscoutConfig::from_file(path),
        None => {
            let mut config = ClipscoutConfig::default();
            config.apply_env_overrides();
            config.validate()?;
            Ok(config)
        }
    }
}

fn build_pipeline(config: &ClipscoutConfig) -> anyhow::Result<CandidatePipeline> {
    let search = YouTubeSearch::from_config(&config.search)?;
    let embedder = HttpEmbedder::from_config(&config.embedding)?;
    let enhancer = OpenAiEnhancer::from_config(&config.enhancer)?
        .map(|e| Arc::new(e) as Arc<dyn TextEnhancer>);

    match &enhancer {
        Some(_) => tracing::info!(model = config.enhancer.model.as_str(), "Description enhancement enabled"),
        None => tracing::info!(
            "Description enhancement disabled (set {} to enable)",
            config.enhancer.api_key_env
        ),
    }

    let collaborators = Collaborators {
        search: Arc::new(search),
        downloader: Arc::new(YtDlpDownloader::from_config(&config.download)),
        transcoder: Arc::new(FfmpegTranscoder::from_config(&config.media)),
        embedder: Arc::new(embedder),
        enhancer,
    };
    Ok(CandidatePipeline::new(
        PipelineSettings::from_config(config),
        collaborators,
    ))
}

async fn run_search(
    config: &ClipscoutConfig,
    queries: &[String],
    count: usize,
    output: Option<PathBuf>,
    summary_only: bool,
) -> anyhow::Result<()> {
    let pipeline = build_pipeline(config)?;

    let mut outcomes: Vec<(&str, PipelineOutcome)> = Vec::with_capacity(queries.len());
    for query in queries {
        let outcome = pipeline
            .run(query, count)
            .await
            .with_context(|| format!("Pipeline failed for query '{}'", query))?;
        tracing::info!(
            query = query.as_str(),
            candidates = outcome.candidates.len(),
            skipped = outcome.report.skipped.len(),
            "Query complete"
        );
        outcomes.push((query.as_str(), outcome));
    }

    let results: Vec<QueryResult<'_>> = outcomes
        .iter()
        .map(|(query, outcome)| {
            QueryResult::new(query, &outcome.candidates, &outcome.report, summary_only)
        })
        .collect();
    let json = serde_json::to_string_pretty(&results).context("Failed to serialize results")?;

    match output {
        Some(path) => {
            std::fs::write(&path, json)
                .with_context(|| format!("Failed to write results to '{}'", path.display()))?;
            tracing::info!(path = %path.display(), "Results written");
        }
        None => println!("{}", json),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_search() {
        let cli = Cli::try_parse_from([
            "clipscout",
            "search",
            "ocean waves",
            "city timelapse",
            "--count",
            "4",
            "--summary-only",
            "-o",
            "out.json",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Search {
                queries,
                count,
                output,
                summary_only,
            }) => {
                assert_eq!(queries, vec!["ocean waves", "city timelapse"]);
                assert_eq!(count, 4);
                assert_eq!(output, Some(PathBuf::from("out.json")));
                assert!(summary_only);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_search_defaults() {
        let cli = Cli::try_parse_from(["clipscout", "search", "surf"]).unwrap();
        match cli.command {
            Some(Commands::Search { count, output, summary_only, .. }) => {
                assert_eq!(count, 8);
                assert!(output.is_none());
                assert!(!summary_only);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_zero_count() {
        assert!(Cli::try_parse_from(["clipscout", "search", "surf", "--count", "0"]).is_err());
    }

    #[test]
    fn test_parse_requires_query() {
        assert!(Cli::try_parse_from(["clipscout", "search"]).is_err());
    }

    #[test]
    fn test_parse_init_config() {
        let cli = Cli::try_parse_from(["clipscout", "--init-config"]).unwrap();
        assert!(cli.init_config);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clipscout.toml");
        std::fs::write(&path, "[pipeline]\nmax_clip_secs = 60\n").unwrap();

        let config = load_config(path.to_str()).unwrap();
        assert_eq!(config.pipeline.max_clip_secs, 60);
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config(Some("/nonexistent/clipscout.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
