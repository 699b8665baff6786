//! Logging setup for the `clipscout` binary.
//!
//! Logs always go to stderr so stdout carries only the JSON results.

use anyhow::Context;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use clipscout_config::LoggingConfig;

/// Installs the global subscriber.
///
/// `RUST_LOG` takes precedence over `logging.level`. Output is JSON lines when
/// `logging.format = "json"`, human-readable text otherwise.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    // exactly one of these is Some; a None layer is a no-op
    let (json_layer, text_layer) = if config.format == "json" {
        let json = fmt::layer()
            .json()
            .with_current_span(true)
            .with_writer(std::io::stderr);
        (Some(json), None)
    } else {
        let text = fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_writer(std::io::stderr);
        (None, Some(text))
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .try_init()
        .context("Failed to initialize logging")?;

    tracing::debug!(
        level = config.level.as_str(),
        format = config.format.as_str(),
        "Logging initialized"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_only_once() {
        let config = LoggingConfig {
            level: "warn".to_string(),
            format: "json".to_string(),
        };
        assert!(init_logging(&config).is_ok());
        let err = init_logging(&config).unwrap_err();
        assert!(err.to_string().contains("Failed to initialize logging"));
    }
}
