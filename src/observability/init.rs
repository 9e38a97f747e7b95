//! Subscriber assembly.

use super::exporter::{tracer_provider, SERVICE_NAME};
use super::file_writer::RotatingFile;
use crate::domain::error::{KnowledgeFileError, Result};
use crate::Config;
use opentelemetry::trace::TracerProvider as _;
use std::sync::Arc;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "info";

/// Resolves the event filter: configured `trace_level`, then `RUST_LOG`,
/// then `info`.
///
/// # Errors
///
/// Returns [`KnowledgeFileError::Config`] if `trace_level` is not a valid
/// filter directive.
pub fn env_filter(config: &Config) -> Result<EnvFilter> {
    match config.trace_level.as_deref() {
        Some(level) => EnvFilter::try_new(level)
            .map_err(|e| KnowledgeFileError::Config(format!("invalid trace_level {level:?}: {e}"))),
        None => Ok(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))),
    }
}

/// Installs the global subscriber.
///
/// Events go to stderr. With `trace_file` set, finished spans are also
/// exported to that file as JSON lines; its parent directory is created if
/// missing.
///
/// Only the first successful call installs anything; later calls return
/// `Ok(())` and leave the existing subscriber in place.
///
/// # Errors
///
/// Returns an error for an invalid `trace_level` or when the trace file's
/// directory cannot be created.
///
/// # Example
///
/// ```rust
/// use knowledge_file::observability::init_tracing;
/// use knowledge_file::Config;
///
/// let config = Config {
///     trace_level: Some("debug".to_string()),
///     ..Default::default()
/// };
/// init_tracing(&config).unwrap();
/// tracing::debug!("tracing is active");
/// ```
pub fn init_tracing(config: &Config) -> Result<()> {
    let filter = env_filter(config)?;

    let otel_layer = match &config.trace_file {
        Some(path) => {
            if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
                std::fs::create_dir_all(dir)?;
            }
            let provider = tracer_provider(Arc::new(RotatingFile::new(path.clone())));
            Some(OpenTelemetryLayer::new(provider.tracer(SERVICE_NAME)))
        }
        None => None,
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true);

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .with(otel_layer)
        .try_init();

    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn configured_level_wins() {
        let config = Config {
            trace_level: Some("knowledge_file=trace".to_string()),
            ..Config::default()
        };
        let filter = env_filter(&config).unwrap();
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::TRACE));
    }

    #[test]
    fn invalid_level_is_a_config_error() {
        let config = Config {
            trace_level: Some("knowledge_file=loudest".to_string()),
            ..Config::default()
        };
        assert!(matches!(env_filter(&config), Err(KnowledgeFileError::Config(_))));
    }

    #[test]
    fn second_init_is_harmless() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            trace_level: Some("debug".to_string()),
            trace_file: Some(dir.path().join("nested").join("spans.jsonl")),
            ..Config::default()
        };

        init_tracing(&config).unwrap();
        init_tracing(&config).unwrap();
        assert!(dir.path().join("nested").is_dir());
    }
}
