//! Structured logging infrastructure for EpiFig

use crate::error::{EpiFigError, Result};
use serde::{Deserialize, Serialize};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Configuration for the logging system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "epifig_data=debug")
    pub level: String,
    /// Compact single-line output instead of the pretty multi-line format
    pub compact: bool,
    /// Optional file path for log output
    pub file_path: Option<String>,
    /// Whether to emit span open/close events
    pub include_spans: bool,
    /// Whether to include target module information
    pub include_targets: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            compact: false,
            file_path: None,
            include_spans: false,
            include_targets: true,
        }
    }
}

impl LoggingConfig {
    /// Build the level filter, falling back to `info` when the directive is invalid
    pub fn env_filter(&self) -> Result<EnvFilter> {
        EnvFilter::try_new(&self.level)
            .or_else(|_| EnvFilter::try_new("info"))
            .map_err(|e| EpiFigError::config_with_source("Invalid log filter", e))
    }
}

/// Initialize the tracing subscriber with the given configuration.
///
/// Logs go to stderr so that figures written to stdout stay machine-readable.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let env_filter = config.env_filter()?;

    let span_events = if config.include_spans {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let registry = tracing_subscriber::registry().with(env_filter);
    let layer = fmt::layer()
        .with_span_events(span_events)
        .with_target(config.include_targets);

    let outcome = match (&config.file_path, config.compact) {
        (Some(path), compact) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            let layer = layer.with_ansi(false).with_writer(file);
            if compact {
                registry.with(layer.compact()).try_init()
            } else {
                registry.with(layer.pretty()).try_init()
            }
        }
        (None, true) => registry
            .with(layer.compact().with_writer(std::io::stderr))
            .try_init(),
        (None, false) => registry
            .with(layer.pretty().with_writer(std::io::stderr))
            .try_init(),
    };

    outcome.map_err(|e| EpiFigError::config_with_source("Logging already initialized", e))
}

/// Initialize logging with default configuration
pub fn init_default_logging() -> Result<()> {
    init_logging(&LoggingConfig::default())
}
