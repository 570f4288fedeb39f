//! Tracing and logging setup
//!
//! `RUST_LOG` wins when set; otherwise the configured level applies.

use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::config::Environment;

/// Tracing configuration options
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Default level when `RUST_LOG` is unset
    pub level: Level,
    /// Emit one JSON object per line
    pub json: bool,
    /// Log span open/close
    pub span_events: bool,
    /// Include file and line numbers
    pub file_line: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            json: false,
            span_events: false,
            file_line: true,
        }
    }
}

impl TracingConfig {
    /// Human readable output with debug logging
    pub fn development() -> Self {
        Self {
            level: Level::DEBUG,
            json: false,
            span_events: true,
            file_line: true,
        }
    }

    /// JSON output for log shippers
    pub fn production() -> Self {
        Self {
            level: Level::INFO,
            json: true,
            span_events: false,
            file_line: false,
        }
    }

    pub fn for_environment(env: Environment) -> Self {
        match env {
            Environment::Development => Self::development(),
            Environment::Staging | Environment::Production => Self::production(),
        }
    }

    fn span_events(&self) -> FmtSpan {
        if self.span_events {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        }
    }
}

/// Initialize the global subscriber
///
/// # Panics
/// Panics if a global subscriber is already set.
pub fn init_tracing(config: TracingConfig) {
    if let Err(err) = try_init_tracing(config) {
        panic!("{err}");
    }
}

/// Initialize the global subscriber, failing instead of panicking if one is
/// already installed (tests call this repeatedly).
pub fn try_init_tracing(config: TracingConfig) -> Result<(), TracingError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.to_string()));

    let json_layer = config.json.then(|| {
        fmt::layer()
            .json()
            .with_file(config.file_line)
            .with_line_number(config.file_line)
            .with_span_events(config.span_events())
    });
    let pretty_layer = (!config.json).then(|| {
        fmt::layer()
            .with_file(config.file_line)
            .with_line_number(config.file_line)
            .with_span_events(config.span_events())
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(pretty_layer)
        .try_init()
        .map_err(|_| TracingError::AlreadyInitialized)
}

/// Tracing initialization errors
#[derive(Debug, thiserror::Error)]
pub enum TracingError {
    #[error("Tracing subscriber already initialized")]
    AlreadyInitialized,
}
