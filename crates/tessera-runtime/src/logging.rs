#![forbid(unsafe_code)]

//! Global `tracing` subscriber setup for hosts.
//!
//! Library code only emits spans and events. Hosts call [`init`] once at
//! startup to route them to stderr, optionally as JSON lines.
//!
//! The filter comes from `RUST_LOG` when it is set and parses, otherwise
//! from [`LogConfig::filter`].

use std::fmt;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};

/// Subscriber options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Fallback filter directives. Default: `"info"`.
    pub filter: String,
    /// Emit JSON lines instead of human-readable text. Default: false.
    pub json: bool,
    /// Ignore `RUST_LOG`. Default: false.
    pub ignore_env: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".into(),
            json: false,
            ignore_env: false,
        }
    }
}

impl LogConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn filter(mut self, directives: impl Into<String>) -> Self {
        self.filter = directives.into();
        self
    }

    #[must_use]
    pub fn json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    #[must_use]
    pub fn ignore_env(mut self, ignore: bool) -> Self {
        self.ignore_env = ignore;
        self
    }

    /// Resolve the filter this config would install.
    pub fn build_filter(&self) -> Result<EnvFilter, LoggingError> {
        if !self.ignore_env {
            if let Ok(filter) = EnvFilter::try_from_default_env() {
                return Ok(filter);
            }
        }
        EnvFilter::try_new(&self.filter).map_err(LoggingError::Filter)
    }
}

/// Errors from installing the global subscriber.
#[derive(Debug)]
pub enum LoggingError {
    /// The fallback filter directives did not parse.
    Filter(ParseError),
    /// A global subscriber was already installed.
    Install(TryInitError),
}

impl fmt::Display for LoggingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Filter(e) => write!(f, "invalid log filter: {e}"),
            Self::Install(e) => write!(f, "failed to install subscriber: {e}"),
        }
    }
}

impl std::error::Error for LoggingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Filter(e) => Some(e),
            Self::Install(e) => Some(e),
        }
    }
}

/// Install the global subscriber described by `config`.
pub fn init(config: &LogConfig) -> Result<(), LoggingError> {
    let filter = config.build_filter()?;
    let registry = tracing_subscriber::registry().with(filter);
    let installed = if config.json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_target(false))
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .try_init()
    };
    installed.map_err(LoggingError::Install)?;
    tracing::debug!(json = config.json, "logging initialised");
    Ok(())
}
