#![forbid(unsafe_code)]

//! Subscriber setup for the binary.

use std::io;

use cspdash_core::{DashError, Result};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogOptions {
    /// Explicit directive from the command line.
    pub level: Option<String>,
    pub json: bool,
}

/// Pick the filter: the command line wins, then `RUST_LOG`, then `fallback`.
pub fn build_filter(level: Option<&str>, fallback: &str) -> Result<EnvFilter> {
    if let Some(level) = level {
        return EnvFilter::try_new(level)
            .map_err(|err| DashError::invalid(format!("bad --log-level '{level}': {err}")));
    }
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(fallback)
            .map_err(|err| DashError::invalid(format!("bad log_filter '{fallback}': {err}"))),
    }
}

/// Install the global subscriber writing to stderr.
pub fn init(options: &LogOptions, fallback: &str) -> Result<()> {
    let filter = build_filter(options.level.as_deref(), fallback)?;
    let registry = tracing_subscriber::registry().with(filter);
    let installed = if options.json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(io::stderr))
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .try_init()
    };
    installed.map_err(|err| DashError::invalid(format!("logging already initialised: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_level_wins() {
        let filter = build_filter(Some("debug"), "warn").unwrap();
        assert_eq!(filter.to_string(), "debug");
    }

    #[test]
    fn invalid_level_is_an_argument_error() {
        let err = build_filter(Some("cspdash=loud"), "info").unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
