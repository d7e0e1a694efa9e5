//! Logging setup shared by the dojo binaries.
//!
//! Library crates only emit `tracing` events; installing a subscriber is left
//! to the process entry point, which calls [`init`] once.

#![warn(missing_docs, clippy::pedantic)]

use anyhow::{Context, Result};
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Settings for the global subscriber.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TelemetryConfig {
    default_level: Level,
    with_target: bool,
    compact: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            default_level: Level::INFO,
            with_target: false,
            compact: true,
        }
    }
}

impl TelemetryConfig {
    /// Level used when `RUST_LOG` is unset.
    #[must_use]
    pub fn with_default_level(mut self, level: Level) -> Self {
        self.default_level = level;
        self
    }

    /// Shows the module path of each event.
    #[must_use]
    pub fn with_target(mut self, with_target: bool) -> Self {
        self.with_target = with_target;
        self
    }

    /// Switches between the compact and the full line format.
    #[must_use]
    pub fn compact(mut self, compact: bool) -> Self {
        self.compact = compact;
        self
    }

    /// Returns the level used when `RUST_LOG` is unset.
    #[must_use]
    pub const fn default_level(&self) -> Level {
        self.default_level
    }
}

/// Builds the event filter: `RUST_LOG` when set, otherwise the default level.
///
/// # Errors
///
/// Returns an error if `RUST_LOG` holds an unparsable directive.
pub fn env_filter(config: &TelemetryConfig) -> Result<EnvFilter> {
    match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(directives) if !directives.trim().is_empty() => EnvFilter::try_new(&directives)
            .with_context(|| format!("invalid {} directives `{directives}`", EnvFilter::DEFAULT_ENV)),
        _ => Ok(EnvFilter::new(config.default_level.as_str().to_ascii_lowercase())),
    }
}

/// Installs the global `fmt` subscriber.
///
/// # Errors
///
/// Returns an error if the filter cannot be built or a global subscriber is
/// already installed.
pub fn init(config: &TelemetryConfig) -> Result<()> {
    let filter = env_filter(config)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.with_target);

    let installed = if config.compact {
        builder.compact().try_init()
    } else {
        builder.try_init()
    };

    installed.map_err(|err| anyhow::anyhow!("failed to install tracing subscriber: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_compact_info() {
        let config = TelemetryConfig::default();
        assert_eq!(config.default_level(), Level::INFO);
        assert!(config.compact);
        assert!(!config.with_target);
    }

    #[test]
    fn builder_overrides_fields() {
        let config = TelemetryConfig::default()
            .with_default_level(Level::DEBUG)
            .with_target(true)
            .compact(false);
        assert_eq!(config.default_level(), Level::DEBUG);
        assert!(config.with_target);
        assert!(!config.compact);
    }

    #[test]
    fn second_init_fails() {
        let config = TelemetryConfig::default();
        let _ = init(&config);
        assert!(init(&config).is_err());
    }
}
