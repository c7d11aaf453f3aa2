//! Tracing initialisation for host applications
//!
//! The engine only emits `tracing` events; installing a subscriber is the
//! host's decision. This helper gives hosts the same setup the workspace uses
//! everywhere: `RUST_LOG` wins, otherwise the configured level.

use crate::config::LoggingConfig;
use crate::{Error, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Build the filter for a logging configuration
pub fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.level)
        .map_err(|e| Error::InvalidInput(format!("log level '{}': {}", config.level, e)))
}

/// Install a global fmt subscriber
///
/// Returns an error (instead of panicking) when a global subscriber is
/// already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = build_filter(config)?;
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .map_err(|e| Error::Config(format!("tracing already initialised: {}", e)))
}
