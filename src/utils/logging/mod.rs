//! Logging setup
//!
//! `RUST_LOG` wins over the configured level when it is set.

use crate::config::LoggingSettings;
use crate::utils::error::{ConsoleError, Result};
use tracing_subscriber::EnvFilter;

/// Build the filter for the configured level
pub fn env_filter(settings: &LoggingSettings) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.level))
}

/// Install the global subscriber
pub fn init_logging(settings: &LoggingSettings) -> Result<()> {
    let filter = env_filter(settings);

    let installed = if settings.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_current_span(false)
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_thread_ids(false)
            .with_writer(std::io::stderr)
            .try_init()
    };

    installed.map_err(|e| ConsoleError::config(format!("Failed to initialize logging: {}", e)))
}
