//! Logging - tracing subscriber setup for binaries
//!
//! The library only emits `tracing` events; installing a subscriber is the
//! caller's job.

use std::str::FromStr;
use thiserror::Error;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Invalid log level '{0}' (expected trace, debug, info, warn or error)")]
    InvalidLevel(String),

    #[error("Failed to install subscriber: {0}")]
    Init(String),
}

/// Install a stderr subscriber. `RUST_LOG` wins over `level` when set.
pub fn init_logging(level: &str) -> Result<(), LoggingError> {
    let level = Level::from_str(level).map_err(|_| LoggingError::InvalidLevel(level.to_string()))?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("pdfexport_core={}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init()
        .map_err(|e| LoggingError::Init(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_unknown_level() {
        assert!(matches!(init_logging("loud"), Err(LoggingError::InvalidLevel(_))));
    }
}
