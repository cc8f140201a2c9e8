//! Logging infrastructure for geofeed.
//!
//! Provides structured logging through `tracing`:
//! - Writes to stderr through a non-blocking writer, leaving stdout free for
//!   feature output
//! - Configurable via the `RUST_LOG` environment variable, falling back to a
//!   caller-supplied default filter

use std::io;

use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Default filter directive when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "info";

/// Errors that can occur while installing the global subscriber.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The filter directive could not be parsed.
    #[error("Invalid log filter '{filter}': {reason}")]
    InvalidFilter { filter: String, reason: String },

    /// A global subscriber is already installed.
    #[error("Logging already initialized: {0}")]
    AlreadyInitialized(String),
}

/// Guard that must be kept alive for the duration of logging.
///
/// Dropping this guard flushes the background writer.
pub struct LoggingGuard {
    _writer_guard: WorkerGuard,
}

/// Builds the level filter, preferring `RUST_LOG` over `default_filter`.
pub fn build_filter(default_filter: &str) -> Result<EnvFilter, LoggingError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(default_filter).map_err(|e| LoggingError::InvalidFilter {
        filter: default_filter.to_string(),
        reason: e.to_string(),
    })
}

/// Initialize the logging system.
///
/// # Returns
///
/// LoggingGuard that must be kept alive for logging to work
///
/// # Errors
///
/// Returns an error if the filter is invalid or a subscriber is already set.
pub fn init_logging(default_filter: &str) -> Result<LoggingGuard, LoggingError> {
    let env_filter = build_filter(default_filter)?;

    let (non_blocking, writer_guard) = tracing_appender::non_blocking(io::stderr());
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_target(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .try_init()
        .map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))?;

    Ok(LoggingGuard {
        _writer_guard: writer_guard,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_filter_accepts_directives() {
        // RUST_LOG may be set in the test environment; either way a filter results
        assert!(build_filter("debug").is_ok());
        assert!(build_filter("geofeed=trace,reqwest=warn").is_ok());
    }

    #[test]
    fn test_invalid_filter_error_message() {
        let err = LoggingError::InvalidFilter {
            filter: "=[".to_string(),
            reason: "bad".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid log filter '=[': bad");
    }

    #[test]
    fn test_guard_structure() {
        use tracing_appender::non_blocking::NonBlocking;

        let (non_blocking, guard) = NonBlocking::new(std::io::sink());
        drop(non_blocking);

        let _logging_guard = LoggingGuard {
            _writer_guard: guard,
        };
    }

    // The global subscriber can only be installed once per process, so a
    // second install must fail instead of panicking.
    #[test]
    fn test_second_init_fails() {
        let _guard = init_logging(DEFAULT_FILTER);
        let second = init_logging(DEFAULT_FILTER);

        assert!(matches!(second, Err(LoggingError::AlreadyInitialized(_))));
    }
}
