//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::process;

use geofeed::coord::CoordError;
use geofeed::layer::LayerError;
use geofeed::source::SourceError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Layer configuration could not be read or parsed
    Config(String),
    /// Requested tile is outside the grid
    InvalidTile(CoordError),
    /// Failed to build the async runtime
    Runtime(std::io::Error),
    /// Failed to install the Ctrl-C handler
    SignalHandler(ctrlc::Error),
    /// Failed to create the layer
    LayerCreation(LayerError),
    /// Failed to retrieve features
    Fetch(SourceError),
    /// Failed to encode the feature collection as JSON
    Encode(serde_json::Error),
    /// Failed to write output file
    FileWrite { path: String, error: std::io::Error },
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        if let CliError::LayerCreation(LayerError::Source {
            source: SourceError::Connection(_),
            ..
        }) = self
        {
            eprintln!();
            eprintln!("Check that the search backend is running and that");
            eprintln!("host and port in the layer configuration point at it.");
        }

        process::exit(self.exit_code())
    }

    /// Process exit code: 130 when the request was interrupted by Ctrl-C or
    /// its deadline, 1 for every other failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Fetch(e) if e.is_interrupted() => 130,
            _ => 1,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::InvalidTile(e) => write!(f, "Invalid tile: {}", e),
            CliError::Runtime(e) => write!(f, "Failed to start async runtime: {}", e),
            CliError::SignalHandler(e) => write!(f, "Failed to set signal handler: {}", e),
            CliError::LayerCreation(e) => write!(f, "Failed to create layer: {}", e),
            CliError::Fetch(e) => write!(f, "Failed to retrieve features: {}", e),
            CliError::Encode(e) => write!(f, "Failed to encode features: {}", e),
            CliError::FileWrite { path, error } => {
                write!(f, "Failed to write file '{}': {}", path, error)
            }
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::InvalidTile(e) => Some(e),
            CliError::Runtime(e) => Some(e),
            CliError::SignalHandler(e) => Some(e),
            CliError::LayerCreation(e) => Some(e),
            CliError::Fetch(e) => Some(e),
            CliError::Encode(e) => Some(e),
            CliError::FileWrite { error, .. } => Some(error),
            _ => None,
        }
    }
}

impl From<LayerError> for CliError {
    fn from(e: LayerError) -> Self {
        CliError::LayerCreation(e)
    }
}

impl From<SourceError> for CliError {
    fn from(e: SourceError) -> Self {
        CliError::Fetch(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_display_wraps_layer_error() {
        let err = CliError::from(LayerError::NoSources);
        assert_eq!(
            err.to_string(),
            "Failed to create layer: Layers must have a single backend source configured"
        );
        assert!(err.source().is_some());
    }

    #[test]
    fn test_display_file_write() {
        let err = CliError::FileWrite {
            path: "out.json".to_string(),
            error: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.to_string(), "Failed to write file 'out.json': denied");
    }

    #[test]
    fn test_display_encode() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = CliError::Encode(json_err);
        assert!(err.to_string().starts_with("Failed to encode features: "));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_interrupted_fetch_exits_130() {
        let cancelled = CliError::Fetch(SourceError::Cancelled);
        let timed_out = CliError::Fetch(SourceError::DeadlineExceeded);
        assert_eq!(cancelled.exit_code(), 130);
        assert_eq!(timed_out.exit_code(), 130);
    }

    #[test]
    fn test_other_failures_exit_1() {
        let query = CliError::Fetch(SourceError::Query("HTTP 500".to_string()));
        assert_eq!(query.exit_code(), 1);
        assert_eq!(CliError::from(LayerError::NoSources).exit_code(), 1);
        assert_eq!(CliError::Config("bad".to_string()).exit_code(), 1);
    }

    #[test]
    fn test_config_has_no_source() {
        let err = CliError::Config("bad".to_string());
        assert!(err.source().is_none());
    }
}
