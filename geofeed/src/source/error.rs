//! Retrieval error types.

use thiserror::Error;

/// Errors that can occur while building a source or retrieving features.
///
/// Every variant other than `Connection` and `UnsupportedBackend` aborts the
/// in-flight retrieval; no partial collection is ever returned alongside one.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SourceError {
    /// Backend client construction or connectivity check failed.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Backend rejected or failed a query.
    #[error("Query failed: {0}")]
    Query(String),

    /// The per-page budget or the caller's deadline expired.
    #[error("Deadline exceeded while waiting for the backend")]
    DeadlineExceeded,

    /// The caller cancelled the request.
    #[error("Request cancelled")]
    Cancelled,

    /// The configured geometry path does not resolve in a document.
    #[error("Couldn't find geometry at field: {field}")]
    FieldNotFound { field: String },

    /// A geometry or aggregation payload could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),

    /// The configured backend has no driver in this build.
    #[error("Unsupported backend: {0}")]
    UnsupportedBackend(&'static str),
}

impl SourceError {
    /// Returns true if the error came from the caller's context rather than
    /// from the backend or the data.
    pub fn is_interrupted(&self) -> bool {
        matches!(self, SourceError::Cancelled | SourceError::DeadlineExceeded)
    }
}
