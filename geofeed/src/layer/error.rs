//! Layer error types.

use thiserror::Error;

use crate::source::SourceError;

/// Errors that can occur while building a layer.
#[derive(Debug, Error)]
pub enum LayerError {
    /// No backend variant is configured.
    #[error("Layers must have a single backend source configured")]
    NoSources,

    /// More than one backend variant is configured.
    #[error("Layers can only support a single backend source")]
    MultipleSources,

    /// `minzoom` is greater than `maxzoom`.
    #[error("Invalid zoom range for layer {layer}: minzoom {minzoom} > maxzoom {maxzoom}")]
    InvalidZoomRange {
        layer: String,
        minzoom: u8,
        maxzoom: u8,
    },

    /// The configured backend could not be built.
    #[error("Failed to create source for layer {layer}: {source}")]
    Source {
        layer: String,
        #[source]
        source: SourceError,
    },
}
