//! Layer construction and lifecycle.
//!
//! A [`Layer`] binds a name and zoom range to exactly one feature
//! [`Source`](crate::source::Source). Layers are built once at startup from a
//! [`LayerConfig`]; configuration errors surface here, before any tile is
//! served, and never per request.
//!
//! # Example
//!
//! ```ignore
//! use geofeed::layer::{Layer, LayerConfig};
//!
//! let config: LayerConfig = serde_json::from_str(&std::fs::read_to_string("layer.json")?)?;
//! let layer = Layer::create(&config).await?;
//!
//! let features = layer.source().get_features(&ctx, &request).await?;
//! ```

mod builder;
mod config;
mod error;

pub use builder::{DefaultSourceFactory, Layer, SourceFactory};
pub use config::{BackendConfig, LayerConfig, SourceConfig, DEFAULT_MAXZOOM};
pub use error::LayerError;
