//! Feature source abstraction.
//!
//! A [`Source`] retrieves the features intersecting one tile from a backend
//! data store and returns them as a GeoJSON feature collection. Each backend
//! implements the single [`Source::get_features`] operation; nothing else is
//! shared between backends, so any implementor is substitutable behind an
//! `Arc<dyn Source>`.
//!
//! # Example
//!
//! ```ignore
//! use geofeed::source::{RequestContext, Source};
//! use geofeed::tile::TileRequest;
//!
//! let ctx = RequestContext::new().with_timeout(Duration::from_secs(30));
//! let request = TileRequest::new(12, 1205, 1539)?;
//! let collection = layer.source().get_features(&ctx, &request).await?;
//! ```

mod context;
pub mod elasticsearch;
mod error;
pub mod postgis;

pub use context::{RequestContext, ScopedContext};
pub use error::SourceError;

use std::future::Future;
use std::pin::Pin;

use geojson::FeatureCollection;

use crate::tile::TileRequest;

/// Boxed future type for dyn-compatible async methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Retrieval contract implemented by every backend.
///
/// Sources are built once at startup and shared read-only between
/// concurrent requests, so implementations must be `Send + Sync` and must
/// not mutate shared state while retrieving.
pub trait Source: Send + Sync {
    /// Retrieve the features intersecting the tile in `request`.
    ///
    /// The retrieval observes `ctx` for cancellation and deadlines. On error
    /// no partial collection is returned.
    fn get_features<'a>(
        &'a self,
        ctx: &'a RequestContext,
        request: &'a TileRequest,
    ) -> BoxFuture<'a, Result<FeatureCollection, SourceError>>;

    /// Short backend name for logging.
    fn name(&self) -> &str;
}
