//! geofeed - map-tile feature retrieval from spatial search backends
//!
//! Given a tile request (zoom, column, row), a layer's [`source::Source`]
//! queries its backend for everything intersecting the tile and returns a
//! GeoJSON feature collection. The Elasticsearch backend either scrolls
//! through raw documents or, when metrics are configured, aggregates them
//! into geohash cells.
//!
//! # Modules
//!
//! - [`coord`]: slippy-map tile math
//! - [`tile`]: validated tile requests
//! - [`document`]: dotted-path access into JSON documents
//! - [`feature`]: document-to-feature mapping
//! - [`source`]: the retrieval contract and its backends
//! - [`layer`]: layer configuration and construction
//! - [`logging`]: tracing subscriber setup

pub mod coord;
pub mod document;
pub mod feature;
pub mod layer;
pub mod logging;
pub mod source;
pub mod tile;
