//! Tile request types.
//!
//! A [`TileRequest`] is the explicit, per-request input to every
//! [`Source`](crate::source::Source): the XYZ address of the tile being
//! rendered together with the geographic rectangle it covers.

mod request;

pub use request::TileRequest;
