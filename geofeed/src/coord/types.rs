//! Coordinate types and validation errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum zoom level accepted for tile coordinates.
///
/// Keeps `2^zoom` and `x + 1` inside `u32`.
pub const MAX_ZOOM: u8 = 30;

/// Northern limit of the Web Mercator projection in degrees.
pub const MAX_LAT: f64 = 85.05112878;

/// Southern limit of the Web Mercator projection in degrees.
pub const MIN_LAT: f64 = -85.05112878;

/// Errors raised when tile coordinates fall outside the Web Mercator grid.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordError {
    /// Zoom level above [`MAX_ZOOM`].
    #[error("Invalid zoom level: {0} (max {MAX_ZOOM})")]
    InvalidZoom(u8),

    /// Column or row outside `0..2^zoom`.
    #[error("Tile {x}/{y} is outside the grid at zoom {zoom}")]
    OutOfGrid { zoom: u8, x: u32, y: u32 },
}

/// Geographic bounding rectangle of a tile, in degrees.
///
/// `left`/`right` are longitudes, `top`/`bottom` are latitudes with
/// `top > bottom` (north up).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TileBounds {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl TileBounds {
    /// Creates bounds from explicit edges.
    pub fn new(left: f64, right: f64, top: f64, bottom: f64) -> Self {
        Self {
            left,
            right,
            top,
            bottom,
        }
    }
}
