//! Tile retrieval request types.

use std::fmt;

use crate::coord::{tile_bounds, CoordError, TileBounds};

/// Request to retrieve the features of one map tile.
///
/// Carries the XYZ tile address and the bounding rectangle derived from it.
/// Requests are immutable and cheap to copy; one is created for each incoming
/// tile and discarded once retrieval completes.
///
/// # Example
///
/// ```
/// use geofeed::tile::TileRequest;
///
/// let request = TileRequest::new(16, 19295, 24640).unwrap();
/// assert_eq!(request.zoom(), 16);
/// assert_eq!(request.x(), 19295);
/// assert_eq!(request.y(), 24640);
/// assert!(request.bounds().left < request.bounds().right);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileRequest {
    /// Zoom level
    zoom: u8,
    /// Tile column (grows eastward)
    x: u32,
    /// Tile row (grows southward)
    y: u32,
    /// Geographic rectangle covered by the tile
    bounds: TileBounds,
}

impl TileRequest {
    /// Create a new tile request, deriving its bounds.
    ///
    /// # Errors
    ///
    /// Returns `CoordError` if the address is outside the Web Mercator grid.
    pub fn new(zoom: u8, x: u32, y: u32) -> Result<Self, CoordError> {
        let bounds = tile_bounds(zoom, x, y)?;
        Ok(Self { zoom, x, y, bounds })
    }

    /// Get the zoom level.
    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    /// Get the tile column.
    pub fn x(&self) -> u32 {
        self.x
    }

    /// Get the tile row.
    pub fn y(&self) -> u32 {
        self.y
    }

    /// Get the geographic bounds of the tile.
    pub fn bounds(&self) -> &TileBounds {
        &self.bounds
    }
}

impl fmt::Display for TileRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.zoom, self.x, self.y)
    }
}
