//! Coordinate conversion module
//!
//! Converts Web Mercator tile coordinates (zoom/x/y, XYZ scheme with y growing
//! southward) into the geographic rectangle a tile covers.

mod types;

pub use types::{CoordError, TileBounds, MAX_LAT, MAX_ZOOM, MIN_LAT};

use std::f64::consts::PI;

/// Converts a tile corner to geographic coordinates.
///
/// Returns the latitude/longitude of the tile's northwest corner. Passing
/// `x + 1` / `y + 1` yields the opposite corners, which is how
/// [`tile_bounds`] derives the full rectangle.
#[inline]
pub fn tile_to_lat_lon(zoom: u8, x: u32, y: u32) -> (f64, f64) {
    let n = 2.0_f64.powi(zoom as i32);

    // Convert tile X coordinate to longitude
    let lon = x as f64 / n * 360.0 - 180.0;

    // Convert tile Y coordinate to latitude using inverse Web Mercator
    let lat_rad = (PI * (1.0 - 2.0 * y as f64 / n)).sinh().atan();
    let lat = lat_rad * 180.0 / PI;

    (lat, lon)
}

/// Computes the geographic bounding rectangle of a tile.
///
/// # Errors
///
/// Returns `CoordError` if the zoom exceeds [`MAX_ZOOM`] or `x`/`y` lie
/// outside `0..2^zoom`.
pub fn tile_bounds(zoom: u8, x: u32, y: u32) -> Result<TileBounds, CoordError> {
    if zoom > MAX_ZOOM {
        return Err(CoordError::InvalidZoom(zoom));
    }
    let max_coord = 1u32 << zoom;
    if x >= max_coord || y >= max_coord {
        return Err(CoordError::OutOfGrid { zoom, x, y });
    }

    let (top, left) = tile_to_lat_lon(zoom, x, y);
    let (bottom, right) = tile_to_lat_lon(zoom, x + 1, y + 1);

    Ok(TileBounds {
        left,
        right,
        top,
        bottom,
    })
}
