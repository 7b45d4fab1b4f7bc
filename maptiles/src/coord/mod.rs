//! Coordinate conversion module
//!
//! Provides conversions between geographic coordinates (latitude/longitude,
//! in radians) and fractional Web Mercator tile coordinates, as used by
//! slippy-map tile servers.
//!
//! Tile coordinates returned here are real numbers: the integer part is the
//! tile index and the fraction is the position within that tile.

mod types;

#[cfg(test)]
mod tests;

pub use types::{GeoRect, MAX_LAT, MAX_LON, MIN_LAT, MIN_LON, WGS84_A, WGS84_C};

use std::f64::consts::PI;

/// Number of tiles along one axis at the given zoom level.
#[inline]
fn tiles_per_axis(zoom: u8) -> f64 {
    2.0_f64.powi(i32::from(zoom))
}

/// Converts a latitude (radians) to a fractional tile y coordinate.
#[inline]
pub fn lat_to_ty(lat: f64, zoom: u8) -> f64 {
    (1.0 - lat.tan().asinh() / PI) / 2.0 * tiles_per_axis(zoom)
}

/// Converts a longitude (radians) to a fractional tile x coordinate.
#[inline]
pub fn lon_to_tx(lon: f64, zoom: u8) -> f64 {
    (lon + PI) / (2.0 * PI) * tiles_per_axis(zoom)
}

/// Converts a fractional tile y coordinate to a latitude (radians).
#[inline]
pub fn ty_to_lat(ty: f64, zoom: u8) -> f64 {
    let n = PI - (2.0 * PI) * ty / tiles_per_axis(zoom);
    n.sinh().atan()
}

/// Converts a fractional tile x coordinate to a longitude (radians).
#[inline]
pub fn tx_to_lon(tx: f64, zoom: u8) -> f64 {
    tx / tiles_per_axis(zoom) * (2.0 * PI) - PI
}

/// Converts geographic coordinates to fractional tile coordinates.
///
/// # Arguments
///
/// * `lat` - Latitude in radians
/// * `lon` - Longitude in radians
/// * `zoom` - Zoom level
///
/// # Returns
///
/// `(x, y)` tile coordinates. Truncating both gives the tile index.
#[inline]
pub fn lat_lon_to_tile_xy(lat: f64, lon: f64, zoom: u8) -> (f64, f64) {
    (lon_to_tx(lon, zoom), lat_to_ty(lat, zoom))
}

/// Converts fractional tile coordinates back to geographic coordinates.
///
/// Integer inputs yield the tile's northwest corner.
#[inline]
pub fn tile_xy_to_lat_lon(x: f64, y: f64, zoom: u8) -> (f64, f64) {
    (ty_to_lat(y, zoom), tx_to_lon(x, zoom))
}

/// Returns the integer tile containing a point given in degrees.
///
/// Inputs are clamped to the Web Mercator limits so the result is always a
/// valid tile index at `zoom`.
pub fn tile_for_degrees(lat_deg: f64, lon_deg: f64, zoom: u8) -> (u32, u32) {
    let lat = lat_deg.to_radians().clamp(MIN_LAT, MAX_LAT);
    let lon = lon_deg.to_radians().clamp(MIN_LON, MAX_LON);
    let (x, y) = lat_lon_to_tile_xy(lat, lon, zoom);
    let max = tiles_per_axis(zoom) - 1.0;
    (x.floor().clamp(0.0, max) as u32, y.floor().clamp(0.0, max) as u32)
}
