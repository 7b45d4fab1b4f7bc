//! Coordinate type definitions

use std::f64::consts::PI;

/// Web Mercator valid latitude range, in radians (±85.0511°)
pub const MIN_LAT: f64 = -85.0511 * (PI / 180.0);
pub const MAX_LAT: f64 = 85.0511 * (PI / 180.0);

/// Valid longitude range, in radians
pub const MIN_LON: f64 = -PI;
pub const MAX_LON: f64 = PI;

/// WGS84 semi-major axis in metres
pub const WGS84_A: f64 = 6_378_137.0;

/// Circumference at the equator in metres
pub const WGS84_C: f64 = 2.0 * PI * WGS84_A;

/// A latitude/longitude rectangle in radians.
///
/// Used both for a source's coverage area and for the area a single tile
/// covers on the ground.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoRect {
    /// Southern edge
    pub min_lat: f64,
    /// Northern edge
    pub max_lat: f64,
    /// Western edge
    pub min_lon: f64,
    /// Eastern edge
    pub max_lon: f64,
}

impl GeoRect {
    /// The whole Web Mercator world.
    pub const WORLD: GeoRect = GeoRect {
        min_lat: MIN_LAT,
        max_lat: MAX_LAT,
        min_lon: MIN_LON,
        max_lon: MAX_LON,
    };

    /// Creates a rectangle from its edges (radians).
    pub fn new(min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) -> Self {
        Self {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
        }
    }

    /// Creates a rectangle from edges given in degrees.
    pub fn from_degrees(min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) -> Self {
        Self::new(
            min_lat.to_radians(),
            max_lat.to_radians(),
            min_lon.to_radians(),
            max_lon.to_radians(),
        )
    }

    /// Returns the lat/lon rectangle covered by tile `(tx, ty)` at zoom `tz`.
    ///
    /// Tile rows grow southwards, so the northern edge comes from `ty` and
    /// the southern edge from `ty + 1`.
    pub fn of_tile(tx: u32, ty: u32, tz: u8) -> Self {
        let tx = f64::from(tx);
        let ty = f64::from(ty);
        Self {
            min_lat: super::ty_to_lat(ty + 1.0, tz),
            max_lat: super::ty_to_lat(ty, tz),
            min_lon: super::tx_to_lon(tx, tz),
            max_lon: super::tx_to_lon(tx + 1.0, tz),
        }
    }

    /// Checks whether two rectangles overlap.
    ///
    /// Rectangles that only share an edge do not overlap.
    #[inline]
    pub fn intersects(&self, other: &GeoRect) -> bool {
        self.min_lon < other.max_lon
            && self.max_lon > other.min_lon
            && self.max_lat > other.min_lat
            && self.min_lat < other.max_lat
    }

    /// Checks that all edges lie within the Web Mercator limits.
    pub fn is_within_world(&self) -> bool {
        self.min_lat >= MIN_LAT
            && self.max_lat <= MAX_LAT
            && self.min_lon >= MIN_LON
            && self.max_lon <= MAX_LON
    }
}

impl Default for GeoRect {
    fn default() -> Self {
        Self::WORLD
    }
}
