//! Tests for coordinate conversion

use super::*;

const EPSILON: f64 = 1e-9;

#[test]
fn test_equator_prime_meridian_is_world_center() {
    let (x, y) = lat_lon_to_tile_xy(0.0, 0.0, 1);
    assert!((x - 1.0).abs() < EPSILON);
    assert!((y - 1.0).abs() < EPSILON);
}

#[test]
fn test_world_corners_at_zoom_zero() {
    assert!(lon_to_tx(MIN_LON, 0).abs() < EPSILON);
    assert!((lon_to_tx(MAX_LON, 0) - 1.0).abs() < EPSILON);

    // ±85.0511° is within a hair of the square Mercator edge
    assert!(lat_to_ty(MAX_LAT, 0).abs() < 1e-5);
    assert!((lat_to_ty(MIN_LAT, 0) - 1.0).abs() < 1e-5);
}

#[test]
fn test_london_at_zoom_10() {
    let (x, y) = lat_lon_to_tile_xy(51.5074_f64.to_radians(), (-0.1278_f64).to_radians(), 10);
    assert_eq!(x as u32, 511);
    assert_eq!(y as u32, 340);
}

#[test]
fn test_tile_for_degrees_new_york() {
    let (x, y) = tile_for_degrees(40.7128, -74.0060, 16);
    assert_eq!(x, 19295);
    assert_eq!(y, 24640);
}

#[test]
fn test_tile_for_degrees_clamps_poles() {
    let (x, y) = tile_for_degrees(90.0, 180.0, 4);
    assert_eq!(x, 15);
    assert_eq!(y, 0);

    let (x, y) = tile_for_degrees(-90.0, -180.0, 4);
    assert_eq!(x, 0);
    assert_eq!(y, 15);
}

#[test]
fn test_roundtrip_within_epsilon() {
    let lats = [-1.48, -0.9, -0.3, 0.0, 0.2, 0.71, 1.1, 1.48];
    let lons = [-3.14, -2.0, -0.5, 0.0, 0.25, 1.7, 3.14];

    for zoom in [0, 1, 5, 10, 15, 19, 22] {
        for &lat in &lats {
            for &lon in &lons {
                let (x, y) = lat_lon_to_tile_xy(lat, lon, zoom);
                let (lat2, lon2) = tile_xy_to_lat_lon(x, y, zoom);
                assert!(
                    (lat2 - lat).abs() < EPSILON,
                    "zoom {}: lat {} came back as {}",
                    zoom,
                    lat,
                    lat2
                );
                assert!(
                    (lon2 - lon).abs() < EPSILON,
                    "zoom {}: lon {} came back as {}",
                    zoom,
                    lon,
                    lon2
                );
            }
        }
    }
}

#[test]
fn test_tile_bounds_are_ordered() {
    let rect = GeoRect::of_tile(3, 5, 4);
    assert!(rect.min_lat < rect.max_lat);
    assert!(rect.min_lon < rect.max_lon);

    // Adjacent tiles share edges
    let east = GeoRect::of_tile(4, 5, 4);
    assert!((rect.max_lon - east.min_lon).abs() < EPSILON);
    let south = GeoRect::of_tile(3, 6, 4);
    assert!((rect.min_lat - south.max_lat).abs() < EPSILON);
}

#[test]
fn test_zoom_zero_tile_covers_world() {
    let rect = GeoRect::of_tile(0, 0, 0);
    assert!((rect.min_lon - MIN_LON).abs() < EPSILON);
    assert!((rect.max_lon - MAX_LON).abs() < EPSILON);
    assert!(rect.intersects(&GeoRect::WORLD));
}

#[test]
fn test_intersects_overlap_and_disjoint() {
    let switzerland = GeoRect::from_degrees(45.8, 47.9, 5.9, 10.6);

    // Zoom 8 tile containing Zurich
    let (x, y) = tile_for_degrees(47.37, 8.54, 8);
    assert!(GeoRect::of_tile(x, y, 8).intersects(&switzerland));

    // Zoom 8 tile containing Sydney
    let (x, y) = tile_for_degrees(-33.87, 151.21, 8);
    assert!(!GeoRect::of_tile(x, y, 8).intersects(&switzerland));
}

#[test]
fn test_touching_edges_do_not_intersect() {
    let west = GeoRect::new(0.0, 0.1, 0.0, 0.1);
    let east = GeoRect::new(0.0, 0.1, 0.1, 0.2);
    assert!(!west.intersects(&east));
    assert!(!east.intersects(&west));
}

#[test]
fn test_world_is_within_world() {
    assert!(GeoRect::WORLD.is_within_world());
    assert!(!GeoRect::from_degrees(-89.0, 10.0, 0.0, 10.0).is_within_world());
}

#[test]
fn test_equatorial_circumference() {
    assert!((WGS84_C - 40_075_016.685_578_49).abs() < 1e-3);
}
