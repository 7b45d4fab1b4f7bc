//! MapTiles - slippy-map tile fetching and caching for map views
//!
//! This library procures raster map tiles for a panning and zooming map
//! display. Tiles are looked up without ever blocking the render loop,
//! downloaded by a pool of worker threads, cached on disk and evicted from
//! memory when no longer used.
//!
//! # High-Level API
//!
//! The [`tiles::MapTiles`] facade is the entry point:
//!
//! ```ignore
//! use maptiles::source::MapSourceConfig;
//! use maptiles::tiles::{MapTiles, MapTilesConfig, TileStatus};
//! use std::time::Instant;
//!
//! let mut tiles = MapTiles::new(MapSourceConfig::openstreetmap(), MapTilesConfig::default())?;
//!
//! // Once per frame
//! tiles.update(Instant::now());
//! match tiles.get_tile(1, 1, 2) {
//!     TileStatus::Available(pixels) => draw(&pixels),
//!     other => draw_placeholder(other.placeholder()),
//! }
//! ```

pub mod builtin;
pub mod cache;
pub mod codec;
pub mod coord;
pub mod logging;
pub mod provider;
pub mod source;
pub mod tiles;

/// Version of the MapTiles library and CLI.
///
/// This is synchronized across all components in the workspace.
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
