//! Tile source configuration.
//!
//! A [`MapSourceConfig`] describes where a source's tiles come from, where
//! they are cached and which area and zoom levels it serves. Sources are
//! usually read from `maps.conf`; see [`load_or_create`].

mod config;
mod file;

pub use config::{
    MapSourceConfig, BUILTIN_SCHEME, DEFAULT_DOWNLOAD_TIMEOUT_MS, MAX_DOWNLOAD_TIMEOUT_MS,
    MAX_THREADS, MIN_DOWNLOAD_TIMEOUT_MS, MIN_THREADS, MIN_TILE_SIZE,
};
pub use file::{
    builtin_sources, config_directory, default_maps_conf_path, load_or_create, load_sources,
    save_sources, to_maps_conf_string, SourceConfigError,
};
