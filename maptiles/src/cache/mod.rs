//! Disk cache for downloaded tiles.
//!
//! Tiles are cached as the raw bytes the server sent, one file per tile,
//! at a path derived from the source's cache path template:
//!
//! ```text
//! <cache_dir>/<source>/<cache_path with {x}, {y}, {z} substituted>
//! ```

mod disk;
mod path;

pub use disk::{CacheError, DiskTileCache};
pub use path::{cache_file_path, expand_template};

use std::path::PathBuf;

/// Default cache directory: `<platform cache dir>/maptiles/tiles`.
///
/// Falls back to a relative `maptiles-cache` directory on platforms without
/// a cache directory.
pub fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .map(|dir| dir.join("maptiles").join("tiles"))
        .unwrap_or_else(|| PathBuf::from("maptiles-cache"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_cache_dir_ends_with_tiles() {
        let dir = default_cache_dir();
        assert!(dir.ends_with("tiles"));
    }
}
