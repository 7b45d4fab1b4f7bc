//! Disk tile cache.

use crate::cache::path::cache_file_path;
use crate::provider::FetchError;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{trace, warn};

/// Cache-related errors.
#[derive(Debug, Error)]
pub enum CacheError {
    /// I/O error while reading or writing a cached tile
    #[error("Cache I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl From<CacheError> for FetchError {
    fn from(e: CacheError) -> Self {
        FetchError::Filesystem(e.to_string())
    }
}

/// Disk cache for persistent storage of encoded tiles.
///
/// Files are stored exactly as downloaded. There is no index and no size
/// limit; the file system is the index.
#[derive(Debug, Clone)]
pub struct DiskTileCache {
    /// Cache directory root
    cache_dir: PathBuf,
}

impl DiskTileCache {
    /// Create a disk cache rooted at `cache_dir`.
    ///
    /// The directory is created lazily on the first write.
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    /// Root directory of the cache.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Path of a tile of `source` stored under `template`.
    pub fn tile_path(&self, source: &str, template: &str, tx: u32, ty: u32, tz: u8) -> PathBuf {
        cache_file_path(&self.cache_dir, source, template, tx, ty, tz)
    }

    /// Read a cached tile.
    ///
    /// Returns `Ok(None)` if the file does not exist.
    pub fn read(&self, path: &Path) -> Result<Option<Vec<u8>>, CacheError> {
        match fs::read(path) {
            Ok(data) => {
                trace!(path = %path.display(), bytes = data.len(), "Disk cache hit");
                Ok(Some(data))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(CacheError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Write a tile, creating parent directories as needed.
    ///
    /// The data goes to a `.tmp` sibling first and is renamed into place, so
    /// an interrupted write never leaves a truncated tile at `path`.
    pub fn store(&self, path: &Path, data: &[u8]) -> Result<(), CacheError> {
        let io_err = |source| CacheError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let temp_path = path.with_extension("tmp");
        let written = fs::write(&temp_path, data).and_then(|()| fs::rename(&temp_path, path));
        if let Err(e) = written {
            let _ = fs::remove_file(&temp_path);
            return Err(io_err(e));
        }

        trace!(path = %path.display(), bytes = data.len(), "Tile written to disk cache");
        Ok(())
    }

    /// Delete a cached tile. A missing file is not an error.
    pub fn remove(&self, path: &Path) -> Result<(), CacheError> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => {
                warn!(path = %path.display(), error = %source, "Failed to remove cached tile");
                Err(CacheError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        }
    }
}
