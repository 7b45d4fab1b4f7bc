//! CLI runner for common setup and operations.
//!
//! Encapsulates logging initialization and source loading to reduce
//! duplication across command handlers.

use crate::error::CliError;
use maptiles::logging::{default_log_dir, init_logging, LoggingGuard, LOG_FILE_NAME};
use maptiles::source::{default_maps_conf_path, load_or_create, MapSourceConfig};
use std::path::{Path, PathBuf};
use tracing::info;

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    /// Path of the maps file in use
    maps_conf: PathBuf,
}

impl CliRunner {
    /// Create a new CLI runner, initializing logging.
    ///
    /// `maps_conf` overrides the default `~/.maptiles/maps.conf`.
    pub fn new(maps_conf: Option<PathBuf>) -> Result<Self, CliError> {
        let logging_guard = init_logging(&default_log_dir(), LOG_FILE_NAME)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            logging_guard,
            maps_conf: maps_conf.unwrap_or_else(default_maps_conf_path),
        })
    }

    /// Path of the maps file in use.
    pub fn maps_conf(&self) -> &Path {
        &self.maps_conf
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("MapTiles v{}", maptiles::VERSION);
        info!("MapTiles CLI: {} command", command);
    }

    /// Load the configured sources, writing the default file if missing.
    pub fn load_sources(&self) -> Result<Vec<MapSourceConfig>, CliError> {
        Ok(load_or_create(&self.maps_conf)?)
    }

    /// Find a source by name.
    pub fn find_source(&self, name: &str) -> Result<MapSourceConfig, CliError> {
        select_source(self.load_sources()?, name)
    }
}

/// Pick the source called `name` from `sources`.
pub fn select_source(sources: Vec<MapSourceConfig>, name: &str) -> Result<MapSourceConfig, CliError> {
    let available: Vec<String> = sources.iter().map(|s| s.name.clone()).collect();
    sources
        .into_iter()
        .find(|s| s.name == name)
        .ok_or_else(|| CliError::UnknownSource {
            name: name.to_string(),
            available,
        })
}
