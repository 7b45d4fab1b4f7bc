//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use maptiles::source::SourceConfigError;
use maptiles::tiles::MapTilesError;
use std::fmt;
use std::path::PathBuf;
use std::process;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// maps.conf could not be read or written
    Config(SourceConfigError),
    /// maps.conf already exists and --force was not given
    ConfigExists(PathBuf),
    /// No source with the requested name
    UnknownSource { name: String, available: Vec<String> },
    /// Invalid command line value
    InvalidArgument(String),
    /// Failed to set up the tile pipeline
    Pipeline(MapTilesError),
    /// The tile could not be obtained
    TileUnavailable { key: String, reason: String },
    /// Failed to write output file
    FileWrite { path: PathBuf, error: String },
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::UnknownSource { available, .. } if !available.is_empty() => {
                eprintln!();
                eprintln!("Available sources: {}", available.join(", "));
            }
            CliError::Config(SourceConfigError::Read(_)) => {
                eprintln!();
                eprintln!("Create a default maps.conf with: maptiles init-config");
            }
            CliError::TileUnavailable { .. } => {
                eprintln!();
                eprintln!("Check the log file for the download error (RUST_LOG=maptiles=debug for details).");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(e) => write!(f, "Configuration error: {}", e),
            CliError::ConfigExists(path) => write!(
                f,
                "Configuration file already exists: {} (use --force to overwrite)",
                path.display()
            ),
            CliError::UnknownSource { name, .. } => write!(f, "Unknown map source '{}'", name),
            CliError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            CliError::Pipeline(e) => write!(f, "Failed to start tile pipeline: {}", e),
            CliError::TileUnavailable { key, reason } => {
                write!(f, "Tile {} is not available: {}", key, reason)
            }
            CliError::FileWrite { path, error } => {
                write!(f, "Failed to write file '{}': {}", path.display(), error)
            }
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(e) => Some(e),
            CliError::Pipeline(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SourceConfigError> for CliError {
    fn from(e: SourceConfigError) -> Self {
        CliError::Config(e)
    }
}

impl From<MapTilesError> for CliError {
    fn from(e: MapTilesError) -> Self {
        CliError::Pipeline(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = CliError::UnknownSource {
            name: "bing".to_string(),
            available: vec!["osm".to_string()],
        };
        assert_eq!(err.to_string(), "Unknown map source 'bing'");

        let err = CliError::TileUnavailable {
            key: "osm-2-1-1".to_string(),
            reason: "download failed".to_string(),
        };
        assert_eq!(err.to_string(), "Tile osm-2-1-1 is not available: download failed");
    }

    #[test]
    fn test_config_exists_mentions_force() {
        let err = CliError::ConfigExists(PathBuf::from("/tmp/maps.conf"));
        assert!(err.to_string().contains("--force"));
    }
}
