//! Init command - write a default maps.conf.

use maptiles::source::{builtin_sources, save_sources};
use std::path::Path;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Run the init-config command.
pub fn run(runner: &CliRunner, force: bool) -> Result<(), CliError> {
    runner.log_startup("init-config");
    write_default(runner.maps_conf(), force)?;
    println!("Wrote {}", runner.maps_conf().display());
    Ok(())
}

/// Write the built-in sources to `path` unless it exists and `force` is off.
fn write_default(path: &Path, force: bool) -> Result<(), CliError> {
    if path.exists() && !force {
        return Err(CliError::ConfigExists(path.to_path_buf()));
    }
    save_sources(path, &builtin_sources())?;
    Ok(())
}
