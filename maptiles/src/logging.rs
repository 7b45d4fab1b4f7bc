//! Logging setup.
//!
//! Log events go to two places:
//! - `maptiles.log` in the log directory, truncated at start
//! - stdout, with colours
//!
//! The level defaults to `info` and can be changed through `RUST_LOG`,
//! e.g. `RUST_LOG=maptiles=debug` to see downloads and worker start/stop.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Name of the log file.
pub const LOG_FILE_NAME: &str = "maptiles.log";

/// Guard that must be kept alive for the duration of logging.
///
/// Dropping this guard will flush and close the log file writer.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
}

/// Install the global tracing subscriber.
///
/// Creates `log_dir` if needed and truncates `log_dir/log_file`.
///
/// # Errors
///
/// Returns error if the directory cannot be created or the file cannot be
/// truncated.
pub fn init_logging(log_dir: &Path, log_file: &str) -> Result<LoggingGuard, io::Error> {
    let log_path = prepare_log_file(log_dir, log_file)?;

    let file_appender = tracing_appender::rolling::never(log_dir, log_file);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .with_thread_names(true)
        .with_target(true);

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stdout)
        .with_ansi(true)
        .with_thread_names(true)
        .compact();

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();

    tracing::debug!(path = %log_path.display(), "Logging initialised");

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

/// Create the log directory and an empty log file.
fn prepare_log_file(log_dir: &Path, log_file: &str) -> Result<PathBuf, io::Error> {
    fs::create_dir_all(log_dir)?;
    let log_path = log_dir.join(log_file);
    fs::write(&log_path, "")?;
    Ok(log_path)
}

/// Default log directory: `~/.maptiles/logs`.
pub fn default_log_dir() -> PathBuf {
    crate::source::config_directory().join("logs")
}
