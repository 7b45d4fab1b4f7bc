//! MapTiles CLI - Command-line interface
//!
//! This binary provides a command-line interface to the MapTiles library:
//! listing the configured map sources, fetching single tiles through the
//! cache-and-download pipeline and writing a default maps.conf.

mod commands;
mod error;
mod runner;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use commands::fetch::FetchArgs;
use error::CliError;
use runner::CliRunner;

#[derive(Parser)]
#[command(name = "maptiles")]
#[command(version = maptiles::VERSION)]
#[command(about = "Fetch and cache slippy-map tiles", long_about = None)]
struct Cli {
    /// Path to maps.conf (default: ~/.maptiles/maps.conf)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the configured map sources
    Sources,

    /// Fetch one tile and save it as an image
    Fetch {
        /// Name of the map source (see `maptiles sources`)
        #[arg(long, default_value = "osm")]
        source: String,

        /// Latitude in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        /// Longitude in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        /// Zoom level
        #[arg(long, default_value = "12")]
        zoom: u8,

        /// Output file path (.png or .jpg)
        #[arg(long)]
        output: PathBuf,

        /// Tile cache directory (default: platform cache dir)
        #[arg(long)]
        cache_dir: Option<PathBuf>,

        /// Seconds to wait for the tile
        #[arg(long, default_value = "30")]
        timeout: u64,
    },

    /// Write a maps.conf with the built-in sources
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        e.exit();
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let runner = CliRunner::new(cli.config)?;

    match cli.command {
        Commands::Sources => commands::sources::run(&runner),
        Commands::Fetch {
            source,
            lat,
            lon,
            zoom,
            output,
            cache_dir,
            timeout,
        } => commands::fetch::run(
            &runner,
            FetchArgs {
                source,
                lat,
                lon,
                zoom,
                output,
                cache_dir,
                timeout: Duration::from_secs(timeout),
            },
        ),
        Commands::InitConfig { force } => commands::init::run(&runner, force),
    }
}
