//! Fetch command - fetch a single tile through the pipeline and save it.
//!
//! The tile goes through the same path as in a map view: disk cache first,
//! then download, decode and persist. The decoded pixels are written to the
//! output file.

use maptiles::codec::TilePixels;
use maptiles::coord::tile_for_degrees;
use maptiles::tiles::{MapTiles, MapTilesConfig, TileKey, TileStatus};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};
use tracing::info;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the fetch command.
pub struct FetchArgs {
    pub source: String,
    pub lat: f64,
    pub lon: f64,
    pub zoom: u8,
    pub output: PathBuf,
    pub cache_dir: Option<PathBuf>,
    pub timeout: Duration,
}

/// Run the fetch command.
pub fn run(runner: &CliRunner, args: FetchArgs) -> Result<(), CliError> {
    runner.log_startup("fetch");
    validate_position(args.lat, args.lon)?;

    let source = runner.find_source(&args.source)?;
    let (tx, ty) = tile_for_degrees(args.lat, args.lon, args.zoom);
    let key = TileKey::new(source.name.as_str(), tx, ty, args.zoom);

    let mut config = MapTilesConfig::default();
    if let Some(cache_dir) = args.cache_dir {
        config = config.with_cache_dir(cache_dir);
    }

    println!("Fetching tile for:");
    println!("  Location: {}, {}", args.lat, args.lon);
    println!("  Zoom: {}", args.zoom);
    println!("  Tile: x={}, y={} ({})", tx, ty, key);
    println!("  Source: {} ({})", source.title, source.name);
    println!();

    let zoom_range = (source.zoom_min, source.zoom_max);
    let mut tiles = MapTiles::new(source, config)?;

    let start = Instant::now();
    let status = wait_for_tile(&mut tiles, tx, ty, args.zoom, args.timeout);
    let pixels = match status {
        TileStatus::Available(pixels) => pixels,
        other => return Err(unavailable(&key, &other, zoom_range, args.timeout)),
    };

    info!(key = %key, elapsed_ms = start.elapsed().as_millis() as u64, "Tile fetched");
    println!(
        "Fetched {}x{} tile in {:.2}s",
        pixels.width,
        pixels.height,
        start.elapsed().as_secs_f64()
    );

    save_pixels(&pixels, &args.output)?;
    println!("Saved to {}", args.output.display());
    Ok(())
}

fn validate_position(lat: f64, lon: f64) -> Result<(), CliError> {
    if !(-90.0..=90.0).contains(&lat) {
        return Err(CliError::InvalidArgument(format!(
            "latitude {} outside -90..90",
            lat
        )));
    }
    if !(-180.0..=180.0).contains(&lon) {
        return Err(CliError::InvalidArgument(format!(
            "longitude {} outside -180..180",
            lon
        )));
    }
    Ok(())
}

/// Drive the pipeline until the tile leaves LOADING or `timeout` passes.
fn wait_for_tile(tiles: &mut MapTiles, tx: u32, ty: u32, tz: u8, timeout: Duration) -> TileStatus {
    let deadline = Instant::now() + timeout;
    loop {
        let now = Instant::now();
        tiles.update(now);
        let status = tiles.get_tile_at(tx, ty, tz, now);
        if status != TileStatus::Loading || now >= deadline {
            return status;
        }
        thread::sleep(Duration::from_millis(20));
    }
}

fn unavailable(
    key: &TileKey,
    status: &TileStatus,
    zoom_range: (u8, u8),
    timeout: Duration,
) -> CliError {
    let reason = match status {
        TileStatus::Loading => format!("no result within {}s", timeout.as_secs()),
        TileStatus::Failed => "download or decode failed".to_string(),
        TileStatus::Outside => "outside the source's coverage".to_string(),
        TileStatus::OutOfRange => format!(
            "zoom {} outside the source's range {}-{}",
            key.tz(),
            zoom_range.0,
            zoom_range.1
        ),
        TileStatus::Available(_) => "available".to_string(),
    };
    CliError::TileUnavailable {
        key: key.to_string(),
        reason,
    }
}

/// Save decoded pixels, picking the format from the file extension.
///
/// JPEG has no alpha channel, so the alpha is dropped for `.jpg`/`.jpeg`.
fn save_pixels(pixels: &TilePixels, path: &Path) -> Result<(), CliError> {
    let write_err = |error: String| CliError::FileWrite {
        path: path.to_path_buf(),
        error,
    };

    let image = pixels
        .to_image()
        .ok_or_else(|| write_err("pixel buffer does not match tile size".to_string()))?;

    let is_jpeg = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("jpg") || ext.eq_ignore_ascii_case("jpeg"));

    let result = if is_jpeg {
        image::DynamicImage::ImageRgba8(image).to_rgb8().save(path)
    } else {
        image.save(path)
    };
    result.map_err(|e| write_err(e.to_string()))
}
