//! `maps.conf` handling.
//!
//! The file holds one `[map]` section per tile source. Sections with
//! missing or invalid required keys are skipped with a warning so a single
//! bad entry does not hide the others.

use super::config::{MapSourceConfig, MIN_TILE_SIZE};
use crate::coord::GeoRect;
use ini::{Ini, Properties};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Section name used for every map source.
const MAP_SECTION: &str = "map";

/// Errors reading or writing `maps.conf`.
#[derive(Debug, Error)]
pub enum SourceConfigError {
    /// Failed to read or parse the file
    #[error("Failed to read maps config: {0}")]
    Read(#[from] ini::Error),

    /// Failed to write the file
    #[error("Failed to write maps config: {0}")]
    Write(std::io::Error),

    /// Failed to create the config directory
    #[error("Failed to create config directory: {0}")]
    Directory(std::io::Error),
}

/// Get the path to the config directory (~/.maptiles).
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".maptiles")
}

/// Get the path to the maps file (~/.maptiles/maps.conf).
pub fn default_maps_conf_path() -> PathBuf {
    config_directory().join("maps.conf")
}

/// Sources written to a fresh `maps.conf`.
pub fn builtin_sources() -> Vec<MapSourceConfig> {
    vec![
        MapSourceConfig::openstreetmap(),
        MapSourceConfig::opentopomap(),
        MapSourceConfig::test_pattern(),
    ]
}

/// Load all valid sources from a maps file.
pub fn load_sources(path: &Path) -> Result<Vec<MapSourceConfig>, SourceConfigError> {
    let ini = Ini::load_from_file(path)?;
    Ok(parse_sources(&ini, path))
}

/// Load sources, writing the default file first if it does not exist.
pub fn load_or_create(path: &Path) -> Result<Vec<MapSourceConfig>, SourceConfigError> {
    if !path.exists() {
        debug!(path = %path.display(), "Creating default maps config");
        save_sources(path, &builtin_sources())?;
    }
    load_sources(path)
}

/// Write sources to a maps file, creating the parent directory if needed.
pub fn save_sources(path: &Path, sources: &[MapSourceConfig]) -> Result<(), SourceConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(SourceConfigError::Directory)?;
    }
    std::fs::write(path, to_maps_conf_string(sources)).map_err(SourceConfigError::Write)
}

/// Convert every `[map]` section of a parsed file into a source.
fn parse_sources(ini: &Ini, path: &Path) -> Vec<MapSourceConfig> {
    let mut sources = Vec::new();
    for section in ini.section_all(Some(MAP_SECTION)) {
        match parse_section(section) {
            Ok(source) => {
                debug!(name = %source.name, title = %source.title, "Loaded map source");
                sources.push(source);
            }
            Err(reason) => {
                warn!(path = %path.display(), reason = %reason, "Skipping map entry");
            }
        }
    }
    sources
}

fn required<'a>(section: &'a Properties, key: &'static str) -> Result<&'a str, String> {
    match section.get(key).map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(format!("missing {}", key)),
    }
}

fn required_num<T: std::str::FromStr>(section: &Properties, key: &'static str) -> Result<T, String> {
    let v = required(section, key)?;
    v.parse()
        .map_err(|_| format!("invalid {} = '{}'", key, v))
}

fn optional_num<T: std::str::FromStr>(
    section: &Properties,
    key: &'static str,
) -> Result<Option<T>, String> {
    match section.get(key).map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => v
            .parse()
            .map(Some)
            .map_err(|_| format!("invalid {} = '{}'", key, v)),
    }
}

/// Parse one `[map]` section, returning the reason when it is unusable.
fn parse_section(section: &Properties) -> Result<MapSourceConfig, String> {
    let name = required(section, "name")?;
    let download_url = required(section, "downloadUrl")?;
    let title = required(section, "title")?;
    let attribution = required(section, "attribution")?;
    let link = required(section, "link")?;
    let cache_path = required(section, "cachePath")?;

    let zoom_min: u8 = required_num(section, "zoomMin")?;
    let zoom_max: u8 = required_num(section, "zoomMax")?;
    if zoom_max < zoom_min {
        return Err(format!("zoomMax {} below zoomMin {}", zoom_max, zoom_min));
    }

    let tile_size_x: u32 = required_num(section, "tileSizeX")?;
    let tile_size_y: u32 = required_num(section, "tileSizeY")?;
    if tile_size_x < MIN_TILE_SIZE || tile_size_y < MIN_TILE_SIZE {
        return Err(format!("tile size {}x{} too small", tile_size_x, tile_size_y));
    }

    let mut source = MapSourceConfig::new(name, download_url)
        .with_title(title)
        .with_attribution(attribution, link)
        .with_cache_path(cache_path)
        .with_zoom_range(zoom_min, zoom_max)
        .with_tile_size(tile_size_x, tile_size_y);

    if let Some(referer) = section.get("referer").map(str::trim) {
        if !referer.is_empty() {
            source = source.with_referer(referer);
        }
    }
    if let Some(threads) = optional_num::<usize>(section, "threads")? {
        source = source.with_threads(threads);
    }
    if let Some(timeout) = optional_num::<u64>(section, "downloadTimeout")? {
        source = source.with_download_timeout(Duration::from_millis(timeout));
    }
    if let Some(sub_domains) = section.get("subDomains") {
        source = source.with_sub_domains(
            sub_domains
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty()),
        );
    }

    let world = GeoRect::WORLD;
    let coverage = GeoRect::new(
        optional_num::<f64>(section, "minLat")?.map_or(world.min_lat, f64::to_radians),
        optional_num::<f64>(section, "maxLat")?.map_or(world.max_lat, f64::to_radians),
        optional_num::<f64>(section, "minLon")?.map_or(world.min_lon, f64::to_radians),
        optional_num::<f64>(section, "maxLon")?.map_or(world.max_lon, f64::to_radians),
    );
    if !coverage.is_within_world() {
        return Err("coverage outside Web Mercator limits".to_string());
    }

    Ok(source.with_coverage(coverage).normalized())
}

/// Convert sources to the `maps.conf` text format.
pub fn to_maps_conf_string(sources: &[MapSourceConfig]) -> String {
    let mut out = String::from(
        "; Map tile sources, one [map] section each.\n\
         ; Templates: {x} {y} {z} tile coordinates, {s} one of subDomains.\n\
         ; Coverage (minLat, maxLat, minLon, maxLon) is in degrees.\n",
    );

    for source in sources {
        out.push_str(&format!(
            "\n[{section}]\n\
             name = {name}\n\
             title = {title}\n\
             attribution = {attribution}\n\
             link = {link}\n\
             zoomMin = {zoom_min}\n\
             zoomMax = {zoom_max}\n\
             tileSizeX = {tile_size_x}\n\
             tileSizeY = {tile_size_y}\n\
             downloadUrl = {download_url}\n\
             cachePath = {cache_path}\n\
             downloadTimeout = {timeout}\n\
             threads = {threads}\n",
            section = MAP_SECTION,
            name = source.name,
            title = source.title,
            attribution = source.attribution,
            link = source.link,
            zoom_min = source.zoom_min,
            zoom_max = source.zoom_max,
            tile_size_x = source.tile_size_x,
            tile_size_y = source.tile_size_y,
            download_url = source.download_url,
            cache_path = source.cache_path,
            timeout = source.download_timeout.as_millis(),
            threads = source.threads,
        ));
        if !source.sub_domains.is_empty() {
            out.push_str(&format!("subDomains = {}\n", source.sub_domains.join(",")));
        }
        if let Some(referer) = &source.referer {
            out.push_str(&format!("referer = {}\n", referer));
        }
        if source.coverage != GeoRect::WORLD {
            out.push_str(&format!(
                "minLat = {}\nmaxLat = {}\nminLon = {}\nmaxLon = {}\n",
                source.coverage.min_lat.to_degrees(),
                source.coverage.max_lat.to_degrees(),
                source.coverage.min_lon.to_degrees(),
                source.coverage.max_lon.to_degrees(),
            ));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SWISS_MAP: &str = r#"
[map]
name = swisstopo
title = Swiss topo
attribution = swisstopo
link = https://www.swisstopo.admin.ch
zoomMin = 6
zoomMax = 18
tileSizeX = 256
tileSizeY = 256
downloadUrl = https://wmts{s}.geo.admin.ch/{z}/{x}/{y}.jpeg
subDomains = 10, 11,12
cachePath = {z}/{y}/{x}.jpeg
referer = https://map.geo.admin.ch
downloadTimeout = 250
threads = 25
minLat = 45.4
maxLat = 48.2
minLon = 5.1
maxLon = 11.1
"#;

    fn write_conf(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("maps.conf");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_full_section() {
        let dir = TempDir::new().unwrap();
        let path = write_conf(&dir, SWISS_MAP);

        let sources = load_sources(&path).unwrap();
        assert_eq!(sources.len(), 1);

        let swiss = &sources[0];
        assert_eq!(swiss.name, "swisstopo");
        assert_eq!(swiss.zoom_min, 6);
        assert_eq!(swiss.zoom_max, 18);
        assert_eq!(swiss.sub_domains, vec!["10", "11", "12"]);
        assert_eq!(swiss.cache_path, "{z}/{y}/{x}.jpeg");
        assert_eq!(swiss.referer.as_deref(), Some("https://map.geo.admin.ch"));
        // Clamped like any configured source
        assert_eq!(swiss.download_timeout, Duration::from_millis(5_000));
        assert_eq!(swiss.threads, 10);
        assert!((swiss.coverage.min_lat - 45.4_f64.to_radians()).abs() < 1e-12);
        assert!((swiss.coverage.max_lon - 11.1_f64.to_radians()).abs() < 1e-12);
    }

    #[test]
    fn test_incomplete_section_is_skipped() {
        let dir = TempDir::new().unwrap();
        let content = format!(
            "{}\n[map]\nname = broken\ntitle = Broken\ndownloadUrl = https://x/{{z}}/{{x}}/{{y}}.png\n",
            SWISS_MAP
        );
        let path = write_conf(&dir, &content);

        let sources = load_sources(&path).unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].name, "swisstopo");
    }

    #[test]
    fn test_bad_zoom_and_coverage_are_skipped() {
        let dir = TempDir::new().unwrap();
        let bad_zoom = SWISS_MAP.replace("zoomMin = 6", "zoomMin = 19");
        let bad_coverage = SWISS_MAP.replace("minLat = 45.4", "minLat = -89.0");
        let small_tiles = SWISS_MAP.replace("tileSizeX = 256", "tileSizeX = 64");
        let path = write_conf(
            &dir,
            &format!("{}{}{}", bad_zoom, bad_coverage, small_tiles),
        );

        let sources = load_sources(&path).unwrap();
        assert!(sources.is_empty());
    }

    #[test]
    fn test_load_or_create_writes_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("maps.conf");
        assert!(!path.exists());

        let sources = load_or_create(&path).unwrap();
        assert!(path.exists());
        let names: Vec<_> = sources.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["osm", "otm", "test"]);
    }

    #[test]
    fn test_save_and_reload_preserves_sources() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("maps.conf");
        let original = MapSourceConfig::new("regional", "https://{s}.tiles.example/{z}/{x}/{y}.png")
            .with_attribution("Example", "https://tiles.example")
            .with_sub_domains(["a", "b"])
            .with_referer("https://app.example")
            .with_coverage(GeoRect::from_degrees(10.0, 20.0, -5.0, 5.0))
            .with_zoom_range(2, 15)
            .with_threads(3);

        save_sources(&path, &[original.clone()]).unwrap();
        let loaded = load_sources(&path).unwrap();

        assert_eq!(loaded.len(), 1);
        let loaded = &loaded[0];
        assert_eq!(loaded.name, original.name);
        assert_eq!(loaded.download_url, original.download_url);
        assert_eq!(loaded.sub_domains, original.sub_domains);
        assert_eq!(loaded.referer, original.referer);
        assert_eq!(loaded.threads, 3);
        assert!((loaded.coverage.max_lat - original.coverage.max_lat).abs() < 1e-9);
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let dir = TempDir::new().unwrap();
        let result = load_sources(&dir.path().join("nope.conf"));
        assert!(matches!(result, Err(SourceConfigError::Read(_))));
    }
}
