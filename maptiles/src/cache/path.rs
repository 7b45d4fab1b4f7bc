//! Cache path construction and template expansion.

use std::path::{Path, PathBuf};

/// Substitute `{x}`, `{y}` and `{z}` in a tile template.
///
/// # Example
///
/// ```
/// use maptiles::cache::expand_template;
///
/// assert_eq!(expand_template("{z}/{x}/{y}.png", 3, 5, 4), "4/3/5.png");
/// ```
pub fn expand_template(template: &str, tx: u32, ty: u32, tz: u8) -> String {
    template
        .replace("{x}", &tx.to_string())
        .replace("{y}", &ty.to_string())
        .replace("{z}", &tz.to_string())
}

/// Construct the full path of a cached tile file.
///
/// The path is `<cache_dir>/<source>/<template expanded>`, where the expanded
/// template is split on `/` into nested directories:
/// ```text
/// <cache_dir>/<source>/<z>/<x>/<y>.png
/// ```
///
/// Empty, `.` and `..` segments are dropped so a template cannot escape the
/// source directory.
///
/// # Example
///
/// ```
/// use std::path::PathBuf;
/// use maptiles::cache::cache_file_path;
///
/// let path = cache_file_path(&PathBuf::from("/cache"), "osm", "{z}/{x}/{y}.png", 1, 1, 2);
/// assert_eq!(path, PathBuf::from("/cache/osm/2/1/1.png"));
/// ```
pub fn cache_file_path(
    cache_dir: &Path,
    source: &str,
    template: &str,
    tx: u32,
    ty: u32,
    tz: u8,
) -> PathBuf {
    let expanded = expand_template(template, tx, ty, tz);

    expanded
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != "." && *segment != "..")
        .fold(cache_dir.join(source), |path, segment| path.join(segment))
}
