//! Map source configuration.

use crate::builtin::BuiltinTile;
use crate::coord::GeoRect;
use std::time::Duration;

/// Default download timeout in milliseconds.
pub const DEFAULT_DOWNLOAD_TIMEOUT_MS: u64 = 5_000;

/// Shortest accepted download timeout; anything below falls back to the default.
pub const MIN_DOWNLOAD_TIMEOUT_MS: u64 = 1_000;

/// Longest accepted download timeout.
pub const MAX_DOWNLOAD_TIMEOUT_MS: u64 = 60_000;

/// Minimum number of fetch worker threads for a configured source.
pub const MIN_THREADS: usize = 1;

/// Maximum number of fetch worker threads for a configured source.
pub const MAX_THREADS: usize = 10;

/// Smallest tile edge length accepted from configuration.
pub const MIN_TILE_SIZE: u32 = 100;

/// Prefix of the pseudo-scheme for sources served from built-in images.
pub const BUILTIN_SCHEME: &str = "builtin://";

/// Configuration of one raster tile source.
///
/// Coverage bounds are in radians. Templates use `{x}`, `{y}` and `{z}`
/// placeholders; the download URL may also contain `{s}`, which is
/// replaced by the entries of `sub_domains` in turn.
#[derive(Debug, Clone, PartialEq)]
pub struct MapSourceConfig {
    /// Short unique name, also the cache sub-directory and key prefix
    pub name: String,
    /// Human readable title
    pub title: String,
    /// Attribution text to show with the map
    pub attribution: String,
    /// Link for the attribution
    pub link: String,
    /// Lowest zoom level served
    pub zoom_min: u8,
    /// Highest zoom level served
    pub zoom_max: u8,
    /// Tile width in pixels
    pub tile_size_x: u32,
    /// Tile height in pixels
    pub tile_size_y: u32,
    /// Download URL template
    pub download_url: String,
    /// Values for the `{s}` placeholder
    pub sub_domains: Vec<String>,
    /// Per-request download timeout
    pub download_timeout: Duration,
    /// Cache file path template, relative to the source's cache directory
    pub cache_path: String,
    /// Optional `Referer` header value
    pub referer: Option<String>,
    /// Area the source has tiles for
    pub coverage: GeoRect,
    /// Number of fetch worker threads
    pub threads: usize,
}

impl MapSourceConfig {
    /// Creates a source with global coverage and default settings.
    pub fn new(name: impl Into<String>, download_url: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            title: name.clone(),
            name,
            attribution: String::new(),
            link: String::new(),
            zoom_min: 0,
            zoom_max: 19,
            tile_size_x: 256,
            tile_size_y: 256,
            download_url: download_url.into(),
            sub_domains: Vec::new(),
            download_timeout: Duration::from_millis(DEFAULT_DOWNLOAD_TIMEOUT_MS),
            cache_path: "{z}/{x}/{y}.png".to_string(),
            referer: None,
            coverage: GeoRect::WORLD,
            threads: MIN_THREADS,
        }
    }

    /// OpenStreetMap standard tile layer.
    pub fn openstreetmap() -> Self {
        Self::new("osm", "https://tile.openstreetmap.org/{z}/{x}/{y}.png")
            .with_title("OpenStreetMap")
            .with_attribution(
                "© OpenStreetMap contributors",
                "https://www.openstreetmap.org/copyright",
            )
            .with_threads(2)
    }

    /// OpenTopoMap, served round-robin from three sub-domains.
    pub fn opentopomap() -> Self {
        Self::new("otm", "https://{s}.tile.opentopomap.org/{z}/{x}/{y}.png")
            .with_title("OpenTopoMap")
            .with_attribution(
                "© OpenTopoMap (CC-BY-SA)",
                "https://opentopomap.org/about",
            )
            .with_zoom_range(0, 17)
            .with_sub_domains(["a", "b", "c"])
            .with_threads(3)
    }

    /// Test pattern source that never touches the network.
    pub fn test_pattern() -> Self {
        Self::new("test", "builtin://tiletest.png")
            .with_title("Test tiles")
            .with_attribution("built-in", "builtin://")
            .with_cache_path("{z}/{x}/{y}.png")
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the attribution text and link.
    pub fn with_attribution(mut self, text: impl Into<String>, link: impl Into<String>) -> Self {
        self.attribution = text.into();
        self.link = link.into();
        self
    }

    /// Set the served zoom range.
    pub fn with_zoom_range(mut self, zoom_min: u8, zoom_max: u8) -> Self {
        self.zoom_min = zoom_min;
        self.zoom_max = zoom_max;
        self
    }

    /// Set the tile size in pixels.
    pub fn with_tile_size(mut self, x: u32, y: u32) -> Self {
        self.tile_size_x = x;
        self.tile_size_y = y;
        self
    }

    /// Set the `{s}` sub-domain values.
    pub fn with_sub_domains<I, S>(mut self, sub_domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sub_domains = sub_domains.into_iter().map(Into::into).collect();
        self
    }

    /// Set the download timeout.
    pub fn with_download_timeout(mut self, timeout: Duration) -> Self {
        self.download_timeout = timeout;
        self
    }

    /// Set the cache path template.
    pub fn with_cache_path(mut self, cache_path: impl Into<String>) -> Self {
        self.cache_path = cache_path.into();
        self
    }

    /// Set the `Referer` header.
    pub fn with_referer(mut self, referer: impl Into<String>) -> Self {
        self.referer = Some(referer.into());
        self
    }

    /// Set the coverage rectangle (radians).
    pub fn with_coverage(mut self, coverage: GeoRect) -> Self {
        self.coverage = coverage;
        self
    }

    /// Set the number of fetch worker threads.
    ///
    /// Zero is accepted here and starts no workers: requests stay queued.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Checks if this source serves the given zoom level.
    #[inline]
    pub fn supports_zoom(&self, zoom: u8) -> bool {
        zoom >= self.zoom_min && zoom <= self.zoom_max
    }

    /// Returns the built-in image this source resolves to, if it uses the
    /// `builtin://` pseudo-scheme.
    ///
    /// Unknown built-in names resolve to the failure image.
    pub fn builtin_tile(&self) -> Option<BuiltinTile> {
        self.download_url
            .strip_prefix(BUILTIN_SCHEME)
            .map(|name| BuiltinTile::from_name(name).unwrap_or(BuiltinTile::Fail))
    }

    /// Timeout to use for downloads.
    ///
    /// Anything below one second falls back to the default.
    pub fn effective_download_timeout(&self) -> Duration {
        if self.download_timeout < Duration::from_millis(MIN_DOWNLOAD_TIMEOUT_MS) {
            Duration::from_millis(DEFAULT_DOWNLOAD_TIMEOUT_MS)
        } else {
            self.download_timeout
        }
    }

    /// Applies the limits used for configured sources.
    ///
    /// Timeouts below one second fall back to the default, longer than a
    /// minute are capped. Thread counts are clamped to 1..=10.
    pub fn normalized(mut self) -> Self {
        self.download_timeout = self.effective_download_timeout();
        if self.download_timeout > Duration::from_millis(MAX_DOWNLOAD_TIMEOUT_MS) {
            self.download_timeout = Duration::from_millis(MAX_DOWNLOAD_TIMEOUT_MS);
        }
        self.threads = self.threads.clamp(MIN_THREADS, MAX_THREADS);
        self
    }
}
