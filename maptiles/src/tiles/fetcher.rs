//! Resolves one tile request to decoded pixels.
//!
//! The disk cache is consulted first. On a miss the tile is downloaded,
//! decoded and, only if decoding succeeded, written to the cache as
//! received. A cached file that no longer decodes is discarded and the tile
//! is downloaded again.

use crate::cache::{expand_template, DiskTileCache};
use crate::codec::{decode_tile, TilePixels};
use crate::provider::{FetchError, HttpClient};
use crate::source::MapSourceConfig;
use crate::tiles::queue::TileRequest;
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Fetches tiles of a single source. Shared by all workers of a pool.
pub struct TileFetcher {
    source: MapSourceConfig,
    cache: DiskTileCache,
    client: Arc<dyn HttpClient>,
    /// Round-robin index into the source's sub-domains
    sub_domain_ix: AtomicUsize,
}

impl TileFetcher {
    pub fn new(source: MapSourceConfig, cache: DiskTileCache, client: Arc<dyn HttpClient>) -> Self {
        Self {
            source,
            cache,
            client,
            sub_domain_ix: AtomicUsize::new(0),
        }
    }

    pub fn source(&self) -> &MapSourceConfig {
        &self.source
    }

    pub fn cache(&self) -> &DiskTileCache {
        &self.cache
    }

    /// Download URL of a tile.
    ///
    /// Each call with a `{s}` template advances the sub-domain rotation.
    pub fn tile_url(&self, tx: u32, ty: u32, tz: u8) -> String {
        let url = expand_template(&self.source.download_url, tx, ty, tz);
        if self.source.sub_domains.is_empty() {
            return url;
        }
        let ix = self.sub_domain_ix.fetch_add(1, Ordering::Relaxed) % self.source.sub_domains.len();
        url.replace("{s}", &self.source.sub_domains[ix])
    }

    /// Fetch and decode a tile.
    pub fn fetch(&self, request: &TileRequest) -> Result<TilePixels, FetchError> {
        let path = self.cache.tile_path(
            &self.source.name,
            &self.source.cache_path,
            request.tx,
            request.ty,
            request.tz,
        );

        if let Some(bytes) = self.cache.read(&path)? {
            match decode_tile(&bytes) {
                Ok(pixels) => {
                    trace!(key = %request.key, "Tile loaded from cache");
                    return Ok(pixels);
                }
                Err(e) => {
                    warn!(
                        key = %request.key,
                        path = %path.display(),
                        error = %e,
                        "Discarding corrupt cached tile"
                    );
                    self.cache.remove(&path)?;
                }
            }
        }

        let url = self.tile_url(request.tx, request.ty, request.tz);
        debug!(key = %request.key, url = %url, "Downloading tile");

        let bytes = self.download(&url)?;
        let pixels = decode_tile(&bytes)?;
        self.cache.store(&path, &bytes)?;

        Ok(pixels)
    }

    /// Retrieve the raw bytes behind `url`.
    fn download(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        if url.starts_with("http://") || url.starts_with("https://") {
            let mut headers: Vec<(&str, &str)> = Vec::new();
            if let Some(referer) = self.source.referer.as_deref() {
                headers.push(("Referer", referer));
            }

            let response = self.client.get(url, &headers)?;
            if response.status != 200 {
                return Err(FetchError::HttpStatus {
                    status: response.status,
                    url: url.to_string(),
                });
            }
            Ok(response.body)
        } else if let Some(path) = url.strip_prefix("file://") {
            Ok(fs::read(path)?)
        } else {
            let scheme = url.split_once("://").map_or(url, |(scheme, _)| scheme);
            Err(FetchError::UnsupportedScheme(scheme.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::tests::png_bytes;
    use crate::provider::{HttpResponse, MockHttpClient};
    use crate::tiles::state::TileKey;
    use tempfile::TempDir;

    const URL: &str = "https://tile.example/{z}/{x}/{y}.png";

    fn fetcher(source: MapSourceConfig, client: &MockHttpClient, temp: &TempDir) -> TileFetcher {
        TileFetcher::new(
            source,
            DiskTileCache::new(temp.path()),
            Arc::new(client.clone()),
        )
    }

    fn request(tx: u32, ty: u32, tz: u8) -> TileRequest {
        TileRequest::new(TileKey::new("src", tx, ty, tz))
    }

    #[test]
    fn test_download_decodes_and_caches() {
        let temp = TempDir::new().unwrap();
        let client = MockHttpClient::ok(png_bytes(256, 256, [0, 128, 0, 255]));
        let fetcher = fetcher(MapSourceConfig::new("src", URL), &client, &temp);

        let pixels = fetcher.fetch(&request(1, 1, 2)).unwrap();

        assert_eq!((pixels.width, pixels.height), (256, 256));
        assert_eq!(client.requests()[0].url, "https://tile.example/2/1/1.png");
        assert!(temp.path().join("src/2/1/1.png").exists());
    }

    #[test]
    fn test_cache_hit_skips_network() {
        let temp = TempDir::new().unwrap();
        let cached = temp.path().join("src/3/2/1.png");
        fs::create_dir_all(cached.parent().unwrap()).unwrap();
        fs::write(&cached, png_bytes(16, 16, [1, 2, 3, 255])).unwrap();

        let client = MockHttpClient::new(Err(FetchError::Network("offline".to_string())));
        let fetcher = fetcher(MapSourceConfig::new("src", URL), &client, &temp);

        let pixels = fetcher.fetch(&request(2, 1, 3)).unwrap();
        assert_eq!(pixels.pixel(0, 0), Some([1, 2, 3, 255]));
        assert_eq!(client.call_count(), 0);
    }

    #[test]
    fn test_truncated_cache_file_is_downloaded_again() {
        let temp = TempDir::new().unwrap();
        let full = png_bytes(256, 256, [10, 20, 30, 255]);
        let cached = temp.path().join("src/2/1/1.png");
        fs::create_dir_all(cached.parent().unwrap()).unwrap();
        fs::write(&cached, &full[..full.len() / 2]).unwrap();

        let client = MockHttpClient::ok(full.clone());
        let fetcher = fetcher(MapSourceConfig::new("src", URL), &client, &temp);

        let pixels = fetcher.fetch(&request(1, 1, 2)).unwrap();
        assert_eq!(pixels.pixel(0, 0), Some([10, 20, 30, 255]));
        assert_eq!(client.call_count(), 1);
        assert_eq!(fs::read(&cached).unwrap(), full);

        // The repaired file is served from the cache again
        fetcher.fetch(&request(1, 1, 2)).unwrap();
        assert_eq!(client.call_count(), 1);
    }

    #[test]
    fn test_non_200_fails_without_caching() {
        let temp = TempDir::new().unwrap();
        let client = MockHttpClient::new(Ok(HttpResponse::new(
            404,
            png_bytes(8, 8, [0, 0, 0, 255]),
        )));
        let fetcher = fetcher(MapSourceConfig::new("src", URL), &client, &temp);

        let err = fetcher.fetch(&request(0, 0, 1)).unwrap_err();
        assert!(matches!(err, FetchError::HttpStatus { status: 404, .. }));
        assert!(!temp.path().join("src/1/0/0.png").exists());
    }

    #[test]
    fn test_undecodable_body_is_not_cached() {
        let temp = TempDir::new().unwrap();
        let client = MockHttpClient::ok(b"<html>rate limited</html>".to_vec());
        let fetcher = fetcher(MapSourceConfig::new("src", URL), &client, &temp);

        let err = fetcher.fetch(&request(0, 0, 1)).unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
        assert!(!temp.path().join("src/1/0/0.png").exists());
    }

    #[test]
    fn test_network_error_propagates() {
        let temp = TempDir::new().unwrap();
        let client = MockHttpClient::new(Err(FetchError::Network("timed out".to_string())));
        let fetcher = fetcher(MapSourceConfig::new("src", URL), &client, &temp);

        assert!(matches!(
            fetcher.fetch(&request(0, 0, 0)),
            Err(FetchError::Network(_))
        ));
    }

    #[test]
    fn test_cache_write_failure_fails_fetch() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("src"), b"not a directory").unwrap();
        let client = MockHttpClient::ok(png_bytes(8, 8, [0, 0, 0, 255]));
        let fetcher = fetcher(MapSourceConfig::new("src", URL), &client, &temp);

        assert!(matches!(
            fetcher.fetch(&request(0, 0, 0)),
            Err(FetchError::Filesystem(_))
        ));
    }

    #[test]
    fn test_referer_header_sent() {
        let temp = TempDir::new().unwrap();
        let client = MockHttpClient::ok(png_bytes(8, 8, [0, 0, 0, 255]));
        let source = MapSourceConfig::new("src", URL).with_referer("https://app.example/");
        let fetcher = fetcher(source, &client, &temp);

        fetcher.fetch(&request(0, 0, 0)).unwrap();
        assert_eq!(
            client.requests()[0].header("Referer"),
            Some("https://app.example/")
        );
    }

    #[test]
    fn test_no_referer_by_default() {
        let temp = TempDir::new().unwrap();
        let client = MockHttpClient::ok(png_bytes(8, 8, [0, 0, 0, 255]));
        let fetcher = fetcher(MapSourceConfig::new("src", URL), &client, &temp);

        fetcher.fetch(&request(0, 0, 0)).unwrap();
        assert!(client.requests()[0].headers.is_empty());
    }

    #[test]
    fn test_sub_domains_rotate() {
        let temp = TempDir::new().unwrap();
        let client = MockHttpClient::ok(Vec::new());
        let source = MapSourceConfig::new("src", "https://{s}.tile.example/{z}/{x}/{y}.png")
            .with_sub_domains(["a", "b", "c"]);
        let fetcher = fetcher(source, &client, &temp);

        let hosts: Vec<String> = (0..4).map(|_| fetcher.tile_url(1, 2, 3)).collect();
        assert_eq!(
            hosts,
            vec![
                "https://a.tile.example/3/1/2.png",
                "https://b.tile.example/3/1/2.png",
                "https://c.tile.example/3/1/2.png",
                "https://a.tile.example/3/1/2.png",
            ]
        );
    }

    #[test]
    fn test_file_scheme_reads_local_file() {
        let temp = TempDir::new().unwrap();
        let tiles = TempDir::new().unwrap();
        let local = tiles.path().join("4-5-6.png");
        fs::write(&local, png_bytes(32, 32, [9, 9, 9, 255])).unwrap();

        let url = format!("file://{}/{{z}}-{{x}}-{{y}}.png", tiles.path().display());
        let client = MockHttpClient::ok(Vec::new());
        let fetcher = fetcher(MapSourceConfig::new("src", url), &client, &temp);

        let pixels = fetcher.fetch(&request(5, 6, 4)).unwrap();
        assert_eq!(pixels.width, 32);
        assert_eq!(client.call_count(), 0);
        assert!(temp.path().join("src/4/5/6.png").exists());
    }

    #[test]
    fn test_unsupported_scheme() {
        let temp = TempDir::new().unwrap();
        let client = MockHttpClient::ok(Vec::new());
        let fetcher = fetcher(
            MapSourceConfig::new("src", "ftp://tiles.example/{z}/{x}/{y}.png"),
            &client,
            &temp,
        );

        assert_eq!(
            fetcher.fetch(&request(0, 0, 0)).unwrap_err(),
            FetchError::UnsupportedScheme("ftp".to_string())
        );
        assert_eq!(client.call_count(), 0);
    }
}
