//! The [`MapTiles`] facade.
//!
//! `MapTiles` is the only type a map view touches. It owns the tile table,
//! answers [`get_tile`](MapTiles::get_tile) without blocking and applies
//! worker results in [`update`](MapTiles::update), which the render loop
//! calls once per frame.

use crate::builtin::BuiltinTile;
use crate::cache::{default_cache_dir, DiskTileCache};
use crate::codec::TilePixels;
use crate::coord::GeoRect;
use crate::provider::{FetchError, HttpClient, ReqwestClient};
use crate::source::MapSourceConfig;
use crate::tiles::fetcher::TileFetcher;
use crate::tiles::queue::{DataQueue, RequestQueue, TileRequest, DEFAULT_MAX_TILES_IN_QUEUE};
use crate::tiles::state::{TileCounts, TileKey, TileState, TileTable};
use crate::tiles::worker::{FetchWorker, WorkerPool};
use std::fmt::Write as _;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, trace};

/// Errors raised while setting up a [`MapTiles`] instance.
#[derive(Debug, Error)]
pub enum MapTilesError {
    /// The HTTP client could not be created
    #[error("Failed to create HTTP client: {0}")]
    HttpClient(#[from] FetchError),
    /// A worker thread could not be spawned
    #[error("Failed to start tile workers: {0}")]
    Spawn(#[from] io::Error),
}

/// Pipeline settings shared by all sources.
#[derive(Debug, Clone, PartialEq)]
pub struct MapTilesConfig {
    /// Root of the disk cache
    pub cache_dir: PathBuf,
    /// AVAILABLE tiles unused for longer than this are evicted
    pub max_age_available: Duration,
    /// FAILED and OUTSIDE tiles unused for longer than this are evicted
    pub max_age_failed: Duration,
    /// Minimum time between housekeeping sweeps
    pub housekeeping_interval: Duration,
    /// Soft bound of the request queue
    pub max_tiles_in_queue: usize,
}

impl Default for MapTilesConfig {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            max_age_available: Duration::from_secs(60),
            max_age_failed: Duration::from_secs(300),
            housekeeping_interval: Duration::from_secs(1),
            max_tiles_in_queue: DEFAULT_MAX_TILES_IN_QUEUE,
        }
    }
}

impl MapTilesConfig {
    /// Set the cache directory.
    pub fn with_cache_dir(mut self, cache_dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = cache_dir.into();
        self
    }

    /// Set the eviction age of AVAILABLE tiles.
    pub fn with_max_age_available(mut self, age: Duration) -> Self {
        self.max_age_available = age;
        self
    }

    /// Set the eviction age of FAILED and OUTSIDE tiles.
    pub fn with_max_age_failed(mut self, age: Duration) -> Self {
        self.max_age_failed = age;
        self
    }

    /// Set the housekeeping interval.
    pub fn with_housekeeping_interval(mut self, interval: Duration) -> Self {
        self.housekeeping_interval = interval;
        self
    }

    /// Set the request queue bound.
    pub fn with_max_tiles_in_queue(mut self, max: usize) -> Self {
        self.max_tiles_in_queue = max;
        self
    }
}

/// What [`MapTiles::get_tile`] reports for a tile.
#[derive(Debug, Clone, PartialEq)]
pub enum TileStatus {
    /// Requested, not yet available
    Loading,
    /// Ready to draw
    Available(Arc<TilePixels>),
    /// Could not be fetched; retried after the failed-tile age expires
    Failed,
    /// Outside the source's coverage
    Outside,
    /// Zoom level not served by the source
    OutOfRange,
}

impl TileStatus {
    /// Pixels of an available tile.
    pub fn pixels(&self) -> Option<&Arc<TilePixels>> {
        match self {
            TileStatus::Available(pixels) => Some(pixels),
            _ => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, TileStatus::Available(_))
    }

    /// Placeholder to draw instead, if the tile is not available.
    pub fn placeholder(&self) -> Option<Placeholder> {
        match self {
            TileStatus::Available(_) => None,
            TileStatus::Loading => Some(Placeholder::Loading),
            TileStatus::Failed => Some(Placeholder::Failed),
            TileStatus::Outside | TileStatus::OutOfRange => Some(Placeholder::Outside),
        }
    }
}

/// Fixed images a renderer draws in place of missing tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    Loading,
    Failed,
    Outside,
}

impl Placeholder {
    /// The built-in image behind this placeholder.
    pub fn builtin(self) -> BuiltinTile {
        match self {
            Placeholder::Loading => BuiltinTile::Load,
            Placeholder::Failed => BuiltinTile::Fail,
            Placeholder::Outside => BuiltinTile::Nope,
        }
    }
}

/// Receives tile lifecycle events from [`MapTiles::update`].
///
/// Renderer adapters use this to create a GPU texture when a tile becomes
/// available and to destroy it when the tile is evicted. Both calls happen
/// on the thread that calls `update`.
pub trait TileObserver: Send {
    /// A tile became AVAILABLE. Replacing the pixels of a tile that was
    /// already AVAILABLE is reported as `on_evicted` followed by this call.
    fn on_available(&mut self, key: &TileKey, pixels: &Arc<TilePixels>);

    /// An AVAILABLE tile lost its pixels, by eviction or a later failure.
    fn on_evicted(&mut self, key: &TileKey);
}

/// Tile fetch-and-cache pipeline for one map source.
pub struct MapTiles {
    source: MapSourceConfig,
    source_name: Arc<str>,
    config: MapTilesConfig,
    builtin: Option<BuiltinTile>,
    table: TileTable,
    requests: Arc<RequestQueue>,
    results: Arc<DataQueue>,
    pool: WorkerPool,
    observer: Option<Box<dyn TileObserver>>,
    last_housekeeping: Option<Instant>,
}

impl MapTiles {
    /// Create a pipeline downloading through a [`ReqwestClient`] with the
    /// source's effective timeout.
    pub fn new(source: MapSourceConfig, config: MapTilesConfig) -> Result<Self, MapTilesError> {
        let client = http_client(&source)?;
        Self::with_client(source, config, Arc::new(client))
    }

    /// Create a pipeline using the given HTTP client.
    ///
    /// Starts `source.threads` workers, or none for `builtin://` sources.
    pub fn with_client(
        source: MapSourceConfig,
        config: MapTilesConfig,
        client: Arc<dyn HttpClient>,
    ) -> Result<Self, MapTilesError> {
        let builtin = source.builtin_tile();
        let requests = Arc::new(RequestQueue::new(config.max_tiles_in_queue));
        let results = Arc::new(DataQueue::new());

        let fetcher = TileFetcher::new(
            source.clone(),
            DiskTileCache::new(&config.cache_dir),
            client,
        );
        let worker = FetchWorker::new(
            Arc::new(fetcher),
            Arc::clone(&requests),
            Arc::clone(&results),
        );
        let threads = if builtin.is_some() { 0 } else { source.threads };
        let pool = WorkerPool::start(threads, worker)?;

        debug!(
            source = %source.name,
            cache_dir = %config.cache_dir.display(),
            builtin = builtin.is_some(),
            "MapTiles created"
        );

        Ok(Self {
            source_name: Arc::from(source.name.as_str()),
            source,
            config,
            builtin,
            table: TileTable::new(),
            requests,
            results,
            pool,
            observer: None,
            last_housekeeping: None,
        })
    }

    /// Attach an observer for tile lifecycle events.
    pub fn with_observer(mut self, observer: Box<dyn TileObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn source(&self) -> &MapSourceConfig {
        &self.source
    }

    pub fn config(&self) -> &MapTilesConfig {
        &self.config
    }

    /// Look up a tile, requesting it if it is new. Never blocks.
    pub fn get_tile(&mut self, tx: u32, ty: u32, tz: u8) -> TileStatus {
        self.get_tile_at(tx, ty, tz, Instant::now())
    }

    /// [`get_tile`](Self::get_tile) with an explicit timestamp.
    pub fn get_tile_at(&mut self, tx: u32, ty: u32, tz: u8, now: Instant) -> TileStatus {
        if !self.source.supports_zoom(tz) {
            return TileStatus::OutOfRange;
        }
        if let Some(builtin) = self.builtin {
            return TileStatus::Available(builtin.pixels());
        }

        let key = TileKey::new(Arc::clone(&self.source_name), tx, ty, tz);
        let (entry, created) = self.table.get_or_create(&key, now);

        if created {
            if !GeoRect::of_tile(tx, ty, tz).intersects(&self.source.coverage) {
                entry.state = TileState::Outside;
                trace!(key = %key, "Tile outside coverage");
                return TileStatus::Outside;
            }
            self.requests.push(TileRequest::new(key));
            return TileStatus::Loading;
        }

        match entry.state {
            TileState::Loading => TileStatus::Loading,
            TileState::Failed => TileStatus::Failed,
            TileState::Outside => TileStatus::Outside,
            TileState::Available => {
                entry.last_used = now;
                match &entry.pixels {
                    Some(pixels) => TileStatus::Available(Arc::clone(pixels)),
                    None => TileStatus::Failed,
                }
            }
        }
    }

    /// Apply worker results and run housekeeping if it is due.
    pub fn update(&mut self, now: Instant) {
        for result in self.results.drain() {
            let Some(entry) = self.table.get_mut(&result.key) else {
                trace!(key = %result.key, "Dropping result for evicted tile");
                continue;
            };
            let was_available = entry.state == TileState::Available;
            let key = result.key.clone();

            match result.pixels() {
                Some(pixels) => {
                    let pixels = Arc::new(pixels);
                    entry.set_available(Arc::clone(&pixels));
                    if let Some(observer) = self.observer.as_mut() {
                        if was_available {
                            observer.on_evicted(&key);
                        }
                        observer.on_available(&key, &pixels);
                    }
                }
                None => {
                    entry.set_failed();
                    if was_available {
                        if let Some(observer) = self.observer.as_mut() {
                            observer.on_evicted(&key);
                        }
                    }
                }
            }
        }

        let due = self
            .last_housekeeping
            .map_or(true, |last| now.saturating_duration_since(last) >= self.config.housekeeping_interval);
        if due {
            self.last_housekeeping = Some(now);
            self.housekeeping(now);
        }
    }

    /// Evict stale entries. LOADING entries are never evicted.
    fn housekeeping(&mut self, now: Instant) {
        let max_age_available = self.config.max_age_available;
        let max_age_failed = self.config.max_age_failed;
        let before = self.table.len();
        let mut released = Vec::new();

        self.table.retain(|entry| {
            let keep = match entry.state {
                TileState::Loading => true,
                TileState::Available => entry.age(now) <= max_age_available,
                TileState::Failed | TileState::Outside => entry.age(now) <= max_age_failed,
            };
            if !keep && entry.state == TileState::Available {
                released.push(entry.key.clone());
            }
            keep
        });

        if let Some(observer) = self.observer.as_mut() {
            for key in &released {
                observer.on_evicted(key);
            }
        }

        let evicted = before - self.table.len();
        if evicted > 0 {
            debug!(
                source = %self.source.name,
                evicted = evicted,
                remaining = self.table.len(),
                "Evicted stale tiles"
            );
        }
    }

    /// Number of requests waiting for a worker.
    pub fn queue_len(&self) -> usize {
        self.requests.len()
    }

    /// Number of entries in the tile table.
    pub fn tile_count(&self) -> usize {
        self.table.len()
    }

    /// Entries per state.
    pub fn stats(&self) -> TileCounts {
        self.table.counts()
    }

    /// Number of running worker threads.
    pub fn worker_count(&self) -> usize {
        self.pool.thread_count()
    }

    /// Human-readable dump of the tile table, sorted by key.
    ///
    /// ```text
    /// 2 textures
    /// osm-2-1-1                 AVAI    120
    /// osm-2-1-2                 LOAD     15
    /// ```
    pub fn debug_text(&self, now: Instant) -> String {
        let mut entries: Vec<_> = self
            .table
            .iter()
            .map(|entry| (entry.key.to_string(), entry.state, entry.age(now)))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        let mut text = format!("{} textures\n", entries.len());
        for (key, state, age) in entries {
            let _ = writeln!(text, "{:<25} {} {:>6}", key, state.code(), age.as_millis());
        }
        text
    }

    /// Pixels of a fixed placeholder image.
    pub fn placeholder(&self, placeholder: Placeholder) -> Arc<TilePixels> {
        placeholder.builtin().pixels()
    }

    /// Stop the worker threads. Called automatically on drop.
    pub fn shutdown(&mut self) {
        self.pool.shutdown();
    }
}

impl Drop for MapTiles {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn http_client(source: &MapSourceConfig) -> Result<ReqwestClient, FetchError> {
    ReqwestClient::new(source.effective_download_timeout())
}
