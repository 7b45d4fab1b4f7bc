//! Tile fetch-and-cache pipeline.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Map view (render loop)                      │
//! │        get_tile() per visible tile, update() per frame      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        MapTiles                             │
//! │  - Tile table (owned, no locking)                           │
//! │  - Coverage and zoom checks                                 │
//! │  - Housekeeping (age-based eviction)                        │
//! └─────────────────────────────────────────────────────────────┘
//!            │ RequestQueue                  ▲ DataQueue
//!            ▼                               │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                WorkerPool (tiles0..tilesN)                  │
//! │   disk cache ─▶ download ─▶ decode ─▶ persist               │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! A tile is LOADING from its first request until a worker reports back,
//! then AVAILABLE or FAILED. Tiles outside the source's coverage are
//! OUTSIDE and never requested. Housekeeping removes AVAILABLE tiles that
//! have not been used for a while and FAILED/OUTSIDE tiles after a longer
//! period, which is also how failed tiles get retried.

mod facade;
mod fetcher;
mod queue;
mod state;
mod worker;

pub use facade::{MapTiles, MapTilesConfig, MapTilesError, Placeholder, TileObserver, TileStatus};
pub use fetcher::TileFetcher;
pub use queue::{DataQueue, Dequeued, RequestQueue, TileRequest, TileResult, DEFAULT_MAX_TILES_IN_QUEUE};
pub use state::{TileCounts, TileEntry, TileKey, TileState, TileTable};
pub use worker::{FetchWorker, WorkerPool};
