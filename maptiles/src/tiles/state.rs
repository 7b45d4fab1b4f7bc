//! Tile state table.
//!
//! The table is owned by the thread that drives [`MapTiles`](super::MapTiles)
//! and has no internal locking. Workers never see it; they report back
//! through the data queue.

use crate::codec::TilePixels;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// Unique key of a tile: source name, zoom, row and column.
///
/// Displays as `"{source}-{z}-{y}-{x}"`.
///
/// # Example
///
/// ```
/// use maptiles::tiles::TileKey;
///
/// let key = TileKey::new("src", 1, 1, 2);
/// assert_eq!(key.to_string(), "src-2-1-1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TileKey {
    source: Arc<str>,
    tz: u8,
    ty: u32,
    tx: u32,
}

impl TileKey {
    /// Create the key of tile `(tx, ty)` at zoom `tz`.
    pub fn new(source: impl Into<Arc<str>>, tx: u32, ty: u32, tz: u8) -> Self {
        Self {
            source: source.into(),
            tz,
            ty,
            tx,
        }
    }

    /// Source name.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Tile column.
    pub fn tx(&self) -> u32 {
        self.tx
    }

    /// Tile row.
    pub fn ty(&self) -> u32 {
        self.ty
    }

    /// Zoom level.
    pub fn tz(&self) -> u8 {
        self.tz
    }
}

impl fmt::Display for TileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}-{}", self.source, self.tz, self.ty, self.tx)
    }
}

/// Classification of a tile in the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileState {
    /// Requested, waiting for a worker result
    Loading,
    /// Decoded pixels are present
    Available,
    /// Fetch or decode failed
    Failed,
    /// Tile lies outside the source's coverage
    Outside,
}

impl TileState {
    /// Four-letter code used in debug output.
    pub fn code(self) -> &'static str {
        match self {
            TileState::Loading => "LOAD",
            TileState::Available => "AVAI",
            TileState::Failed => "FAIL",
            TileState::Outside => "OUTS",
        }
    }
}

impl fmt::Display for TileState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One tile in the table.
#[derive(Debug, Clone)]
pub struct TileEntry {
    pub key: TileKey,
    pub tx: u32,
    pub ty: u32,
    pub tz: u8,
    pub state: TileState,
    /// Last time the tile was handed out (or created)
    pub last_used: Instant,
    /// Decoded pixels, present only when AVAILABLE
    pub pixels: Option<Arc<TilePixels>>,
}

impl TileEntry {
    fn new(key: TileKey, now: Instant) -> Self {
        Self {
            tx: key.tx,
            ty: key.ty,
            tz: key.tz,
            key,
            state: TileState::Loading,
            last_used: now,
            pixels: None,
        }
    }

    /// Store decoded pixels and mark the tile AVAILABLE.
    pub fn set_available(&mut self, pixels: Arc<TilePixels>) {
        self.state = TileState::Available;
        self.pixels = Some(pixels);
    }

    /// Mark the tile FAILED and drop any pixels.
    pub fn set_failed(&mut self) {
        self.state = TileState::Failed;
        self.pixels = None;
    }

    /// Time since the tile was last used, saturating at zero.
    pub fn age(&self, now: Instant) -> std::time::Duration {
        now.saturating_duration_since(self.last_used)
    }
}

/// Number of entries per state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TileCounts {
    pub loading: usize,
    pub available: usize,
    pub failed: usize,
    pub outside: usize,
}

impl TileCounts {
    /// Total number of entries.
    pub fn total(&self) -> usize {
        self.loading + self.available + self.failed + self.outside
    }
}

/// Map from tile key to entry.
#[derive(Debug, Default)]
pub struct TileTable {
    entries: HashMap<TileKey, TileEntry>,
}

impl TileTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up `key`, creating a LOADING entry stamped `now` if absent.
    ///
    /// Returns the entry and whether it was just created.
    pub fn get_or_create(&mut self, key: &TileKey, now: Instant) -> (&mut TileEntry, bool) {
        let mut created = false;
        let entry = self.entries.entry(key.clone()).or_insert_with(|| {
            created = true;
            TileEntry::new(key.clone(), now)
        });
        (entry, created)
    }

    pub fn get(&self, key: &TileKey) -> Option<&TileEntry> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &TileKey) -> Option<&mut TileEntry> {
        self.entries.get_mut(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TileEntry> {
        self.entries.values()
    }

    /// Keep only the entries for which `keep` returns true.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&TileEntry) -> bool,
    {
        self.entries.retain(|_, entry| keep(entry));
    }

    /// Count entries per state.
    pub fn counts(&self) -> TileCounts {
        let mut counts = TileCounts::default();
        for entry in self.entries.values() {
            match entry.state {
                TileState::Loading => counts.loading += 1,
                TileState::Available => counts.available += 1,
                TileState::Failed => counts.failed += 1,
                TileState::Outside => counts.outside += 1,
            }
        }
        counts
    }
}
