//! Built-in placeholder tiles.
//!
//! Four fixed images stand in for tiles that are not (yet) available: a
//! loading pattern, a failure marker, an "outside coverage" hatch and a test
//! grid. They are generated in memory on first use and shared afterwards.
//! Sources whose URL uses the `builtin://` pseudo-scheme are served from
//! these images directly.

use crate::codec::TilePixels;
use image::{Rgba, RgbaImage};
use std::sync::{Arc, OnceLock};

/// Edge length of the generated placeholder images.
pub const BUILTIN_TILE_SIZE: u32 = 256;

/// One of the fixed placeholder images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinTile {
    /// `tileload.png`, shown while a tile is loading
    Load,
    /// `tilefail.png`, shown for failed tiles
    Fail,
    /// `tilenope.png`, shown outside coverage or zoom range
    Nope,
    /// `tiletest.png`, a test grid
    Test,
}

impl BuiltinTile {
    /// All built-in tiles.
    pub const ALL: [BuiltinTile; 4] = [
        BuiltinTile::Load,
        BuiltinTile::Fail,
        BuiltinTile::Nope,
        BuiltinTile::Test,
    ];

    /// Looks up a built-in tile by its file name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "tileload.png" => Some(BuiltinTile::Load),
            "tilefail.png" => Some(BuiltinTile::Fail),
            "tilenope.png" => Some(BuiltinTile::Nope),
            "tiletest.png" => Some(BuiltinTile::Test),
            _ => None,
        }
    }

    /// The file name used in `builtin://` URLs.
    pub fn name(self) -> &'static str {
        match self {
            BuiltinTile::Load => "tileload.png",
            BuiltinTile::Fail => "tilefail.png",
            BuiltinTile::Nope => "tilenope.png",
            BuiltinTile::Test => "tiletest.png",
        }
    }

    /// Returns the shared pixels of this image.
    pub fn pixels(self) -> Arc<TilePixels> {
        static LOAD: OnceLock<Arc<TilePixels>> = OnceLock::new();
        static FAIL: OnceLock<Arc<TilePixels>> = OnceLock::new();
        static NOPE: OnceLock<Arc<TilePixels>> = OnceLock::new();
        static TEST: OnceLock<Arc<TilePixels>> = OnceLock::new();

        let cell = match self {
            BuiltinTile::Load => &LOAD,
            BuiltinTile::Fail => &FAIL,
            BuiltinTile::Nope => &NOPE,
            BuiltinTile::Test => &TEST,
        };
        Arc::clone(cell.get_or_init(|| Arc::new(TilePixels::from_image(self.render()))))
    }

    fn render(self) -> RgbaImage {
        let size = BUILTIN_TILE_SIZE;
        match self {
            // Soft checkerboard
            BuiltinTile::Load => RgbaImage::from_fn(size, size, |x, y| {
                if ((x / 32) + (y / 32)) % 2 == 0 {
                    Rgba([200, 200, 200, 255])
                } else {
                    Rgba([225, 225, 225, 255])
                }
            }),
            // Pale red with a dark red cross
            BuiltinTile::Fail => RgbaImage::from_fn(size, size, |x, y| {
                let on_cross = x.abs_diff(y) < 4 || x.abs_diff(size - 1 - y) < 4;
                if on_cross {
                    Rgba([160, 20, 20, 255])
                } else {
                    Rgba([240, 200, 200, 255])
                }
            }),
            // Grey diagonal hatching
            BuiltinTile::Nope => RgbaImage::from_fn(size, size, |x, y| {
                if (x + y) % 16 < 2 {
                    Rgba([150, 150, 150, 255])
                } else {
                    Rgba([210, 210, 210, 255])
                }
            }),
            // White with a blue grid and a red border
            BuiltinTile::Test => RgbaImage::from_fn(size, size, |x, y| {
                if x == 0 || y == 0 || x == size - 1 || y == size - 1 {
                    Rgba([220, 0, 0, 255])
                } else if x % 64 == 0 || y % 64 == 0 {
                    Rgba([0, 0, 200, 255])
                } else {
                    Rgba([255, 255, 255, 255])
                }
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_roundtrip() {
        for tile in BuiltinTile::ALL {
            assert_eq!(BuiltinTile::from_name(tile.name()), Some(tile));
        }
        assert_eq!(BuiltinTile::from_name("tile.png"), None);
    }

    #[test]
    fn test_pixels_have_expected_size() {
        for tile in BuiltinTile::ALL {
            let pixels = tile.pixels();
            assert_eq!(pixels.width, BUILTIN_TILE_SIZE);
            assert_eq!(pixels.height, BUILTIN_TILE_SIZE);
            assert_eq!(
                pixels.byte_len(),
                (BUILTIN_TILE_SIZE * BUILTIN_TILE_SIZE * 4) as usize
            );
        }
    }

    #[test]
    fn test_pixels_are_shared() {
        let a = BuiltinTile::Fail.pixels();
        let b = BuiltinTile::Fail.pixels();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_images_differ() {
        let load = BuiltinTile::Load.pixels();
        let fail = BuiltinTile::Fail.pixels();
        assert_ne!(load.rgba, fail.rgba);
        assert_eq!(BuiltinTile::Test.pixels().pixel(0, 0), Some([220, 0, 0, 255]));
    }
}
