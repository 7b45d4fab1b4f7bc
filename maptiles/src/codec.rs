//! Tile image decoding.
//!
//! Tiles travel through the pipeline as encoded bytes (PNG or JPEG, as
//! served) and leave it as tightly packed RGBA8 pixels ready for upload.

use crate::provider::FetchError;
use image::RgbaImage;

/// Decoded tile pixels, 4 bytes per pixel, rows top to bottom.
#[derive(Clone, PartialEq, Eq)]
pub struct TilePixels {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// RGBA8 pixel data, `width * height * 4` bytes
    pub rgba: Vec<u8>,
}

impl TilePixels {
    /// Wraps an RGBA image.
    pub fn from_image(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            rgba: image.into_raw(),
        }
    }

    /// Converts back to an `RgbaImage`, e.g. for saving to a file.
    ///
    /// Returns `None` if the buffer length does not match the dimensions.
    pub fn to_image(&self) -> Option<RgbaImage> {
        RgbaImage::from_raw(self.width, self.height, self.rgba.clone())
    }

    /// Size of the pixel buffer in bytes.
    pub fn byte_len(&self) -> usize {
        self.rgba.len()
    }

    /// Returns the RGBA value at `(x, y)`, if inside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = ((y as usize) * (self.width as usize) + x as usize) * 4;
        self.rgba
            .get(offset..offset + 4)
            .map(|p| [p[0], p[1], p[2], p[3]])
    }
}

impl std::fmt::Debug for TilePixels {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TilePixels")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.rgba.len())
            .finish()
    }
}

/// Decode an encoded tile image into RGBA pixels.
///
/// The format is detected from the data. An empty or undecodable payload is
/// a [`FetchError::Decode`].
pub fn decode_tile(bytes: &[u8]) -> Result<TilePixels, FetchError> {
    if bytes.is_empty() {
        return Err(FetchError::Decode("empty image data".to_string()));
    }
    let image = image::load_from_memory(bytes)
        .map_err(|e| FetchError::Decode(format!("image decode error: {}", e)))?;
    Ok(TilePixels::from_image(image.to_rgba8()))
}
