//! Image decoding for texture resources

use crate::assets::LoadError;
use crate::foundation::logging::debug;

/// Tightly packed RGBA8 pixels of a decoded texture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    /// Row-major pixels, four bytes each
    pub data: Vec<u8>,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Channels per pixel, 4 after decoding
    pub channels: u8,
}

impl ImageData {
    /// Decode an encoded image held in memory
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LoadError> {
        let decoded = image::load_from_memory(bytes)
            .map_err(|e| LoadError::Decode(format!("failed to decode image: {}", e)))?;

        // RGBA8 is what every texture upload expects
        let pixels = decoded.to_rgba8();
        let (width, height) = pixels.dimensions();

        debug!("Decoded image {}x{}", width, height);

        Ok(Self {
            data: pixels.into_raw(),
            width,
            height,
            channels: 4,
        })
    }

    /// Single-color image, used for placeholder textures
    pub fn solid_color(width: u32, height: u32, color: [u8; 4]) -> Self {
        let pixel_count = width as usize * height as usize;
        Self {
            data: color.repeat(pixel_count),
            width,
            height,
            channels: 4,
        }
    }

    /// Byte length of `data`
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    /// Both sides are powers of two
    pub fn is_power_of_two(&self) -> bool {
        self.width.is_power_of_two() && self.height.is_power_of_two()
    }
}
