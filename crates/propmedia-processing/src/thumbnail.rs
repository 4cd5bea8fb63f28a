//! Thumbnail generator - downscale and JPEG re-encode

use image::imageops::FilterType;
use image::{codecs::jpeg::JpegEncoder, GenericImageView, ImageReader};
use propmedia_core::constants;
use std::io::Cursor;

#[derive(Debug, thiserror::Error)]
pub enum ThumbnailError {
    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Failed to encode thumbnail: {0}")]
    Encode(String),
}

/// A generated thumbnail. Always JPEG regardless of the source format.
#[derive(Debug, Clone)]
pub struct Thumbnail {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Downscales images to fit within a bounding box, preserving aspect ratio.
///
/// Scaling is down-only: an image already inside the box is re-encoded at
/// its native dimensions, never upscaled.
pub struct ThumbnailGenerator {
    max_width: u32,
    max_height: u32,
    jpeg_quality: u8,
}

impl ThumbnailGenerator {
    pub fn new(max_width: u32, max_height: u32, jpeg_quality: u8) -> Self {
        Self {
            max_width,
            max_height,
            jpeg_quality,
        }
    }

    pub fn generate(&self, data: &[u8]) -> Result<Thumbnail, ThumbnailError> {
        let reader = ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| ThumbnailError::Decode(e.to_string()))?;

        let img = reader
            .decode()
            .map_err(|e| ThumbnailError::Decode(e.to_string()))?;

        let (width, height) = img.dimensions();

        let img = if width > self.max_width || height > self.max_height {
            img.resize(self.max_width, self.max_height, FilterType::Triangle)
        } else {
            img
        };

        // JPEG has no alpha channel; flatten before encoding.
        let rgb = img.to_rgb8();
        let (out_width, out_height) = rgb.dimensions();

        let mut buffer = Vec::new();
        let mut encoder = JpegEncoder::new_with_quality(&mut buffer, self.jpeg_quality);
        encoder
            .encode_image(&rgb)
            .map_err(|e| ThumbnailError::Encode(e.to_string()))?;

        tracing::debug!(
            src_width = width,
            src_height = height,
            out_width,
            out_height,
            out_bytes = buffer.len(),
            "Thumbnail generated"
        );

        Ok(Thumbnail {
            data: buffer,
            width: out_width,
            height: out_height,
        })
    }
}

impl Default for ThumbnailGenerator {
    fn default() -> Self {
        Self::new(
            constants::THUMBNAIL_MAX_WIDTH,
            constants::THUMBNAIL_MAX_HEIGHT,
            constants::THUMBNAIL_JPEG_QUALITY,
        )
    }
}
