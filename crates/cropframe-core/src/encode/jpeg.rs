//! JPEG encoding for exported rasters.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder};
use thiserror::Error;

use crate::raster::{Raster, CHANNELS};

/// Quality used for downloads and uploads (the browser's `0.95`).
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// Content type of the encoded export.
pub const JPEG_MIME_TYPE: &str = "image/jpeg";

/// Errors that can occur during JPEG encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 4), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// JPEG encoding failed
    #[error("JPEG encoding failed: {0}")]
    EncodingFailed(String),
}

/// Encode a raster to JPEG bytes, dropping its alpha channel.
///
/// `quality` is clamped to 1-100.
pub fn encode_jpeg(raster: &Raster, quality: u8) -> Result<Vec<u8>, EncodeError> {
    let (width, height) = (raster.width, raster.height);
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    let expected = width as usize * height as usize * CHANNELS;
    if raster.pixels.len() != expected {
        return Err(EncodeError::InvalidPixelData {
            expected,
            actual: raster.pixels.len(),
        });
    }

    let quality = quality.clamp(1, 100);
    let rgb = raster.to_rgb();

    let mut buffer = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut buffer, quality)
        .write_image(&rgb, width, height, ExtendedColorType::Rgb8)
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

    Ok(buffer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::Color;

    fn assert_jpeg_markers(bytes: &[u8]) {
        assert_eq!(&bytes[0..2], &[0xFF, 0xD8]);
        assert_eq!(&bytes[bytes.len() - 2..], &[0xFF, 0xD9]);
    }

    #[test]
    fn test_encode_basic() {
        let raster = Raster::filled(100, 100, Color::rgb(128, 128, 128));
        let bytes = encode_jpeg(&raster, DEFAULT_JPEG_QUALITY).unwrap();
        assert_jpeg_markers(&bytes);
    }

    #[test]
    fn test_encode_ignores_alpha() {
        let raster = Raster::filled(8, 8, Color::rgba(10, 200, 30, 0));
        let bytes = encode_jpeg(&raster, 90).unwrap();
        assert_jpeg_markers(&bytes);
    }

    #[test]
    fn test_encode_quality_clamping() {
        let raster = Raster::filled(10, 10, Color::default());
        assert!(encode_jpeg(&raster, 0).is_ok());
        assert!(encode_jpeg(&raster, 255).is_ok());
    }

    #[test]
    fn test_encode_zero_dimensions() {
        let raster = Raster {
            width: 0,
            height: 10,
            pixels: vec![],
        };
        assert!(matches!(
            encode_jpeg(&raster, 90),
            Err(EncodeError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_encode_mismatched_buffer() {
        let raster = Raster {
            width: 10,
            height: 10,
            pixels: vec![0; 10 * 10 * 3],
        };
        assert!(matches!(
            encode_jpeg(&raster, 90),
            Err(EncodeError::InvalidPixelData {
                expected: 400,
                actual: 300
            })
        ));
    }

    #[test]
    fn test_encode_decodes_back() {
        let raster = Raster::filled(16, 12, Color::rgb(200, 40, 40));
        let bytes = encode_jpeg(&raster, 95).unwrap();
        let decoded = crate::decode::decode_image(&bytes).unwrap();
        assert_eq!((decoded.width, decoded.height), (16, 12));
        let [r, g, b, a] = decoded.pixel(8, 6);
        assert!((r as i32 - 200).abs() <= 4);
        assert!((g as i32 - 40).abs() <= 4);
        assert!((b as i32 - 40).abs() <= 4);
        assert_eq!(a, 255);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
