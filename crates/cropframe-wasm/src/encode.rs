//! JPEG encoding WASM bindings.
//!
//! Alpha is dropped; export rasters are always opaque.

use crate::types::JsRaster;
use cropframe_core::encode;
use cropframe_core::Raster;
use wasm_bindgen::prelude::*;

/// Encode RGBA pixel data to JPEG bytes.
///
/// # Arguments
///
/// * `pixels` - RGBA pixel data (4 bytes per pixel, row-major order)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `quality` - JPEG quality (1-100; the component exports at 95)
///
/// # Errors
///
/// Returns an error if the pixel data length doesn't match `width * height * 4`
/// or a dimension is zero.
#[wasm_bindgen]
pub fn encode_jpeg(pixels: Vec<u8>, width: u32, height: u32, quality: u8) -> Result<Vec<u8>, JsValue> {
    let raster =
        Raster::from_rgba(width, height, pixels).map_err(|e| JsValue::from_str(&e.to_string()))?;
    encode::encode_jpeg(&raster, quality).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Encode a [`JsRaster`] to JPEG bytes.
#[wasm_bindgen]
pub fn encode_jpeg_from_raster(image: &JsRaster, quality: u8) -> Result<Vec<u8>, JsValue> {
    encode::encode_jpeg(image.raster(), quality).map_err(|e| JsValue::from_str(&e.to_string()))
}


#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_encode_jpeg_basic() {
        let jpeg = encode_jpeg(vec![128u8; 20 * 20 * 4], 20, 20, 95).unwrap();
        assert_eq!(&jpeg[0..2], &[0xFF, 0xD8]);
    }

    #[wasm_bindgen_test]
    fn test_encode_jpeg_wrong_length() {
        assert!(encode_jpeg(vec![0u8; 10], 20, 20, 95).is_err());
    }
}
