//! Image decoding WASM bindings.
//!
//! # Example
//!
//! ```typescript
//! import { decode_image } from '@cropframe/wasm';
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const image = decode_image(bytes);
//! console.log(`Decoded ${image.width}x${image.height}`);
//! ```

use crate::types::JsRaster;
use cropframe_core::decode;
use wasm_bindgen::prelude::*;

/// Decode an image file (JPEG or PNG) to an RGBA raster.
///
/// EXIF orientation is applied, so the raster is upright.
///
/// # Errors
///
/// Returns an error if the format is not recognized or the file is corrupted.
#[wasm_bindgen]
pub fn decode_image(bytes: &[u8]) -> Result<JsRaster, JsValue> {
    decode::decode_image(bytes)
        .map(JsRaster::from_raster)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_decode_empty_fails() {
        assert!(decode_image(&[]).is_err());
    }

    #[wasm_bindgen_test]
    fn test_decode_encoded_jpeg() {
        let raster = cropframe_core::Raster::filled(8, 6, cropframe_core::Color::rgb(90, 90, 90));
        let jpeg = cropframe_core::encode::encode_jpeg(&raster, 90).unwrap();
        let image = decode_image(&jpeg).unwrap();
        assert_eq!((image.width(), image.height()), (8, 6));
    }
}
