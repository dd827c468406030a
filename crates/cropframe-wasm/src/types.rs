//! WASM-compatible wrapper types for image data.

use cropframe_core::Raster;
use wasm_bindgen::prelude::*;
use wasm_bindgen::Clamped;
use web_sys::ImageData;

/// An RGBA raster for JavaScript.
///
/// Pixels are 4 bytes each, row-major, the same layout as canvas `ImageData`.
///
/// # Memory Management
///
/// The pixel data lives in WASM memory. `pixels()` copies it out to a
/// `Uint8Array`; `to_image_data()` copies it into a fresh `ImageData` that can
/// go straight to `putImageData`.
#[wasm_bindgen]
pub struct JsRaster {
    inner: Raster,
}

#[wasm_bindgen]
impl JsRaster {
    /// Wrap RGBA pixel data (for example `ImageData.data` from a canvas).
    ///
    /// # Errors
    /// Returns an error if `pixels.length != width * height * 4`.
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<JsRaster, JsValue> {
        Raster::from_rgba(width, height, pixels)
            .map(JsRaster::from_raster)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Get the image width in pixels
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.inner.width
    }

    /// Get the image height in pixels
    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.inner.height
    }

    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.inner.pixels.len()
    }

    /// Returns a copy of the RGBA pixel data as `Uint8Array`.
    pub fn pixels(&self) -> Vec<u8> {
        self.inner.pixels.clone()
    }

    /// Copy the pixels into a canvas `ImageData`.
    pub fn to_image_data(&self) -> Result<ImageData, JsValue> {
        image_data(&self.inner)
    }
}

impl JsRaster {
    pub(crate) fn from_raster(raster: Raster) -> Self {
        Self { inner: raster }
    }

    pub(crate) fn raster(&self) -> &Raster {
        &self.inner
    }
}

/// Build an `ImageData` from a raster.
pub(crate) fn image_data(raster: &Raster) -> Result<ImageData, JsValue> {
    ImageData::new_with_u8_clamped_array_and_sh(
        Clamped(raster.pixels.as_slice()),
        raster.width,
        raster.height,
    )
}
