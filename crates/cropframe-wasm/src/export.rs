//! Export WASM bindings.
//!
//! Exports run in two phases so the UI can paint its busy state first:
//!
//! ```typescript
//! const job = session.begin_export(JsExportAction.Download);
//! button.disabled = true;
//! await new Promise(requestAnimationFrame);
//! try {
//!   const result = job.run();
//!   const blob = new Blob([result.jpeg()], { type: result.content_type });
//!   saveAs(blob, result.filename);
//! } finally {
//!   button.disabled = false;
//! }
//! ```
//!
//! The action stays busy until the job is run or freed.

use cropframe_core::{ExportAction, ExportJob, ExportOutput};
use js_sys::Uint8ClampedArray;
use serde::Serialize;
use wasm_bindgen::prelude::*;
use web_sys::ImageData;

use crate::types::image_data;

/// The two guarded export actions.
#[wasm_bindgen]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsExportAction {
    Download = 0,
    Upload = 1,
}

impl From<JsExportAction> for ExportAction {
    fn from(action: JsExportAction) -> Self {
        match action {
            JsExportAction::Download => ExportAction::Download,
            JsExportAction::Upload => ExportAction::Upload,
        }
    }
}

/// A marker coordinate as seen by JavaScript.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub(crate) struct PointJs {
    pub x: f64,
    pub y: f64,
}

pub(crate) fn points_to_js(points: &[(i64, i64)]) -> Vec<PointJs> {
    points
        .iter()
        .map(|&(x, y)| PointJs {
            x: x as f64,
            y: y as f64,
        })
        .collect()
}

/// A frozen export waiting to be rendered.
#[wasm_bindgen]
pub struct JsExportJob {
    inner: ExportJob,
}

#[wasm_bindgen]
impl JsExportJob {
    /// Render the export. Consumes the job and releases the busy flag.
    pub fn run(self) -> Result<JsExportResult, JsValue> {
        self.inner
            .run()
            .map(JsExportResult::from_output)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Drop the job without rendering; the busy flag is released.
    pub fn cancel(self) {}

    #[wasm_bindgen(getter)]
    pub fn action(&self) -> JsExportAction {
        match self.inner.action() {
            ExportAction::Download => JsExportAction::Download,
            ExportAction::Upload => JsExportAction::Upload,
        }
    }
}

impl JsExportJob {
    pub(crate) fn from_job(job: ExportJob) -> Self {
        Self { inner: job }
    }
}

/// A finished export: the window-sized raster plus the marker points.
#[wasm_bindgen]
pub struct JsExportResult {
    inner: ExportOutput,
}

#[wasm_bindgen]
impl JsExportResult {
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.inner.raster.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.inner.raster.height
    }

    /// `"Processed <name>.jpg"`.
    #[wasm_bindgen(getter)]
    pub fn filename(&self) -> String {
        self.inner.filename.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn content_type(&self) -> String {
        cropframe_core::encode::JPEG_MIME_TYPE.to_string()
    }

    /// RGBA pixels as a `Uint8ClampedArray`, ready for `new ImageData(...)`.
    pub fn pixels(&self) -> Uint8ClampedArray {
        Uint8ClampedArray::from(self.inner.raster.pixels.as_slice())
    }

    pub fn to_image_data(&self) -> Result<ImageData, JsValue> {
        image_data(&self.inner.raster)
    }

    /// Marker points as `[{x, y}, ...]`, rounded, in marker order.
    pub fn points(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&points_to_js(&self.inner.points))
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// JPEG bytes at the session's quality.
    pub fn jpeg(&self) -> Result<Vec<u8>, JsValue> {
        self.inner
            .encode_jpeg()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Build a `FormData` from this: `[[name, value], ...]` text fields after
    /// the `image` part.
    pub fn upload_fields(&self) -> Result<JsValue, JsValue> {
        let fields = self.inner.form_fields();
        serde_wasm_bindgen::to_value(&fields).map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

impl JsExportResult {
    pub(crate) fn from_output(output: ExportOutput) -> Self {
        Self { inner: output }
    }
}
