//! WASM bindings for the crop session.
//!
//! The UI forwards every pointer event and slider change here, then redraws
//! from `preview()` (or `preview_css()`) and `marker_positions()`.

use cropframe_core::{
    CropSession, ExportAction, MarkerAction, PointerOutcome, PreviewTransform, SessionConfig,
};
use serde::Serialize;
use wasm_bindgen::prelude::*;
use web_sys::ImageData;

use crate::export::{points_to_js, JsExportAction, JsExportJob, JsExportResult, PointJs};
use crate::types::{image_data, JsRaster};

/// Outcome of a pointer or marker event, as seen by JavaScript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
struct EventResultJs {
    kind: &'static str,
    marker: Option<usize>,
}

impl From<PointerOutcome> for EventResultJs {
    fn from(outcome: PointerOutcome) -> Self {
        let (kind, marker) = match outcome {
            PointerOutcome::Ignored => ("ignored", None),
            PointerOutcome::PanStarted => ("panStarted", None),
            PointerOutcome::MarkerGrabbed(i) => ("markerGrabbed", Some(i)),
            PointerOutcome::Panned => ("panned", None),
            PointerOutcome::MarkerMoved(i) => ("markerMoved", Some(i)),
            PointerOutcome::MarkerPlaced(i) => ("markerPlaced", Some(i)),
            PointerOutcome::Released(_) => ("released", None),
        };
        Self { kind, marker }
    }
}

impl From<MarkerAction> for EventResultJs {
    fn from(action: MarkerAction) -> Self {
        let (kind, marker) = match action {
            MarkerAction::Dragging(i) => ("dragging", Some(i)),
            MarkerAction::Placed(i) => ("placed", Some(i)),
            MarkerAction::Ignored => ("ignored", None),
        };
        Self { kind, marker }
    }
}

/// CSS transform for the preview `<img>`, applied about its center.
fn css_transform(preview: &PreviewTransform) -> String {
    format!(
        "translate({}px, {}px) rotate({}deg) scale({})",
        preview.translate_x, preview.translate_y, preview.rotate_degrees, preview.scale
    )
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// A crop component session.
///
/// # Example (TypeScript)
///
/// ```typescript
/// const session = new JsCropSession({ width: 300, height: 200, backgroundColor: '#bebebe' });
/// session.load_image_bytes(bytes, file.name);
///
/// canvas.onpointerdown = (e) => session.pointer_down(e.offsetX, e.offsetY, e.timeStamp);
/// canvas.onpointermove = (e) => session.pointer_move(e.offsetX, e.offsetY);
/// canvas.onpointerup = (e) => session.pointer_up(e.offsetX, e.offsetY, e.timeStamp);
/// scaleSlider.oninput = () => session.set_scale_slider(+scaleSlider.value);
/// img.style.transform = session.preview_css();
/// ```
#[wasm_bindgen]
pub struct JsCropSession {
    inner: CropSession,
}

#[wasm_bindgen]
impl JsCropSession {
    /// Create a session from an options object. `undefined` uses the defaults.
    ///
    /// # Errors
    /// Returns an error if the options cannot be read or are invalid.
    #[wasm_bindgen(constructor)]
    pub fn new(options: JsValue) -> Result<JsCropSession, JsValue> {
        let config: SessionConfig = if options.is_undefined() || options.is_null() {
            SessionConfig::default()
        } else {
            serde_wasm_bindgen::from_value(options)
                .map_err(|e| JsValue::from_str(&format!("Invalid session options: {}", e)))?
        };
        JsCropSession::with_config(config).map_err(js_error)
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.inner.window().width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.inner.window().height
    }

    /// Window background as `#rrggbb` or `#rrggbbaa`.
    #[wasm_bindgen(getter)]
    pub fn background_color(&self) -> String {
        self.inner.background().to_hex()
    }

    #[wasm_bindgen(getter)]
    pub fn has_image(&self) -> bool {
        self.inner.has_image()
    }

    #[wasm_bindgen(getter)]
    pub fn filename(&self) -> Option<String> {
        self.inner.filename().map(str::to_string)
    }

    pub fn load_image(&mut self, image: &JsRaster, filename: &str) -> Result<(), JsValue> {
        self.inner
            .load_image(image.raster().clone(), filename)
            .map_err(js_error)
    }

    /// Decode file bytes and load them.
    pub fn load_image_bytes(&mut self, bytes: &[u8], filename: &str) -> Result<(), JsValue> {
        self.inner.load_image_bytes(bytes, filename).map_err(js_error)
    }

    pub fn reset(&mut self) -> Result<(), JsValue> {
        self.inner.reset().map_err(js_error)
    }

    pub fn clear_markers(&mut self) {
        self.inner.clear_markers();
    }

    pub fn set_scale(&mut self, scale: f64) -> Result<(), JsValue> {
        self.inner.set_scale(scale).map_err(js_error)
    }

    /// Slider position in `[0, 1]`, mapped to `10^value`.
    pub fn set_scale_slider(&mut self, value: f64) -> Result<(), JsValue> {
        self.inner.set_scale_slider(value).map_err(js_error)
    }

    /// Rotation as a half-turn fraction (`0.5` = 90 degrees clockwise).
    pub fn set_rotation(&mut self, rotation: f64) -> Result<(), JsValue> {
        self.inner.set_rotation(rotation).map_err(js_error)
    }

    pub fn pan(&mut self, dx: f64, dy: f64) -> Result<(), JsValue> {
        self.inner.pan(dx, dy).map_err(js_error)
    }

    #[wasm_bindgen(getter)]
    pub fn scale(&self) -> Option<f64> {
        self.inner.transform().map(|t| t.scale())
    }

    #[wasm_bindgen(getter)]
    pub fn scale_slider(&self) -> Option<f64> {
        self.inner.scale_slider()
    }

    #[wasm_bindgen(getter)]
    pub fn rotation(&self) -> Option<f64> {
        self.inner.transform().map(|t| t.rotation())
    }

    #[wasm_bindgen(getter)]
    pub fn offset_x(&self) -> Option<f64> {
        self.inner.transform().map(|t| t.offset_x())
    }

    #[wasm_bindgen(getter)]
    pub fn offset_y(&self) -> Option<f64> {
        self.inner.transform().map(|t| t.offset_y())
    }

    /// Returns `{ kind, marker }`.
    pub fn pointer_down(&mut self, x: f64, y: f64, time_ms: f64) -> Result<JsValue, JsValue> {
        let outcome = self.inner.pointer_down(x, y, time_ms).map_err(js_error)?;
        to_js(&EventResultJs::from(outcome))
    }

    /// Returns `{ kind, marker }`.
    pub fn pointer_move(&mut self, x: f64, y: f64) -> Result<JsValue, JsValue> {
        let outcome = self.inner.pointer_move(x, y).map_err(js_error)?;
        to_js(&EventResultJs::from(outcome))
    }

    /// Returns `{ kind, marker }`; `kind == "markerPlaced"` after a click.
    pub fn pointer_up(&mut self, x: f64, y: f64, time_ms: f64) -> Result<JsValue, JsValue> {
        let outcome = self.inner.pointer_up(x, y, time_ms).map_err(js_error)?;
        to_js(&EventResultJs::from(outcome))
    }

    pub fn pointer_cancel(&mut self) {
        self.inner.pointer_cancel();
    }

    /// Returns `{ kind, marker }` with `kind` one of `dragging`, `placed`, `ignored`.
    pub fn place_or_drag_marker(&mut self, x: f64, y: f64) -> Result<JsValue, JsValue> {
        to_js(&EventResultJs::from(self.inner.place_or_drag_marker(x, y)))
    }

    pub fn drag_marker(&mut self, index: usize, dx: f64, dy: f64) -> bool {
        self.inner.drag_marker(index, dx, dy)
    }

    #[wasm_bindgen(getter)]
    pub fn marker_count(&self) -> usize {
        self.inner.markers().len()
    }

    #[wasm_bindgen(getter)]
    pub fn marker_radius(&self) -> f64 {
        self.inner.markers().radius()
    }

    /// Unrounded marker positions `[{x, y}, ...]` for drawing the overlay.
    pub fn marker_positions(&self) -> Result<JsValue, JsValue> {
        to_js(&self.marker_positions_js())
    }

    /// Rounded marker points `[{x, y}, ...]` as they would be exported.
    pub fn marker_points(&self) -> Result<JsValue, JsValue> {
        to_js(&points_to_js(&self.inner.marker_points()))
    }

    /// `{ translate_x, translate_y, rotate_degrees, scale }`, or `undefined` without an image.
    pub fn preview(&self) -> Result<JsValue, JsValue> {
        match self.inner.preview() {
            Some(preview) => to_js(&preview),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    /// CSS `transform` value for the preview image.
    pub fn preview_css(&self) -> Option<String> {
        self.inner.preview().as_ref().map(css_transform)
    }

    /// Window-sized pixel preview.
    pub fn render_preview(&self) -> Result<JsRaster, JsValue> {
        self.inner
            .render_preview()
            .map(JsRaster::from_raster)
            .map_err(js_error)
    }

    pub fn preview_image_data(&self) -> Result<ImageData, JsValue> {
        let raster = self.inner.render_preview().map_err(js_error)?;
        image_data(&raster)
    }

    pub fn is_busy(&self, action: JsExportAction) -> bool {
        self.inner.is_busy(ExportAction::from(action))
    }

    /// Mark `action` busy and freeze the current state into a job.
    ///
    /// # Errors
    /// Returns an error without an image or while `action` is already busy.
    pub fn begin_export(&self, action: JsExportAction) -> Result<JsExportJob, JsValue> {
        self.inner
            .begin_export(ExportAction::from(action))
            .map(JsExportJob::from_job)
            .map_err(js_error)
    }

    /// Both export phases in one call.
    pub fn export_raster(&self) -> Result<JsExportResult, JsValue> {
        self.inner
            .export_raster()
            .map(JsExportResult::from_output)
            .map_err(js_error)
    }
}

impl JsCropSession {
    pub(crate) fn with_config(config: SessionConfig) -> Result<Self, cropframe_core::SessionError> {
        Ok(Self {
            inner: CropSession::new(config)?,
        })
    }

    fn marker_positions_js(&self) -> Vec<PointJs> {
        self.inner
            .markers()
            .iter()
            .map(|m| PointJs { x: m.x, y: m.y })
            .collect()
    }
}
