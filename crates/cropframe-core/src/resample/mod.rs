//! Export rendering: frozen transform + source raster -> exact-size output.
//!
//! # Pipeline
//!
//! 1. **Placement** ([`place_source`]): allocate a working surface of
//!    `round(dst_w / s) x round(dst_h / s)` where `s = base_scale * scale`,
//!    fill it with the background, and draw the source rotated and panned at
//!    its native resolution. No resampling loss happens here.
//! 2. **Hermite** ([`resample_hermite`]): area-resample the working surface
//!    down (or up) to exactly `dst_w x dst_h`.
//!
//! The live preview uses placement only, drawing straight at window size.

mod hermite;
mod place;

pub use hermite::{hermite_weight, resample_hermite};
pub use place::{place_source, Placement};

use crate::decode::DecodeError;
use crate::raster::{Color, Raster};
use crate::transform::{CropWindow, TransformError, TransformState};

/// Upper bound on the working surface, in pixels.
///
/// A tiny scale makes the working surface enormous; refuse instead of
/// attempting the allocation.
pub const MAX_WORKING_PIXELS: u64 = 1 << 28;

/// Everything the renderer needs, frozen at export time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderParams {
    pub window: CropWindow,
    /// Clockwise rotation in radians.
    pub angle: f64,
    /// Combined scale `base_scale * scale`.
    pub scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,
    /// Fill for uncovered pixels. Its alpha is ignored.
    pub background: Color,
}

impl RenderParams {
    /// Freeze the current transform.
    pub fn from_state(state: &TransformState, background: Color) -> Self {
        let params = state.params();
        Self {
            window: state.window(),
            angle: params.angle_radians(),
            scale: state.effective_scale(),
            offset_x: params.offset_x,
            offset_y: params.offset_y,
            background,
        }
    }

    /// Reject parameters the renderer cannot honor. Nothing is clamped.
    pub fn validate(&self) -> Result<(), TransformError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(TransformError::InvalidTransform(format!(
                "window must have an area, got {}x{}",
                self.window.width, self.window.height
            )));
        }
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(TransformError::InvalidTransform(format!(
                "scale must be finite and positive, got {}",
                self.scale
            )));
        }
        if !self.angle.is_finite() {
            return Err(TransformError::InvalidTransform(format!(
                "rotation must be finite, got {}",
                self.angle
            )));
        }
        if !self.offset_x.is_finite() || !self.offset_y.is_finite() {
            return Err(TransformError::InvalidTransform(format!(
                "offset must be finite, got ({}, {})",
                self.offset_x, self.offset_y
            )));
        }
        Ok(())
    }
}

/// Size of the stage-one working surface for `window` at combined `scale`.
pub fn working_size(window: CropWindow, scale: f64) -> (u32, u32) {
    let w = (window.width as f64 / scale).round().max(1.0);
    let h = (window.height as f64 / scale).round().max(1.0);
    (w as u32, h as u32)
}

/// Reject sources the sampler cannot index.
fn check_source(source: &Raster) -> Result<(), TransformError> {
    if source.is_empty() {
        return Err(TransformError::InvalidImage {
            width: source.width,
            height: source.height,
        });
    }
    if let Err(DecodeError::InvalidPixelData { expected, actual }) = source.check_pixels() {
        return Err(TransformError::InvalidPixelData { expected, actual });
    }
    Ok(())
}

/// Render the export raster: exact placement, then Hermite resampling.
///
/// The background is drawn with full alpha, so the output is always opaque.
pub fn render_export(source: &Raster, params: &RenderParams) -> Result<Raster, TransformError> {
    params.validate()?;
    check_source(source)?;

    let s = params.scale;
    let (dst_w, dst_h) = (params.window.width, params.window.height);
    let (work_w, work_h) = working_size(params.window, s);
    if work_w as u64 * work_h as u64 > MAX_WORKING_PIXELS {
        return Err(TransformError::InvalidTransform(format!(
            "working surface {work_w}x{work_h} is too large"
        )));
    }

    let placement = Placement {
        origin_x: dst_w as f64 / s / 2.0 + params.offset_x / s,
        origin_y: dst_h as f64 / s / 2.0 + params.offset_y / s,
        angle: params.angle,
        scale: 1.0,
    };
    let working = place_source(source, work_w, work_h, &placement, params.background.opaque());

    // Fast path: the working surface already has the target size
    if work_w == dst_w && work_h == dst_h {
        return Ok(working);
    }

    Ok(resample_hermite(&working, dst_w, dst_h))
}

/// Render a quick preview straight at window size (bilinear, no area filter).
pub fn render_preview(source: &Raster, params: &RenderParams) -> Result<Raster, TransformError> {
    params.validate()?;
    check_source(source)?;

    let window = params.window;
    let placement = Placement {
        origin_x: window.width as f64 / 2.0 + params.offset_x,
        origin_y: window.height as f64 / 2.0 + params.offset_y,
        angle: params.angle,
        scale: params.scale,
    };
    Ok(place_source(
        source,
        window.width,
        window.height,
        &placement,
        params.background.opaque(),
    ))
}


// ============================================================================
// Property-Based Tests
// ============================================================================
