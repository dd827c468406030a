//! Incremental pan/scale/rotate model for the crop window.
//!
//! The image is centered in the window, fitted once by the base scale, then
//! zoomed and rotated about its own center and finally panned. Every mutation
//! is pivot-preserving: the image content under the window center stays put
//! while the user drags the scale or rotation slider.
//!
//! # Transform Order
//!
//! 1. Base fit (`base_scale`, computed on image load, never upscales)
//! 2. User zoom (`scale`)
//! 3. Rotation about the image center (`rotation * PI` radians)
//! 4. Pan (`offset_x`, `offset_y`), clamped by the constraint solver
//!
//! After every mutation the pan is clamped so the image can never be dragged
//! out of the window.

mod constraint;

pub use constraint::{clamp_offset, overflow};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::{rotate_vector, Point, TransformParams};

/// Lower end of the scale slider; maps to 1x zoom.
pub const SCALE_SLIDER_MIN: f64 = 0.0;
/// Upper end of the scale slider; maps to 10x zoom.
pub const SCALE_SLIDER_MAX: f64 = 1.0;

/// Errors raised by the transform model and the resampler.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransformError {
    /// The source image has a zero dimension, so no fit scale exists.
    #[error("Invalid image: {width}x{height} has no area")]
    InvalidImage { width: u32, height: u32 },

    /// The source buffer does not match its dimensions.
    #[error("Invalid image: expected {expected} bytes of pixel data, got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// A transform parameter is out of its domain.
    #[error("Invalid transform: {0}")]
    InvalidTransform(String),
}

/// Fixed-size output window. Immutable for the lifetime of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropWindow {
    pub width: u32,
    pub height: u32,
}

impl CropWindow {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Center of the window in window coordinates.
    pub fn center(&self) -> Point {
        Point::new(self.width as f64 / 2.0, self.height as f64 / 2.0)
    }
}

/// Compute the one-time fit factor for an image loaded into `window`.
///
/// `min(1, window_w / image_w, window_h / image_h)`: large images are shrunk
/// to fit, small images are never upscaled.
pub fn compute_base_scale(
    window: CropWindow,
    image_width: u32,
    image_height: u32,
) -> Result<f64, TransformError> {
    if image_width == 0 || image_height == 0 {
        return Err(TransformError::InvalidImage {
            width: image_width,
            height: image_height,
        });
    }

    let fit_x = window.width as f64 / image_width as f64;
    let fit_y = window.height as f64 / image_height as f64;
    Ok(1f64.min(fit_x).min(fit_y))
}

/// Map a scale slider position to a zoom factor (`10^value`).
pub fn scale_from_slider(value: f64) -> f64 {
    10f64.powf(value)
}

/// Inverse of [`scale_from_slider`].
pub fn slider_from_scale(scale: f64) -> f64 {
    scale.log10()
}

/// Parameters a host needs to show the live preview as a CSS-like transform.
///
/// The image is laid out at its natural size, centered in the window, then
/// `translate(translate_x, translate_y) rotate(rotate_degrees) scale(scale)`
/// is applied about its center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PreviewTransform {
    pub translate_x: f64,
    pub translate_y: f64,
    pub rotate_degrees: f64,
    /// Base scale times user scale.
    pub scale: f64,
}

/// Current transform of the loaded image.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformState {
    window: CropWindow,
    image_width: u32,
    image_height: u32,
    base_scale: f64,
    params: TransformParams,
}

impl TransformState {
    /// Image-load hook: compute the base scale and start from the identity transform.
    pub fn for_image(
        window: CropWindow,
        image_width: u32,
        image_height: u32,
    ) -> Result<Self, TransformError> {
        let base_scale = compute_base_scale(window, image_width, image_height)?;
        Ok(Self {
            window,
            image_width,
            image_height,
            base_scale,
            params: TransformParams::default(),
        })
    }

    pub fn window(&self) -> CropWindow {
        self.window
    }

    pub fn image_size(&self) -> (u32, u32) {
        (self.image_width, self.image_height)
    }

    pub fn base_scale(&self) -> f64 {
        self.base_scale
    }

    pub fn scale(&self) -> f64 {
        self.params.scale
    }

    pub fn rotation(&self) -> f64 {
        self.params.rotation
    }

    pub fn offset_x(&self) -> f64 {
        self.params.offset_x
    }

    pub fn offset_y(&self) -> f64 {
        self.params.offset_y
    }

    /// Snapshot of the user-controlled parameters.
    pub fn params(&self) -> TransformParams {
        self.params
    }

    /// Combined scale applied to the image: `base_scale * scale`.
    pub fn effective_scale(&self) -> f64 {
        self.base_scale * self.params.scale
    }

    /// Zoom to `new_scale`, keeping the content under the window center fixed.
    pub fn set_scale(&mut self, new_scale: f64) -> Result<(), TransformError> {
        if !new_scale.is_finite() || new_scale <= 0.0 {
            return Err(TransformError::InvalidTransform(format!(
                "scale must be finite and positive, got {new_scale}"
            )));
        }

        let ratio = new_scale / self.params.scale;
        self.params.offset_x *= ratio;
        self.params.offset_y *= ratio;
        self.params.scale = new_scale;
        self.clamp();
        Ok(())
    }

    /// Zoom using a scale slider position (see [`scale_from_slider`]).
    pub fn set_scale_slider(&mut self, value: f64) -> Result<(), TransformError> {
        self.set_scale(scale_from_slider(value))
    }

    /// Rotate to `new_rotation`, keeping the content under the window center fixed.
    pub fn set_rotation(&mut self, new_rotation: f64) -> Result<(), TransformError> {
        if !new_rotation.is_finite() {
            return Err(TransformError::InvalidTransform(format!(
                "rotation must be finite, got {new_rotation}"
            )));
        }

        let angle = (new_rotation - self.params.rotation) * std::f64::consts::PI;
        let (x, y) = rotate_vector(self.params.offset_x, self.params.offset_y, angle);
        self.params.offset_x = x;
        self.params.offset_y = y;
        self.params.rotation = new_rotation;
        self.clamp();
        Ok(())
    }

    /// Translate by a pointer delta measured since the previous event.
    pub fn pan(&mut self, dx: f64, dy: f64) -> Result<(), TransformError> {
        if !dx.is_finite() || !dy.is_finite() {
            return Err(TransformError::InvalidTransform(format!(
                "pan delta must be finite, got ({dx}, {dy})"
            )));
        }

        self.params.offset_x += dx;
        self.params.offset_y += dy;
        self.clamp();
        Ok(())
    }

    /// Back to identity: scale 1, no rotation, centered.
    pub fn reset(&mut self) {
        self.params = TransformParams::default();
    }

    /// Push the pan back so the image bounding box keeps covering the window.
    pub fn clamp(&mut self) {
        let (overflow_x, overflow_y) = overflow(self);
        self.params.offset_x = clamp_offset(self.params.offset_x, overflow_x);
        self.params.offset_y = clamp_offset(self.params.offset_y, overflow_y);
    }

    /// Parameters for the live preview.
    pub fn preview(&self) -> PreviewTransform {
        PreviewTransform {
            translate_x: self.params.offset_x,
            translate_y: self.params.offset_y,
            rotate_degrees: self.params.angle_degrees(),
            scale: self.effective_scale(),
        }
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================
