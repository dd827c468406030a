//! Pure 2D math shared by the transform model and the marker overlay.
//!
//! # Coordinate System
//!
//! - Window coordinates have their origin at the top-left corner, y grows downwards
//! - Angles are in radians; a positive angle turns clockwise on screen
//! - Rotation parameters are stored as a half-turn fraction (1.0 = 180 degrees)

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

/// A point in window space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// By-value snapshot of the user-controlled transform parameters.
///
/// The base fit scale is deliberately absent: it is constant for a loaded
/// image, so every ratio computed between two snapshots is unaffected by it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformParams {
    /// User zoom factor (> 0).
    pub scale: f64,
    /// Rotation as a half-turn fraction in `[-1, 1]`.
    pub rotation: f64,
    /// Horizontal pan from the window center, in window pixels.
    pub offset_x: f64,
    /// Vertical pan from the window center, in window pixels.
    pub offset_y: f64,
}

impl Default for TransformParams {
    fn default() -> Self {
        Self {
            scale: 1.0,
            rotation: 0.0,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }
}

impl TransformParams {
    /// Rotation converted to radians.
    #[inline]
    pub fn angle_radians(&self) -> f64 {
        self.rotation * PI
    }

    /// Rotation converted to degrees.
    #[inline]
    pub fn angle_degrees(&self) -> f64 {
        self.rotation * 180.0
    }

    /// Pan offset as a vector.
    #[inline]
    pub fn offset(&self) -> Point {
        Point::new(self.offset_x, self.offset_y)
    }
}

/// Compute the axis-aligned bounding box of a rectangle rotated about its center.
///
/// ```text
/// w = |width * cos(a)| + |height * sin(a)|
/// h = |width * sin(a)| + |height * cos(a)|
/// ```
///
/// Unlike a pixel-grid bounding box, the result is not rounded: the
/// constraint solver compares it against the window with sub-pixel precision.
pub fn rotated_bounding_box(width: f64, height: f64, angle_radians: f64) -> (f64, f64) {
    let (sin, cos) = angle_radians.sin_cos();
    let w = (width * cos).abs() + (height * sin).abs();
    let h = (width * sin).abs() + (height * cos).abs();
    (w, h)
}

/// Rotate a vector by `angle_radians` about the origin.
#[inline]
pub fn rotate_vector(x: f64, y: f64, angle_radians: f64) -> (f64, f64) {
    let (sin, cos) = angle_radians.sin_cos();
    (x * cos - y * sin, x * sin + y * cos)
}

/// Map a point glued to the image under `from` to where it lands under `to`.
///
/// The point is expressed relative to `pivot`, rescaled by the scale ratio,
/// rotated by the rotation delta, translated back and finally shifted by the
/// change in pan offset. With `pivot` set to the image center under `from`
/// (window center plus the old pan), the result stays on the same image
/// content.
pub fn remap_point(p: Point, from: &TransformParams, to: &TransformParams, pivot: Point) -> Point {
    let ratio = to.scale / from.scale;
    let angle = (to.rotation - from.rotation) * PI;

    let (rx, ry) = rotate_vector((p.x - pivot.x) * ratio, (p.y - pivot.y) * ratio, angle);

    Point::new(
        rx + pivot.x + (to.offset_x - from.offset_x),
        ry + pivot.y + (to.offset_y - from.offset_y),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn params(scale: f64, rotation: f64, offset_x: f64, offset_y: f64) -> TransformParams {
        TransformParams {
            scale,
            rotation,
            offset_x,
            offset_y,
        }
    }

    #[test]
    fn test_bounding_box_no_rotation() {
        let (w, h) = rotated_bounding_box(100.0, 50.0, 0.0);
        assert!((w - 100.0).abs() < EPS);
        assert!((h - 50.0).abs() < EPS);
    }

    #[test]
    fn test_bounding_box_quarter_turn_swaps() {
        let (w, h) = rotated_bounding_box(100.0, 50.0, PI / 2.0);
        assert!((w - 50.0).abs() < 1e-6, "width was {}", w);
        assert!((h - 100.0).abs() < 1e-6, "height was {}", h);
    }

    #[test]
    fn test_bounding_box_diagonal() {
        let (w, h) = rotated_bounding_box(100.0, 100.0, PI / 4.0);
        let diagonal = 100.0 * 2f64.sqrt();
        assert!((w - diagonal).abs() < 1e-6);
        assert!((h - diagonal).abs() < 1e-6);
    }

    #[test]
    fn test_bounding_box_sign_independent() {
        let a = rotated_bounding_box(120.0, 80.0, 0.3);
        let b = rotated_bounding_box(120.0, 80.0, -0.3);
        assert!((a.0 - b.0).abs() < EPS);
        assert!((a.1 - b.1).abs() < EPS);
    }

    #[test]
    fn test_rotate_vector_quarter_turn() {
        // Clockwise on screen: +x maps to +y
        let (x, y) = rotate_vector(1.0, 0.0, PI / 2.0);
        assert!(x.abs() < EPS);
        assert!((y - 1.0).abs() < EPS);
    }

    #[test]
    fn test_remap_identity() {
        let t = params(2.0, 0.25, 10.0, -5.0);
        let p = Point::new(42.0, 17.0);
        let q = remap_point(p, &t, &t, Point::new(150.0, 100.0));
        assert!((q.x - p.x).abs() < EPS);
        assert!((q.y - p.y).abs() < EPS);
    }

    #[test]
    fn test_remap_scale_about_pivot() {
        let from = params(1.0, 0.0, 0.0, 0.0);
        let to = params(2.0, 0.0, 0.0, 0.0);
        let pivot = Point::new(100.0, 100.0);

        let q = remap_point(Point::new(110.0, 90.0), &from, &to, pivot);
        assert!((q.x - 120.0).abs() < EPS);
        assert!((q.y - 80.0).abs() < EPS);

        // The pivot itself never moves
        let c = remap_point(pivot, &from, &to, pivot);
        assert!((c.x - pivot.x).abs() < EPS);
        assert!((c.y - pivot.y).abs() < EPS);
    }

    #[test]
    fn test_remap_pan_only_translates() {
        let from = params(1.5, 0.1, 3.0, 4.0);
        let to = params(1.5, 0.1, 13.0, -6.0);
        let q = remap_point(Point::new(5.0, 5.0), &from, &to, Point::new(50.0, 50.0));
        assert!((q.x - 15.0).abs() < EPS);
        assert!((q.y + 5.0).abs() < EPS);
    }

    #[test]
    fn test_remap_half_turn() {
        let from = params(1.0, 0.0, 0.0, 0.0);
        let to = params(1.0, 1.0, 0.0, 0.0);
        let q = remap_point(Point::new(60.0, 50.0), &from, &to, Point::new(50.0, 50.0));
        assert!((q.x - 40.0).abs() < 1e-9);
        assert!((q.y - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_point_distance() {
        assert!((Point::new(0.0, 0.0).distance(Point::new(3.0, 4.0)) - 5.0).abs() < EPS);
    }

    #[test]
    fn test_params_angle_conversions() {
        let t = params(1.0, 0.5, 0.0, 0.0);
        assert!((t.angle_degrees() - 90.0).abs() < EPS);
        assert!((t.angle_radians() - PI / 2.0).abs() < EPS);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
