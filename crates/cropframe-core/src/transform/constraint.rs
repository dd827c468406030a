//! Pan clamping that keeps the transformed image over the window.

use super::TransformState;
use crate::geometry::rotated_bounding_box;

/// How far the rotated, scaled image bounding box exceeds the window per axis.
///
/// Both components are non-negative; an axis where the image is smaller than
/// the window reports 0.
pub fn overflow(state: &TransformState) -> (f64, f64) {
    let scale = state.effective_scale();
    let (bw, bh) = rotated_bounding_box(
        state.image_width as f64 * scale,
        state.image_height as f64 * scale,
        state.params.angle_radians(),
    );

    let overflow_x = (bw - state.window.width as f64).max(0.0);
    let overflow_y = (bh - state.window.height as f64).max(0.0);
    (overflow_x, overflow_y)
}

/// Clamp one pan component to `[-overflow / 2, overflow / 2]`.
///
/// A zero overflow forces the component to 0, centering the image on that axis.
#[inline]
pub fn clamp_offset(offset: f64, overflow: f64) -> f64 {
    let half = overflow / 2.0;
    offset.min(half).max(-half)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::CropWindow;

    #[test]
    fn test_clamp_offset_within_range() {
        assert_eq!(clamp_offset(10.0, 40.0), 10.0);
        assert_eq!(clamp_offset(-10.0, 40.0), -10.0);
    }

    #[test]
    fn test_clamp_offset_limits() {
        assert_eq!(clamp_offset(50.0, 40.0), 20.0);
        assert_eq!(clamp_offset(-50.0, 40.0), -20.0);
    }

    #[test]
    fn test_clamp_offset_zero_overflow_centers() {
        assert_eq!(clamp_offset(12.0, 0.0), 0.0);
        assert_eq!(clamp_offset(-12.0, 0.0), 0.0);
    }

    #[test]
    fn test_overflow_exact_fit() {
        let s = TransformState::for_image(CropWindow::new(300, 200), 600, 400).unwrap();
        let (ox, oy) = overflow(&s);
        assert!(ox.abs() < 1e-9);
        assert!(oy.abs() < 1e-9);
    }

    #[test]
    fn test_overflow_grows_with_rotation() {
        let mut s = TransformState::for_image(CropWindow::new(100, 100), 100, 100).unwrap();
        s.set_rotation(0.25).unwrap();
        let (ox, oy) = overflow(&s);
        let expected = 100.0 * 2f64.sqrt() - 100.0;
        assert!((ox - expected).abs() < 1e-6);
        assert!((oy - expected).abs() < 1e-6);
    }

    #[test]
    fn test_overflow_small_image_is_zero() {
        let s = TransformState::for_image(CropWindow::new(800, 600), 200, 100).unwrap();
        assert_eq!(overflow(&s), (0.0, 0.0));
    }
}
