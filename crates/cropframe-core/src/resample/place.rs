//! Geometric placement of the source image onto a background-filled surface.
//!
//! The placement uses inverse mapping: for each output pixel center we
//! compute the source position it shows and sample it bilinearly.
//!
//! For an output pixel center `(x, y)`, origin `(ox, oy)`, angle θ and scale `s`:
//! ```text
//! dx = x - ox,  dy = y - oy
//! u  = ( dx * cos θ + dy * sin θ) / s + src_w / 2
//! v  = (-dx * sin θ + dy * cos θ) / s + src_h / 2
//! ```
//!
//! Pixels whose `(u, v)` fall outside the source keep the background fill.
//! At scale 1 with no rotation and an integral origin every output pixel
//! maps exactly onto a source pixel center, so the copy is lossless.

use crate::raster::{Color, Raster};

/// Where and how the source is drawn on the output surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Output-space position of the source image center.
    pub origin_x: f64,
    pub origin_y: f64,
    /// Clockwise rotation in radians.
    pub angle: f64,
    /// Output pixels per source pixel.
    pub scale: f64,
}

/// Draw `source` onto a `width x height` surface filled with `background`.
///
/// A source whose buffer does not match its dimensions is not drawn.
pub fn place_source(
    source: &Raster,
    width: u32,
    height: u32,
    placement: &Placement,
    background: Color,
) -> Raster {
    let mut output = Raster::filled(width, height, background);
    if source.is_empty() || source.check_pixels().is_err() {
        return output;
    }

    let (sin, cos) = placement.angle.sin_cos();
    let inv_scale = 1.0 / placement.scale;

    let src_w = source.width as f64;
    let src_h = source.height as f64;
    let src_cx = src_w / 2.0;
    let src_cy = src_h / 2.0;
    let bg = background.to_array();

    for y in 0..height {
        let dy = y as f64 + 0.5 - placement.origin_y;

        for x in 0..width {
            let dx = x as f64 + 0.5 - placement.origin_x;

            let u = (dx * cos + dy * sin) * inv_scale + src_cx;
            let v = (-dx * sin + dy * cos) * inv_scale + src_cy;

            if u < 0.0 || v < 0.0 || u >= src_w || v >= src_h {
                continue;
            }

            // Pixel centers sit at +0.5
            let sample = sample_bilinear(source, u - 0.5, v - 0.5);
            output.put_pixel(x, y, composite_over(sample, bg));
        }
    }

    output
}

/// Sample with bilinear interpolation, clamping to the edge pixels.
///
/// Clamping (rather than fading to transparent) keeps the background from
/// bleeding into the image along its border.
fn sample_bilinear(image: &Raster, x: f64, y: f64) -> [f64; 4] {
    let max_x = image.width - 1;
    let max_y = image.height - 1;

    let x = x.clamp(0.0, max_x as f64);
    let y = y.clamp(0.0, max_y as f64);

    let x0 = x.floor() as u32;
    let y0 = y.floor() as u32;
    let x1 = (x0 + 1).min(max_x);
    let y1 = (y0 + 1).min(max_y);

    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let p00 = image.pixel(x0, y0);
    let p10 = image.pixel(x1, y0);
    let p01 = image.pixel(x0, y1);
    let p11 = image.pixel(x1, y1);

    let mut result = [0.0f64; 4];
    for i in 0..4 {
        result[i] = p00[i] as f64 * (1.0 - fx) * (1.0 - fy)
            + p10[i] as f64 * fx * (1.0 - fy)
            + p01[i] as f64 * (1.0 - fx) * fy
            + p11[i] as f64 * fx * fy;
    }
    result
}

/// Source-over compositing of a sampled pixel onto the background.
fn composite_over(src: [f64; 4], bg: [u8; 4]) -> [u8; 4] {
    let sa = (src[3] / 255.0).clamp(0.0, 1.0);
    let ba = bg[3] as f64 / 255.0;
    let out_a = sa + ba * (1.0 - sa);
    if out_a <= 0.0 {
        return [0, 0, 0, 0];
    }

    let channel = |i: usize| {
        let v = (src[i] * sa + bg[i] as f64 * ba * (1.0 - sa)) / out_a;
        v.clamp(0.0, 255.0).round() as u8
    };

    [
        channel(0),
        channel(1),
        channel(2),
        (out_a * 255.0).clamp(0.0, 255.0).round() as u8,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    /// Gradient test image where every pixel is distinct per row/column.
    fn gradient(width: u32, height: u32) -> Raster {
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&[(x * 7) as u8, (y * 11) as u8, 50, 255]);
            }
        }
        Raster::from_rgba(width, height, pixels).unwrap()
    }

    fn centered(width: u32, height: u32, angle: f64, scale: f64) -> Placement {
        Placement {
            origin_x: width as f64 / 2.0,
            origin_y: height as f64 / 2.0,
            angle,
            scale,
        }
    }

    #[test]
    fn test_identity_placement_is_lossless() {
        let src = gradient(20, 10);
        let out = place_source(&src, 20, 10, &centered(20, 10, 0.0, 1.0), Color::rgb(0, 0, 255));
        assert_eq!(out, src);
    }

    #[test]
    fn test_uncovered_area_gets_background() {
        let src = Raster::filled(4, 4, Color::rgb(255, 0, 0));
        let bg = Color::rgb(1, 2, 3);
        let out = place_source(&src, 10, 10, &centered(10, 10, 0.0, 1.0), bg);

        assert_eq!(out.pixel(0, 0), bg.to_array());
        assert_eq!(out.pixel(9, 9), bg.to_array());
        assert_eq!(out.pixel(5, 5), [255, 0, 0, 255]);
        // Source occupies x, y in 3..7
        assert_eq!(out.pixel(3, 3), [255, 0, 0, 255]);
        assert_eq!(out.pixel(2, 3), bg.to_array());
        assert_eq!(out.pixel(7, 3), bg.to_array());
    }

    #[test]
    fn test_integer_translation_shifts_pixels() {
        let src = gradient(10, 10);
        let placement = Placement {
            origin_x: 7.0,
            origin_y: 5.0,
            angle: 0.0,
            scale: 1.0,
        };
        let out = place_source(&src, 10, 10, &placement, Color::rgb(0, 0, 0));
        // Shifted right by two pixels
        assert_eq!(out.pixel(4, 4), src.pixel(2, 4));
        assert_eq!(out.pixel(1, 4), [0, 0, 0, 255]);
    }

    #[test]
    fn test_half_turn_mirrors_both_axes() {
        let src = gradient(8, 6);
        let out = place_source(&src, 8, 6, &centered(8, 6, PI, 1.0), Color::rgb(0, 0, 0));
        assert_eq!(out.pixel(0, 0), src.pixel(7, 5));
        assert_eq!(out.pixel(7, 5), src.pixel(0, 0));
        assert_eq!(out.pixel(2, 1), src.pixel(5, 4));
    }

    #[test]
    fn test_quarter_turn_swaps_axes() {
        let src = Raster::filled(10, 2, Color::rgb(255, 255, 255));
        let out = place_source(&src, 10, 10, &centered(10, 10, PI / 2.0, 1.0), Color::rgb(0, 0, 0));
        // A horizontal bar becomes a vertical one
        assert_eq!(out.pixel(5, 1), [255, 255, 255, 255]);
        assert_eq!(out.pixel(1, 5), [0, 0, 0, 255]);
    }

    #[test]
    fn test_scale_doubles_footprint() {
        let src = Raster::filled(4, 4, Color::rgb(9, 9, 9));
        let out = place_source(&src, 16, 16, &centered(16, 16, 0.0, 2.0), Color::rgb(0, 0, 0));
        assert_eq!(out.pixel(4, 4), [9, 9, 9, 255]);
        assert_eq!(out.pixel(11, 11), [9, 9, 9, 255]);
        assert_eq!(out.pixel(3, 4), [0, 0, 0, 255]);
        assert_eq!(out.pixel(12, 4), [0, 0, 0, 255]);
    }

    #[test]
    fn test_transparent_source_shows_background() {
        let src = Raster::filled(4, 4, Color::rgba(255, 0, 0, 0));
        let bg = Color::rgb(10, 20, 30);
        let out = place_source(&src, 4, 4, &centered(4, 4, 0.0, 1.0), bg);
        assert_eq!(out.pixel(1, 1), bg.to_array());
    }

    #[test]
    fn test_composite_half_alpha() {
        let out = composite_over([255.0, 0.0, 0.0, 127.5], [0, 0, 255, 255]);
        assert!((out[0] as i32 - 128).abs() <= 1);
        assert!((out[2] as i32 - 128).abs() <= 1);
        assert_eq!(out[3], 255);
    }

    #[test]
    fn test_empty_source_yields_background() {
        let src = Raster {
            width: 0,
            height: 0,
            pixels: vec![],
        };
        let out = place_source(&src, 3, 3, &centered(3, 3, 0.0, 1.0), Color::rgb(7, 7, 7));
        assert_eq!(out, Raster::filled(3, 3, Color::rgb(7, 7, 7)));
    }

    #[test]
    fn test_short_buffer_is_not_drawn() {
        let src = Raster {
            width: 50,
            height: 50,
            pixels: vec![255; 16],
        };
        let out = place_source(&src, 3, 3, &centered(3, 3, 0.0, 1.0), Color::rgb(7, 7, 7));
        assert_eq!(out, Raster::filled(3, 3, Color::rgb(7, 7, 7)));
    }
}
