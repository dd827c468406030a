//! Hermite-kernel area resampling.
//!
//! Every destination pixel averages the source pixels inside its footprint,
//! weighted by a radial Hermite kernel:
//!
//! ```text
//! ratio     = src / dst            (per axis)
//! half      = ceil(ratio / 2)
//! window    = [floor(i * ratio), ceil((i + 1) * ratio))
//! w         = sqrt(dx^2 + dy^2)    dx, dy = center offsets / half
//! weight    = 2w^3 - 3w^2 + 1      for w < 1, otherwise excluded
//! ```
//!
//! Alpha is the plain weighted mean. Color weights of translucent pixels are
//! additionally scaled by `alpha / 250`, so a translucent border contributes
//! proportionally less color than an opaque one.
//!
//! The loops run in a fixed order on a single thread, which makes the output
//! bit-reproducible.

use crate::raster::{Raster, CHANNELS};

/// Divisor applied to a translucent pixel's alpha when weighting its color.
const ALPHA_COLOR_DIVISOR: f64 = 250.0;

/// Hermite smoothstep kernel, 1 at the center and 0 at `w = 1`.
#[inline]
pub fn hermite_weight(w: f64) -> f64 {
    2.0 * w * w * w - 3.0 * w * w + 1.0
}

#[derive(Default)]
struct Accumulator {
    color: [f64; 3],
    color_weights: f64,
    alpha: f64,
    alpha_weights: f64,
}

impl Accumulator {
    #[inline]
    fn add(&mut self, px: &[u8], weight: f64) {
        let alpha = px[3] as f64;
        self.alpha += weight * alpha;
        self.alpha_weights += weight;

        let color_weight = if px[3] < 255 {
            weight * alpha / ALPHA_COLOR_DIVISOR
        } else {
            weight
        };
        self.color[0] += color_weight * px[0] as f64;
        self.color[1] += color_weight * px[1] as f64;
        self.color[2] += color_weight * px[2] as f64;
        self.color_weights += color_weight;
    }

    fn finish(&self) -> [u8; 4] {
        let normalize = |sum: f64, weights: f64| {
            if weights > 0.0 {
                (sum / weights).clamp(0.0, 255.0).round() as u8
            } else {
                0
            }
        };

        [
            normalize(self.color[0], self.color_weights),
            normalize(self.color[1], self.color_weights),
            normalize(self.color[2], self.color_weights),
            normalize(self.alpha, self.alpha_weights),
        ]
    }
}

/// Resample `source` to exactly `width x height` with the Hermite filter.
///
/// Works for both shrinking and enlarging; a zero target dimension yields an
/// empty raster. A source whose buffer does not match its dimensions yields
/// transparent black.
pub fn resample_hermite(source: &Raster, width: u32, height: u32) -> Raster {
    let dst_w = width as usize;
    let dst_h = height as usize;
    let src_w = source.width as usize;
    let src_h = source.height as usize;

    let mut pixels = vec![0u8; dst_w * dst_h * CHANNELS];
    if source.is_empty() || source.check_pixels().is_err() || dst_w == 0 || dst_h == 0 {
        return Raster {
            width,
            height,
            pixels,
        };
    }

    let ratio_w = src_w as f64 / dst_w as f64;
    let ratio_h = src_h as f64 / dst_h as f64;
    let half_w = (ratio_w / 2.0).ceil();
    let half_h = (ratio_h / 2.0).ceil();

    for j in 0..dst_h {
        let center_y = (j as f64 + 0.5) * ratio_h;
        let yy_start = (j as f64 * ratio_h).floor() as usize;
        let yy_stop = (((j + 1) as f64 * ratio_h).ceil() as usize).min(src_h);

        for i in 0..dst_w {
            let center_x = (i as f64 + 0.5) * ratio_w;
            let xx_start = (i as f64 * ratio_w).floor() as usize;
            let xx_stop = (((i + 1) as f64 * ratio_w).ceil() as usize).min(src_w);

            let mut acc = Accumulator::default();

            for yy in yy_start..yy_stop {
                let dy = (center_y - (yy as f64 + 0.5)).abs() / half_h;
                let dy2 = dy * dy;
                let row = yy * src_w;

                for xx in xx_start..xx_stop {
                    let dx = (center_x - (xx as f64 + 0.5)).abs() / half_w;
                    let w = (dy2 + dx * dx).sqrt();
                    if w >= 1.0 {
                        continue;
                    }

                    let idx = (row + xx) * CHANNELS;
                    acc.add(&source.pixels[idx..idx + CHANNELS], hermite_weight(w));
                }
            }

            let out = (j * dst_w + i) * CHANNELS;
            pixels[out..out + CHANNELS].copy_from_slice(&acc.finish());
        }
    }

    Raster {
        width,
        height,
        pixels,
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================
