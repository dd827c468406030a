//! RGBA pixel buffers and flat fill colors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decode::DecodeError;

/// Bytes per RGBA pixel.
pub const CHANNELS: usize = 4;

/// Error parsing a color string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid color '{0}': expected #rgb, #rrggbb or #rrggbbaa")]
pub struct ColorParseError(pub String);

/// An 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Neutral gray used for uncovered window area.
    pub const DEFAULT_BACKGROUND: Color = Color::rgb(0xbe, 0xbe, 0xbe);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// The same color with full alpha.
    pub const fn opaque(self) -> Self {
        Self { a: 255, ..self }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa` (the `#` is optional).
    pub fn from_hex(value: &str) -> Result<Self, ColorParseError> {
        let err = || ColorParseError(value.to_string());
        let hex = value.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.is_ascii() {
            return Err(err());
        }

        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| err());

        match hex.len() {
            3 => {
                let mut out = [0u8; 3];
                for (i, c) in hex.chars().enumerate() {
                    let v = c.to_digit(16).ok_or_else(err)? as u8;
                    out[i] = v * 17;
                }
                Ok(Color::rgb(out[0], out[1], out[2]))
            }
            6 => Ok(Color::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Ok(Color::rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => Err(err()),
        }
    }

    /// Format as `#rrggbb`, or `#rrggbbaa` when not fully opaque.
    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::DEFAULT_BACKGROUND
    }
}

impl TryFrom<String> for Color {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::from_hex(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

/// An RGBA image buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// RGBA pixel data in row-major order (4 bytes per pixel).
    pub pixels: Vec<u8>,
}

impl Raster {
    /// Wrap RGBA pixel data, checking the buffer length.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, DecodeError> {
        let raster = Self {
            width,
            height,
            pixels,
        };
        raster.check_pixels()?;
        Ok(raster)
    }

    /// Check that the buffer holds exactly `width * height` RGBA pixels.
    /// Rasters built by hand through the public fields may not.
    pub fn check_pixels(&self) -> Result<(), DecodeError> {
        let expected = (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|count| count.checked_mul(CHANNELS));
        match expected {
            Some(expected) if expected == self.pixels.len() => Ok(()),
            expected => Err(DecodeError::InvalidPixelData {
                expected: expected.unwrap_or(usize::MAX),
                actual: self.pixels.len(),
            }),
        }
    }

    /// A raster filled with a single color.
    pub fn filled(width: u32, height: u32, color: Color) -> Self {
        let count = width as usize * height as usize;
        let mut pixels = Vec::with_capacity(count * CHANNELS);
        for _ in 0..count {
            pixels.extend_from_slice(&color.to_array());
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Create a raster from an `image::RgbaImage`.
    pub fn from_rgba_image(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            pixels: img.into_raw(),
        }
    }

    /// RGB bytes with the alpha channel dropped.
    pub fn to_rgb(&self) -> Vec<u8> {
        self.pixels
            .chunks_exact(CHANNELS)
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect()
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * CHANNELS
    }

    /// Read the pixel at `(x, y)`. Panics when out of bounds.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = self.index(x, y);
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }

    /// Write the pixel at `(x, y)`. Panics when out of bounds.
    #[inline]
    pub fn put_pixel(&mut self, x: u32, y: u32, value: [u8; 4]) {
        let i = self.index(x, y);
        self.pixels[i..i + CHANNELS].copy_from_slice(&value);
    }

    /// Check if this is an empty/invalid image.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.pixels.is_empty()
    }

    /// True when every pixel has full alpha.
    pub fn is_opaque(&self) -> bool {
        self.pixels.chunks_exact(CHANNELS).all(|px| px[3] == 255)
    }
}
