//! Export encoding.
//!
//! The exported raster is fully opaque, so it is written as an RGB JPEG.
//!
//! # Examples
//!
//! ```ignore
//! use cropframe_core::encode::encode_jpeg;
//! use cropframe_core::raster::{Color, Raster};
//!
//! let raster = Raster::filled(100, 100, Color::rgb(128, 128, 128));
//! let jpeg_bytes = encode_jpeg(&raster, 95).unwrap();
//! println!("Encoded {} bytes", jpeg_bytes.len());
//! ```

mod jpeg;

pub use jpeg::{encode_jpeg, EncodeError, DEFAULT_JPEG_QUALITY, JPEG_MIME_TYPE};
