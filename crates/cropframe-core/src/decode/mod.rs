//! Source image decoding.
//!
//! Turns file bytes (any format the `image` crate is built with) into an RGBA
//! [`Raster`](crate::raster::Raster), with EXIF orientation applied so the
//! crop window shows the image the way the camera meant it.
//!
//! # Examples
//!
//! ```ignore
//! use cropframe_core::decode::decode_image;
//!
//! let bytes = std::fs::read("photo.jpg").unwrap();
//! let raster = decode_image(&bytes).unwrap();
//! println!("Decoded {}x{} image", raster.width, raster.height);
//! ```

mod file;
mod types;

pub use file::decode_image;
pub use types::{DecodeError, Orientation};
