//! Cropframe Core - crop window model and export resampling
//!
//! This crate holds everything the crop component computes: the incremental
//! pan/scale/rotate transform with its boundary clamp, capacity-bounded point
//! markers that follow the image, click-versus-drag gesture classification,
//! and the two-stage export renderer (exact placement followed by Hermite
//! area resampling). Decoding source files and encoding the JPEG export are
//! included; layout, file pickers and the HTTP upload are left to the host.
//!
//! [`CropSession`] is the entry point.

pub mod config;
pub mod decode;
pub mod encode;
pub mod export;
pub mod geometry;
pub mod gesture;
pub mod markers;
pub mod raster;
pub mod resample;
pub mod session;
pub mod transform;

pub use config::{SessionConfig, SourceImage};
pub use export::{export_filename, ExportAction, ExportJob, ExportOutput, UploadForm};
pub use geometry::{remap_point, Point, TransformParams};
pub use markers::{Marker, MarkerSet};
pub use raster::{Color, Raster};
pub use resample::{render_export, render_preview, RenderParams};
pub use session::{CropSession, MarkerAction, PointerOutcome, SessionError};
pub use transform::{CropWindow, PreviewTransform, TransformError, TransformState};
