//! Cropframe WASM - WebAssembly bindings for the crop component
//!
//! This crate exposes cropframe-core to the browser UI. The UI owns layout,
//! file pickers and the HTTP upload; it forwards pointer and slider events to
//! a [`JsCropSession`] and draws what the session reports.
//!
//! # Module Structure
//!
//! - `types` - WASM-compatible RGBA raster wrapper
//! - `session` - The crop session: transform, markers, pointer routing
//! - `export` - Two-phase export jobs and their results
//! - `decode` - Source image decoding
//! - `encode` - JPEG encoding
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsCropSession, JsExportAction } from '@cropframe/wasm';
//!
//! await init();
//!
//! const session = new JsCropSession({ width: 300, height: 200, enableMarkers: true, maxMarkerCount: 5 });
//! session.load_image_bytes(new Uint8Array(await file.arrayBuffer()), file.name);
//!
//! const job = session.begin_export(JsExportAction.Upload);
//! showSpinner();
//! await new Promise(requestAnimationFrame);
//! const result = job.run();
//! ```

use log::debug;
use wasm_bindgen::prelude::*;

mod decode;
mod encode;
mod export;
mod session;
mod types;

pub use decode::decode_image;
pub use encode::{encode_jpeg, encode_jpeg_from_raster};
pub use export::{JsExportAction, JsExportJob, JsExportResult};
pub use session::JsCropSession;
pub use types::JsRaster;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    // A second init (e.g. the module loaded twice) keeps the first logger
    if console_log::init_with_level(log::Level::Debug).is_ok() {
        debug!("Initialized cropframe-wasm logger");
    }
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
