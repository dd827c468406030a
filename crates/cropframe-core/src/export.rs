//! Two-phase export: freeze state, then render.
//!
//! [`CropSession::begin_export`](crate::session::CropSession::begin_export)
//! marks the action busy and returns an [`ExportJob`] holding a frozen copy of
//! everything needed. The host shows its busy indication, yields once so it
//! can paint, then calls [`ExportJob::run`]. The job owns a [`BusyGuard`], so
//! the busy flag is cleared whether the job succeeds, fails or is dropped
//! without running.
//!
//! A job shares the source raster read-only and is `Send`, so a host may move
//! it to a worker thread.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::debug;

use crate::encode::{encode_jpeg, EncodeError, JPEG_MIME_TYPE};
use crate::raster::Raster;
use crate::resample::{render_export, RenderParams};
use crate::transform::TransformError;

/// Name used when the source filename has nothing usable left.
pub const DEFAULT_EXPORT_NAME: &str = "image";

/// Multipart field carrying the encoded image.
pub const IMAGE_FIELD: &str = "image";
/// Multipart field carrying a marker x coordinate.
pub const X_FIELD: &str = "x[]";
/// Multipart field carrying a marker y coordinate.
pub const Y_FIELD: &str = "y[]";

/// Build the export filename from the source filename.
///
/// Strips any path prefix (`/` or `\`) and the last extension, trims
/// whitespace, falls back to `"image"`, and yields `"Processed <name>.jpg"`.
pub fn export_filename(source_filename: &str) -> String {
    let base = source_filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(source_filename);

    let stem = match base.rfind('.') {
        Some(dot) => &base[..dot],
        None => base,
    };

    let name = match stem.trim() {
        "" => DEFAULT_EXPORT_NAME,
        trimmed => trimmed,
    };

    format!("Processed {name}.jpg")
}

/// The user-facing export actions. Each is guarded independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportAction {
    Download,
    Upload,
}

impl fmt::Display for ExportAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportAction::Download => write!(f, "download"),
            ExportAction::Upload => write!(f, "upload"),
        }
    }
}

/// Per-action busy flags.
#[derive(Debug, Default)]
pub struct BusyFlags {
    download: Arc<AtomicBool>,
    upload: Arc<AtomicBool>,
}

impl BusyFlags {
    fn flag(&self, action: ExportAction) -> &Arc<AtomicBool> {
        match action {
            ExportAction::Download => &self.download,
            ExportAction::Upload => &self.upload,
        }
    }

    pub fn is_busy(&self, action: ExportAction) -> bool {
        self.flag(action).load(Ordering::Acquire)
    }

    /// Mark `action` busy, or return `None` if it already is.
    pub fn try_acquire(&self, action: ExportAction) -> Option<BusyGuard> {
        let flag = self.flag(action);
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        Some(BusyGuard {
            flag: Arc::clone(flag),
            action,
        })
    }
}

/// Clears its action's busy flag when dropped.
#[derive(Debug)]
pub struct BusyGuard {
    flag: Arc<AtomicBool>,
    action: ExportAction,
}

impl BusyGuard {
    pub fn action(&self) -> ExportAction {
        self.action
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// A frozen export, ready to render.
#[derive(Debug)]
pub struct ExportJob {
    source: Arc<Raster>,
    params: RenderParams,
    points: Vec<(i64, i64)>,
    filename: String,
    jpeg_quality: u8,
    guard: BusyGuard,
}

impl ExportJob {
    pub(crate) fn new(
        source: Arc<Raster>,
        params: RenderParams,
        points: Vec<(i64, i64)>,
        filename: String,
        jpeg_quality: u8,
        guard: BusyGuard,
    ) -> Self {
        Self {
            source,
            params,
            points,
            filename,
            jpeg_quality,
            guard,
        }
    }

    pub fn action(&self) -> ExportAction {
        self.guard.action()
    }

    pub fn params(&self) -> &RenderParams {
        &self.params
    }

    /// Render the output raster. Runs to completion; not cancellable.
    pub fn run(self) -> Result<ExportOutput, TransformError> {
        debug!(
            "Running {} export: {}x{} at scale {}",
            self.guard.action(),
            self.params.window.width,
            self.params.window.height,
            self.params.scale
        );

        let raster = render_export(&self.source, &self.params)?;

        debug!("Finished {} export of {}", self.guard.action(), self.filename);
        Ok(ExportOutput {
            raster,
            points: self.points,
            filename: self.filename,
            jpeg_quality: self.jpeg_quality,
        })
    }
}

/// Result of a finished export.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOutput {
    /// Exactly window-sized, fully opaque raster.
    pub raster: Raster,
    /// Marker coordinates, rounded, in marker list order.
    pub points: Vec<(i64, i64)>,
    /// `"Processed <name>.jpg"`.
    pub filename: String,
    pub jpeg_quality: u8,
}

impl ExportOutput {
    /// Encode the raster as JPEG at the configured quality.
    pub fn encode_jpeg(&self) -> Result<Vec<u8>, EncodeError> {
        encode_jpeg(&self.raster, self.jpeg_quality)
    }

    /// The `x[]`/`y[]` text fields, one pair per marker in list order.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        self.points
            .iter()
            .flat_map(|&(x, y)| [(X_FIELD, x.to_string()), (Y_FIELD, y.to_string())])
            .collect()
    }

    /// Describe the multipart upload body.
    pub fn upload_form(&self) -> Result<UploadForm, EncodeError> {
        Ok(UploadForm {
            filename: self.filename.clone(),
            image: self.encode_jpeg()?,
            fields: self.form_fields(),
        })
    }
}

/// The fields of a multipart upload body. The transport is up to the host.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadForm {
    /// Filename attached to the image part.
    pub filename: String,
    /// JPEG bytes for the [`IMAGE_FIELD`] part.
    pub image: Vec<u8>,
    /// `x[]`/`y[]` pairs, one pair per marker in list order.
    pub fields: Vec<(&'static str, String)>,
}

impl UploadForm {
    pub fn image_field(&self) -> &'static str {
        IMAGE_FIELD
    }

    pub fn content_type(&self) -> &'static str {
        JPEG_MIME_TYPE
    }
}
