//! The crop session: one window, one source image, its transform and markers.
//!
//! The session is the single object a host talks to. It owns the
//! [`TransformState`] and the [`MarkerSet`] and keeps them in step: every
//! transform mutation snapshots the parameters before and after and hands
//! both to [`MarkerSet::remap_all`], so markers stay glued to image content.
//!
//! # Pointer routing
//!
//! The host forwards raw pointer events to [`CropSession::pointer_down`],
//! [`CropSession::pointer_move`] and [`CropSession::pointer_up`]. Markers
//! claim a gesture first; when no marker is under the pointer the gesture
//! pans the image. A gesture that ends as a click (see [`crate::gesture`])
//! on empty image area places a marker at the release position.
//!
//! Events are handled one at a time on the caller's thread. Only an
//! [`ExportJob`] may leave the session.

use std::sync::Arc;

use log::{debug, warn};
use thiserror::Error;

use crate::config::{SessionConfig, SourceImage};
use crate::decode::{decode_image, DecodeError};
use crate::encode::EncodeError;
use crate::export::{export_filename, BusyFlags, ExportAction, ExportJob, ExportOutput};
use crate::gesture::{GestureKind, GestureTracker};
use crate::markers::MarkerSet;
use crate::raster::{Color, Raster};
use crate::resample::{render_preview, RenderParams};
use crate::transform::{
    slider_from_scale, CropWindow, PreviewTransform, TransformError, TransformState,
};

/// Errors surfaced by [`CropSession`].
#[derive(Debug, Error)]
pub enum SessionError {
    /// Construction options are unusable.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The operation needs a loaded image.
    #[error("No image loaded")]
    NoImage,

    /// The export action is already in flight.
    #[error("Export already in progress: {0}")]
    Busy(ExportAction),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// What [`CropSession::place_or_drag_marker`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerAction {
    /// An existing marker was hit and is now the drag target.
    Dragging(usize),
    /// A new marker was added.
    Placed(usize),
    /// Markers are disabled or no image is loaded.
    Ignored,
}

/// What a pointer event did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerOutcome {
    /// Nothing changed.
    Ignored,
    /// A gesture started on empty image area; moves will pan.
    PanStarted,
    /// A gesture started on a marker; moves will drag it.
    MarkerGrabbed(usize),
    /// The image was panned.
    Panned,
    /// The marker at this index was moved.
    MarkerMoved(usize),
    /// A click placed a new marker at this index.
    MarkerPlaced(usize),
    /// The gesture ended without a further change.
    Released(GestureKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GestureTarget {
    Pan,
    Marker(usize),
}

#[derive(Debug, Clone)]
struct ActiveGesture {
    tracker: GestureTracker,
    target: GestureTarget,
}

#[derive(Debug)]
struct LoadedImage {
    raster: Arc<Raster>,
    filename: String,
}

/// A crop component session.
#[derive(Debug)]
pub struct CropSession {
    config: SessionConfig,
    window: CropWindow,
    image: Option<LoadedImage>,
    transform: Option<TransformState>,
    markers: MarkerSet,
    gesture: Option<ActiveGesture>,
    busy: BusyFlags,
}

impl CropSession {
    /// Build a session, loading `config.initial_image` if one is given.
    pub fn new(mut config: SessionConfig) -> Result<Self, SessionError> {
        config.validate()?;

        let initial = config.initial_image.take();
        let mut session = Self {
            window: config.window(),
            markers: MarkerSet::new(config.marker_capacity(), config.marker_radius),
            config,
            image: None,
            transform: None,
            gesture: None,
            busy: BusyFlags::default(),
        };

        if let Some(SourceImage { raster, filename }) = initial {
            session.load_image(raster, filename)?;
        }
        Ok(session)
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn window(&self) -> CropWindow {
        self.window
    }

    pub fn background(&self) -> Color {
        self.config.background_color
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    /// Filename the current image was loaded under.
    pub fn filename(&self) -> Option<&str> {
        self.image.as_ref().map(|image| image.filename.as_str())
    }

    pub fn source(&self) -> Option<&Raster> {
        self.image.as_ref().map(|image| image.raster.as_ref())
    }

    pub fn transform(&self) -> Option<&TransformState> {
        self.transform.as_ref()
    }

    pub fn markers(&self) -> &MarkerSet {
        &self.markers
    }

    /// Current scale slider position, if an image is loaded.
    pub fn scale_slider(&self) -> Option<f64> {
        self.transform.as_ref().map(|t| slider_from_scale(t.scale()))
    }

    /// Replace the source image.
    ///
    /// Recomputes the base scale, resets the transform and drops every marker.
    /// A raster whose buffer does not match its dimensions is refused. On
    /// failure the previous image stays in place.
    pub fn load_image(
        &mut self,
        raster: Raster,
        filename: impl Into<String>,
    ) -> Result<(), SessionError> {
        raster.check_pixels()?;
        let state = TransformState::for_image(self.window, raster.width, raster.height)?;
        let filename = filename.into();

        debug!(
            "Loaded {} ({}x{}) into {}x{} window, base scale {:.4}",
            filename,
            raster.width,
            raster.height,
            self.window.width,
            self.window.height,
            state.base_scale()
        );

        self.transform = Some(state);
        self.image = Some(LoadedImage {
            raster: Arc::new(raster),
            filename,
        });
        self.markers.remove_all();
        self.gesture = None;
        Ok(())
    }

    /// Decode file bytes and load the result.
    pub fn load_image_bytes(
        &mut self,
        bytes: &[u8],
        filename: impl Into<String>,
    ) -> Result<(), SessionError> {
        let raster = decode_image(bytes)?;
        self.load_image(raster, filename)
    }

    /// Back to the identity transform with no markers.
    pub fn reset(&mut self) -> Result<(), SessionError> {
        let state = self.transform.as_mut().ok_or(SessionError::NoImage)?;
        state.reset();
        self.markers.remove_all();
        self.gesture = None;
        Ok(())
    }

    /// Drop every marker, keeping the transform.
    pub fn clear_markers(&mut self) {
        self.markers.remove_all();
        if matches!(
            self.gesture,
            Some(ActiveGesture {
                target: GestureTarget::Marker(_),
                ..
            })
        ) {
            self.gesture = None;
        }
    }

    pub fn set_scale(&mut self, scale: f64) -> Result<(), SessionError> {
        self.mutate_transform(|state| state.set_scale(scale))
    }

    pub fn set_scale_slider(&mut self, value: f64) -> Result<(), SessionError> {
        self.mutate_transform(|state| state.set_scale_slider(value))
    }

    pub fn set_rotation(&mut self, rotation: f64) -> Result<(), SessionError> {
        self.mutate_transform(|state| state.set_rotation(rotation))
    }

    pub fn pan(&mut self, dx: f64, dy: f64) -> Result<(), SessionError> {
        self.mutate_transform(|state| state.pan(dx, dy))
    }

    /// Run one transform mutation and carry the markers along with it.
    fn mutate_transform<F>(&mut self, mutate: F) -> Result<(), SessionError>
    where
        F: FnOnce(&mut TransformState) -> Result<(), TransformError>,
    {
        let center = self.window.center();
        let state = self.transform.as_mut().ok_or(SessionError::NoImage)?;

        let before = state.params();
        mutate(state)?;
        let after = state.params();

        self.markers.remap_all(&before, &after, center);
        Ok(())
    }

    /// Grab the marker under `(x, y)`, or place a new one there.
    pub fn place_or_drag_marker(&mut self, x: f64, y: f64) -> MarkerAction {
        if self.image.is_none() || !self.markers.is_enabled() {
            return MarkerAction::Ignored;
        }

        if let Some(index) = self.markers.hit_test(x, y) {
            return MarkerAction::Dragging(index);
        }
        match self.markers.add(x, y) {
            Some(index) => MarkerAction::Placed(index),
            None => MarkerAction::Ignored,
        }
    }

    /// Move the marker at `index` by a pointer delta. Returns `false` if it does not exist.
    pub fn drag_marker(&mut self, index: usize, dx: f64, dy: f64) -> bool {
        self.markers.drag_move(index, dx, dy)
    }

    /// Start a gesture. Ignored when no image is loaded.
    pub fn pointer_down(
        &mut self,
        x: f64,
        y: f64,
        time_ms: f64,
    ) -> Result<PointerOutcome, SessionError> {
        check_pointer(x, y)?;
        if self.image.is_none() {
            return Ok(PointerOutcome::Ignored);
        }

        let tracker = GestureTracker::begin(x, y, time_ms);
        let (target, outcome) = match self.markers.hit_test(x, y) {
            Some(index) => (GestureTarget::Marker(index), PointerOutcome::MarkerGrabbed(index)),
            None => (GestureTarget::Pan, PointerOutcome::PanStarted),
        };

        self.gesture = Some(ActiveGesture { tracker, target });
        Ok(outcome)
    }

    /// Continue the active gesture with the delta since the previous event.
    pub fn pointer_move(&mut self, x: f64, y: f64) -> Result<PointerOutcome, SessionError> {
        check_pointer(x, y)?;
        let Some(gesture) = self.gesture.as_mut() else {
            return Ok(PointerOutcome::Ignored);
        };

        let (dx, dy) = gesture.tracker.move_to(x, y);
        let target = gesture.target;
        match target {
            GestureTarget::Marker(index) => {
                if self.markers.drag_move(index, dx, dy) {
                    Ok(PointerOutcome::MarkerMoved(index))
                } else {
                    Ok(PointerOutcome::Ignored)
                }
            }
            GestureTarget::Pan => {
                self.pan(dx, dy)?;
                Ok(PointerOutcome::Panned)
            }
        }
    }

    /// End the active gesture. A click on empty image area places a marker.
    pub fn pointer_up(
        &mut self,
        x: f64,
        y: f64,
        time_ms: f64,
    ) -> Result<PointerOutcome, SessionError> {
        check_pointer(x, y)?;
        let Some(gesture) = self.gesture.take() else {
            return Ok(PointerOutcome::Ignored);
        };

        let kind = gesture.tracker.finish(x, y, time_ms);
        if kind == GestureKind::Click && gesture.target == GestureTarget::Pan {
            if let Some(index) = self.markers.add(x, y) {
                return Ok(PointerOutcome::MarkerPlaced(index));
            }
        }
        Ok(PointerOutcome::Released(kind))
    }

    /// Abandon the active gesture (e.g. the pointer left the host surface).
    pub fn pointer_cancel(&mut self) {
        self.gesture = None;
    }

    /// Marker coordinates as they would be exported.
    pub fn marker_points(&self) -> Vec<(i64, i64)> {
        self.markers.export_points()
    }

    /// Transform parameters for a CSS-style live preview.
    pub fn preview(&self) -> Option<PreviewTransform> {
        self.transform.as_ref().map(TransformState::preview)
    }

    /// Pixel preview at window size. Cheaper than an export.
    pub fn render_preview(&self) -> Result<Raster, SessionError> {
        let (image, state) = self.loaded()?;
        let params = RenderParams::from_state(state, self.config.background_color);
        Ok(render_preview(&image.raster, &params)?)
    }

    pub fn is_busy(&self, action: ExportAction) -> bool {
        self.busy.is_busy(action)
    }

    /// First export phase: mark `action` busy and freeze the current state.
    ///
    /// The host should let its busy indication paint before calling
    /// [`ExportJob::run`]. Fails with [`SessionError::Busy`] while another job
    /// for the same action is alive.
    pub fn begin_export(&self, action: ExportAction) -> Result<ExportJob, SessionError> {
        let (image, state) = self.loaded()?;

        let Some(guard) = self.busy.try_acquire(action) else {
            warn!("Refusing {action} export: one is already in progress");
            return Err(SessionError::Busy(action));
        };

        debug!("Starting {action} export of {}", image.filename);
        Ok(ExportJob::new(
            Arc::clone(&image.raster),
            RenderParams::from_state(state, self.config.background_color),
            self.markers.export_points(),
            export_filename(&image.filename),
            self.config.jpeg_quality,
            guard,
        ))
    }

    /// Both export phases back to back, as a download.
    pub fn export_raster(&self) -> Result<ExportOutput, SessionError> {
        let job = self.begin_export(ExportAction::Download)?;
        Ok(job.run()?)
    }

    fn loaded(&self) -> Result<(&LoadedImage, &TransformState), SessionError> {
        match (&self.image, &self.transform) {
            (Some(image), Some(state)) => Ok((image, state)),
            _ => Err(SessionError::NoImage),
        }
    }
}

fn check_pointer(x: f64, y: f64) -> Result<(), TransformError> {
    if x.is_finite() && y.is_finite() {
        Ok(())
    } else {
        Err(TransformError::InvalidTransform(format!(
            "pointer position must be finite, got ({x}, {y})"
        )))
    }
}
