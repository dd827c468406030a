//! Session construction options.
//!
//! Options are consumed once when a [`CropSession`](crate::session::CropSession)
//! is built. Field names serialize in camelCase so a JavaScript options object
//! (`{ width, height, backgroundColor, enableMarkers, maxMarkerCount }`) can
//! be passed through unchanged.

use serde::{Deserialize, Serialize};

use crate::encode::DEFAULT_JPEG_QUALITY;
use crate::markers::DEFAULT_MARKER_RADIUS;
use crate::raster::{Color, Raster};
use crate::session::SessionError;
use crate::transform::CropWindow;

/// A source image together with the name it was picked under.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceImage {
    pub raster: Raster,
    pub filename: String,
}

/// Construction options for a crop session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionConfig {
    /// Output window width in pixels.
    pub width: u32,
    /// Output window height in pixels.
    pub height: u32,
    /// Fill for window area the image does not cover.
    pub background_color: Color,
    /// Whether clicks place markers.
    pub enable_markers: bool,
    /// Marker capacity when markers are enabled.
    pub max_marker_count: usize,
    /// Hit-test radius of a marker, in window pixels.
    pub marker_radius: f64,
    /// JPEG quality for downloads and uploads (1-100).
    pub jpeg_quality: u8,
    /// Image loaded right after construction.
    #[serde(skip)]
    pub initial_image: Option<SourceImage>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            width: 300,
            height: 200,
            background_color: Color::DEFAULT_BACKGROUND,
            enable_markers: false,
            max_marker_count: 0,
            marker_radius: DEFAULT_MARKER_RADIUS,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            initial_image: None,
        }
    }
}

impl SessionConfig {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn window(&self) -> CropWindow {
        CropWindow::new(self.width, self.height)
    }

    /// Effective marker capacity: 0 when markers are disabled.
    pub fn marker_capacity(&self) -> usize {
        if self.enable_markers {
            self.max_marker_count
        } else {
            0
        }
    }

    /// Check the options before a session is built.
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.width == 0 || self.height == 0 {
            return Err(SessionError::InvalidConfig(format!(
                "window must have a non-zero size, got {}x{}",
                self.width, self.height
            )));
        }
        if !self.marker_radius.is_finite() || self.marker_radius < 0.0 {
            return Err(SessionError::InvalidConfig(format!(
                "marker radius must be finite and non-negative, got {}",
                self.marker_radius
            )));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(SessionError::InvalidConfig(format!(
                "JPEG quality must be within 1-100, got {}",
                self.jpeg_quality
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = SessionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.background_color, Color::rgb(0xbe, 0xbe, 0xbe));
        assert_eq!(config.marker_capacity(), 0);
    }

    #[test]
    fn test_marker_capacity_follows_enable_flag() {
        let mut config = SessionConfig::new(100, 100);
        config.max_marker_count = 5;
        assert_eq!(config.marker_capacity(), 0);
        config.enable_markers = true;
        assert_eq!(config.marker_capacity(), 5);
    }

    #[test]
    fn test_zero_window_rejected() {
        let config = SessionConfig::new(0, 100);
        assert!(matches!(config.validate(), Err(SessionError::InvalidConfig(_))));
    }

    #[test]
    fn test_bad_radius_rejected() {
        let mut config = SessionConfig::new(100, 100);
        config.marker_radius = f64::NAN;
        assert!(config.validate().is_err());
        config.marker_radius = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_quality_rejected() {
        let mut config = SessionConfig::new(100, 100);
        config.jpeg_quality = 0;
        assert!(config.validate().is_err());
        config.jpeg_quality = 101;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_window() {
        assert_eq!(SessionConfig::new(640, 480).window(), CropWindow::new(640, 480));
    }
}
