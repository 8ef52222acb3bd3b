//! Roundel Core - Circular avatar crop engine
//!
//! This crate owns the cropping session for a profile-photo upload flow:
//! a loaded source image, a view transform (scale + offset), a live circular
//! preview rendered onto a software raster surface, and a fixed-size square
//! JPEG export.
//!
//! # Pipeline
//!
//! 1. Decode an image (`decode`) and install it into a [`CropEngine`]
//! 2. Reposition and rescale interactively (`view` via the engine)
//! 3. Redraw the preview on every state change (`surface`)
//! 4. Export the crop square as JPEG bytes (`encode`) and hand them to an
//!    [`upload::UploadSink`]
//!
//! All operations are synchronous and single-threaded; the only concurrency
//! discipline is the load-ticket generation check on the engine.

pub mod decode;
pub mod encode;
pub mod engine;
pub mod surface;
pub mod upload;
pub mod view;

pub use decode::{load_image, LoadError, SourceImage};
pub use encode::{encode_jpeg, EncodeError};
pub use engine::{CropEngine, CropError, CropResult, LoadTicket};
pub use surface::Canvas;
pub use view::{fit_scale, ViewState};

/// Configuration for a cropping session.
///
/// The defaults match the reference behavior: a 300 px preview canvas with a
/// 250 px crop circle, a zoom slider spanning 0.5-3.0 in steps of 0.1, and
/// JPEG export at quality 90.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CropConfig {
    /// Preview surface side length in pixels.
    pub canvas_size: u32,
    /// Diameter of the crop circle in pixels. Kept strictly below
    /// `canvas_size` so the dimmed border around the circle stays visible.
    pub crop_diameter: u32,
    /// Lower bound of the zoom slider.
    pub min_zoom: f64,
    /// Upper bound of the zoom slider.
    pub max_zoom: f64,
    /// Slider step. Advisory for hosts; the engine accepts any scale value.
    pub zoom_step: f64,
    /// JPEG export quality (1-100).
    pub export_quality: u8,
}

impl Default for CropConfig {
    fn default() -> Self {
        Self {
            canvas_size: 300,
            crop_diameter: 250,
            min_zoom: 0.5,
            max_zoom: 3.0,
            zoom_step: 0.1,
            export_quality: 90,
        }
    }
}

impl CropConfig {
    /// Create a configuration with the reference defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Center coordinate of the preview canvas (same for x and y).
    pub fn center(&self) -> f64 {
        self.canvas_size as f64 / 2.0
    }

    /// Radius of the crop circle.
    pub fn crop_radius(&self) -> f64 {
        self.crop_diameter as f64 / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = CropConfig::new();
        assert_eq!(config.canvas_size, 300);
        assert_eq!(config.crop_diameter, 250);
        assert_eq!(config.min_zoom, 0.5);
        assert_eq!(config.max_zoom, 3.0);
        assert_eq!(config.export_quality, 90);
    }

    #[test]
    fn test_config_derived_geometry() {
        let config = CropConfig::new();
        assert_eq!(config.center(), 150.0);
        assert_eq!(config.crop_radius(), 125.0);
    }

    #[test]
    fn test_crop_circle_fits_canvas() {
        let config = CropConfig::new();
        assert!(config.crop_diameter < config.canvas_size);
    }
}
