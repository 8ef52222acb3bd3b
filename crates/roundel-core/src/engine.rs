//! The crop engine: session state, preview rendering, and export.
//!
//! A [`CropEngine`] owns one cropping session at a time: the loaded
//! [`SourceImage`], the [`ViewState`] positioning it, and the preview
//! [`Canvas`]. Every state change re-renders the preview; [`CropEngine::crop`]
//! exports the crop square as JPEG bytes.
//!
//! # Preview composite
//!
//! The preview is built in two phases because a single clip cannot show the
//! sharp image inside the circle and a dimmed border outside it at once:
//! the image is drawn and clipped to the circle (destination-in), then a
//! 50% black overlay layer has the circle punched back out of it
//! (destination-out) and is composited over the top, then the border is
//! stroked. The overlay therefore darkens only the area outside the circle.
//!
//! # Export
//!
//! The exported blob is the full crop square bounding the circle. The
//! circular mask is a preview-only visual aid; avatar consumers apply their
//! own circular clipping at render time.

use thiserror::Error;

use crate::decode::{load_image, LoadError, SourceImage};
use crate::encode::{encode_jpeg, EncodeError};
use crate::surface::{self, Canvas};
use crate::view::ViewState;
use crate::CropConfig;

/// Errors from crop-engine operations.
#[derive(Debug, Error)]
pub enum CropError {
    /// A crop was requested before any image was loaded. Callers should
    /// disable the crop action until a load succeeds.
    #[error("no image loaded")]
    NotLoaded,

    /// The export surface failed to encode. View state is untouched;
    /// the caller may retry the crop.
    #[error("export failed: {0}")]
    EncodingFailed(#[from] EncodeError),
}

/// A finished crop, ready to hand to an upload sink.
///
/// Never mutated after creation; ownership transfers to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct CropResult {
    /// JPEG-encoded crop square.
    pub bytes: Vec<u8>,
    /// Side length of the square in pixels (the crop diameter).
    pub size: u32,
    /// JPEG quality the blob was encoded at.
    pub quality: u8,
}

/// Token tying an in-flight asynchronous load to the session generation
/// that started it. A stale ticket's result is discarded on completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

/// Interactive circular crop engine.
///
/// Single-threaded and event-driven: every operation runs synchronously in
/// response to one input event, and redraws are idempotent.
#[derive(Debug, Clone)]
pub struct CropEngine {
    config: CropConfig,
    source: Option<SourceImage>,
    view: ViewState,
    preview: Canvas,
    generation: u64,
}

impl CropEngine {
    /// Create an engine in the unloaded state.
    pub fn new(config: CropConfig) -> Self {
        debug_assert!(
            config.crop_diameter < config.canvas_size,
            "crop circle must leave a border on the canvas"
        );
        Self {
            config,
            source: None,
            view: ViewState::default(),
            preview: Canvas::new(config.canvas_size, config.canvas_size),
            generation: 0,
        }
    }

    /// The session configuration.
    pub fn config(&self) -> &CropConfig {
        &self.config
    }

    /// True once an image has been installed.
    pub fn is_loaded(&self) -> bool {
        self.source.is_some()
    }

    /// The current view state.
    pub fn view(&self) -> &ViewState {
        &self.view
    }

    /// The preview surface as last rendered.
    pub fn preview(&self) -> &Canvas {
        &self.preview
    }

    /// Decode image bytes and install the result.
    ///
    /// On failure the engine keeps whatever state it had: a failed load
    /// never transitions out of (or into) the loaded state.
    pub fn load(&mut self, bytes: &[u8]) -> Result<(), LoadError> {
        let source = load_image(bytes)?;
        self.install(source);
        Ok(())
    }

    /// Install an already-decoded image, replacing any previous one.
    ///
    /// The view is re-fitted: scale at the fit scale, offset centered.
    /// After this the image fully covers the crop circle.
    pub fn install(&mut self, source: SourceImage) {
        self.view = ViewState::fitted(source.width, source.height, &self.config);
        self.source = Some(source);
        self.render_preview();
    }

    /// Begin an asynchronous load against the current session.
    pub fn begin_load(&self) -> LoadTicket {
        LoadTicket(self.generation)
    }

    /// Complete an asynchronous load. The decoded image is installed only
    /// when the ticket is still current; a result arriving after the
    /// session was reset is discarded. Returns whether it was applied.
    pub fn finish_load(&mut self, ticket: LoadTicket, source: SourceImage) -> bool {
        if ticket.0 != self.generation {
            return false;
        }
        self.install(source);
        true
    }

    /// Discard the session: drop the image, reset the view, clear the
    /// preview, and invalidate outstanding load tickets.
    pub fn reset(&mut self) {
        self.source = None;
        self.view = ViewState::default();
        self.preview.clear();
        self.generation += 1;
    }

    /// Set the zoom scale (clamped, never rejected) and redraw.
    /// Returns the effective scale.
    pub fn set_scale(&mut self, scale: f64) -> f64 {
        let effective = self.view.set_scale(scale, &self.config);
        self.render_preview();
        effective
    }

    /// Start a drag at a canvas position.
    pub fn begin_drag(&mut self, x: f64, y: f64) {
        self.view.begin_drag(x, y);
    }

    /// Move an in-progress drag, redrawing if the offset changed.
    pub fn continue_drag(&mut self, x: f64, y: f64) {
        if self.view.continue_drag(x, y) {
            self.render_preview();
        }
    }

    /// Finish a drag. Idempotent.
    pub fn end_drag(&mut self) {
        self.view.end_drag();
    }

    /// Re-render the preview surface from the current state.
    ///
    /// Idempotent: repeated calls with unchanged state produce a
    /// pixel-identical buffer. With no image loaded the preview is
    /// cleared to transparent.
    pub fn render_preview(&mut self) {
        let Some(source) = &self.source else {
            self.preview.clear();
            return;
        };

        let center = self.config.center();
        let radius = self.config.crop_radius();
        let scale = self.view.scale();
        let (ix, iy) = self
            .view
            .image_draw_pos(source.width, source.height, &self.config);

        self.preview.clear();
        self.preview.fill_rgb(surface::BACKGROUND);
        self.preview.draw_image(
            source,
            ix,
            iy,
            source.width as f64 * scale,
            source.height as f64 * scale,
        );
        // Phase 1: keep the image only inside the circle
        self.preview.mask_circle_in(center, center, radius);
        // Phase 2: dim everything, then re-expose the circle by punching
        // it out of the overlay before compositing
        let mut overlay = Canvas::new(self.config.canvas_size, self.config.canvas_size);
        overlay.fill_rgba(surface::DIM_OVERLAY);
        overlay.punch_circle_out(center, center, radius);
        self.preview.composite_over(&overlay);
        self.preview.stroke_circle(
            center,
            center,
            radius,
            surface::BORDER_WIDTH,
            surface::BORDER,
        );
    }

    /// Export the crop square as a JPEG blob.
    ///
    /// Maps the `crop_diameter x crop_diameter` square centered on the
    /// canvas back into source-image space, clamps the read region to the
    /// source bounds (shrinking the destination placement to match), and
    /// encodes the result. Regions the image does not cover are left
    /// background-colored. Output is always exactly
    /// `crop_diameter x crop_diameter` pixels.
    pub fn crop(&self) -> Result<CropResult, CropError> {
        let source = self.source.as_ref().ok_or(CropError::NotLoaded)?;

        let d = self.config.crop_diameter as f64;
        let scale = self.view.scale();
        let center = self.config.center();
        let (ix, iy) = self
            .view
            .image_draw_pos(source.width, source.height, &self.config);

        // Source rectangle that maps onto the crop square
        let crop_start_x = (center - d / 2.0 - ix) / scale;
        let crop_start_y = (center - d / 2.0 - iy) / scale;
        let crop_extent = d / scale;

        // Clamp the read origin to the source, shrink extent and
        // destination placement accordingly
        let sx = crop_start_x.max(0.0);
        let sy = crop_start_y.max(0.0);
        let sw = (source.width as f64 - sx).min(crop_extent);
        let sh = (source.height as f64 - sy).min(crop_extent);
        let dx = (-crop_start_x * scale).max(0.0);
        let dy = (-crop_start_y * scale).max(0.0);
        let dw = ((source.width as f64 - sx) * scale).min(d);
        let dh = ((source.height as f64 - sy) * scale).min(d);

        let mut out = Canvas::new(self.config.crop_diameter, self.config.crop_diameter);
        out.fill_rgb(surface::BACKGROUND);
        if sw > 0.0 && sh > 0.0 {
            out.draw_image_region(source, sx, sy, sw, sh, dx, dy, dw, dh);
        }

        let quality = self.config.export_quality;
        let bytes = encode_jpeg(
            &out.to_rgb(),
            self.config.crop_diameter,
            self.config.crop_diameter,
            quality,
        )?;

        Ok(CropResult {
            bytes,
            size: self.config.crop_diameter,
            quality,
        })
    }
}

impl Default for CropEngine {
    fn default() -> Self {
        Self::new(CropConfig::default())
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================
