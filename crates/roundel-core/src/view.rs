//! View transform and drag state for the crop preview.
//!
//! The view transform is the `(scale, offset)` pair describing how the
//! source image sits relative to the preview canvas. All coordinates are in
//! canvas-local pixel space: origin top-left, same units as
//! [`CropConfig::canvas_size`](crate::CropConfig::canvas_size).
//!
//! # Invariants
//!
//! - `scale` never drops below the fit scale of the loaded image, so the
//!   crop circle is always fully covered by image pixels
//! - `offset` is never clamped: the image may be dragged arbitrarily far,
//!   including entirely outside the crop circle (reference behavior)

use serde::{Deserialize, Serialize};

use crate::CropConfig;

/// Minimum scale at which a `width x height` image fully covers a crop
/// circle of the given diameter, with no gaps on either axis.
pub fn fit_scale(width: u32, height: u32, crop_diameter: u32) -> f64 {
    let d = crop_diameter as f64;
    (d / width as f64).max(d / height as f64)
}

/// Mutable view state for one cropping session.
///
/// Created alongside a loaded image, reset to the fitted defaults on every
/// new load, and mutated continuously during drag and zoom interaction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    /// Current zoom scale (source pixels to canvas pixels).
    scale: f64,
    /// Displacement of the image center from the canvas center.
    offset: (f64, f64),
    /// Drag anchor in canvas coordinates, present only while dragging.
    drag_anchor: Option<(f64, f64)>,
    /// Fit scale of the loaded image; floor of the effective zoom range.
    min_scale: f64,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset: (0.0, 0.0),
            drag_anchor: None,
            min_scale: 0.0,
        }
    }
}

impl ViewState {
    /// View state fitted to a freshly loaded image: scale at the fit scale,
    /// offset at the canvas center, no drag in progress.
    pub fn fitted(width: u32, height: u32, config: &CropConfig) -> Self {
        let min_scale = fit_scale(width, height, config.crop_diameter);
        Self {
            scale: min_scale,
            offset: (0.0, 0.0),
            drag_anchor: None,
            min_scale,
        }
    }

    /// Current zoom scale.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Current offset from the canvas center.
    pub fn offset(&self) -> (f64, f64) {
        self.offset
    }

    /// Fit scale of the image this state was created for.
    pub fn min_scale(&self) -> f64 {
        self.min_scale
    }

    /// True while a drag is in progress.
    pub fn is_dragging(&self) -> bool {
        self.drag_anchor.is_some()
    }

    /// The zoom range scales are clamped into.
    ///
    /// The slider bounds from the configuration apply, except that neither
    /// bound may fall below the fit scale: the crop circle must stay
    /// covered at any slider position.
    pub fn scale_bounds(&self, config: &CropConfig) -> (f64, f64) {
        let lower = config.min_zoom.max(self.min_scale);
        let upper = config.max_zoom.max(self.min_scale);
        (lower, upper)
    }

    /// Set the zoom scale, clamping into [`Self::scale_bounds`].
    ///
    /// Never rejects a value: out-of-range input is clamped, non-finite
    /// input leaves the scale unchanged. The offset is not renormalized.
    /// Returns the effective scale after clamping.
    pub fn set_scale(&mut self, scale: f64, config: &CropConfig) -> f64 {
        if scale.is_finite() {
            let (lower, upper) = self.scale_bounds(config);
            self.scale = scale.clamp(lower, upper);
        }
        self.scale
    }

    /// Start a drag at the given canvas position. No-op if a drag is
    /// already in progress.
    pub fn begin_drag(&mut self, x: f64, y: f64) {
        if self.drag_anchor.is_none() {
            self.drag_anchor = Some((x - self.offset.0, y - self.offset.1));
        }
    }

    /// Move the drag to a new canvas position, updating the offset.
    ///
    /// Returns `true` if the offset changed. No-op (returns `false`) when
    /// no drag is in progress. The offset is intentionally unclamped.
    pub fn continue_drag(&mut self, x: f64, y: f64) -> bool {
        match self.drag_anchor {
            Some((ax, ay)) => {
                self.offset = (x - ax, y - ay);
                true
            }
            None => false,
        }
    }

    /// Finish the drag. Idempotent.
    pub fn end_drag(&mut self) {
        self.drag_anchor = None;
    }

    /// Top-left corner at which the scaled image is drawn on the canvas:
    /// the image is centered on the canvas center, then displaced by the
    /// offset.
    pub fn image_draw_pos(&self, width: u32, height: u32, config: &CropConfig) -> (f64, f64) {
        let center = config.center();
        (
            center - width as f64 * self.scale / 2.0 + self.offset.0,
            center - height as f64 * self.scale / 2.0 + self.offset.1,
        )
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Strategy for natural image dimensions.
    fn dimensions_strategy() -> impl Strategy<Value = (u32, u32)> {
        (1u32..=8000, 1u32..=8000)
    }

    proptest! {
        /// Property: the fit scale covers the crop circle on both axes.
        #[test]
        fn prop_fit_scale_covers_circle(
            (width, height) in dimensions_strategy(),
        ) {
            let d = 250u32;
            let scale = fit_scale(width, height, d);

            prop_assert!(scale * width as f64 >= d as f64 - 1e-9);
            prop_assert!(scale * height as f64 >= d as f64 - 1e-9);
        }

        /// Property: after load, scale equals the fit scale and the offset
        /// is centered.
        #[test]
        fn prop_fitted_matches_fit_scale(
            (width, height) in dimensions_strategy(),
        ) {
            let config = CropConfig::new();
            let view = ViewState::fitted(width, height, &config);

            prop_assert_eq!(view.scale(), fit_scale(width, height, config.crop_diameter));
            prop_assert_eq!(view.offset(), (0.0, 0.0));
        }

        /// Property: any finite set_scale input lands inside the bounds.
        #[test]
        fn prop_set_scale_always_in_bounds(
            (width, height) in dimensions_strategy(),
            input in -100.0f64..=100.0,
        ) {
            let config = CropConfig::new();
            let mut view = ViewState::fitted(width, height, &config);

            let effective = view.set_scale(input, &config);
            let (lower, upper) = view.scale_bounds(&config);

            prop_assert!(effective >= lower, "effective {} below lower {}", effective, lower);
            prop_assert!(effective <= upper, "effective {} above upper {}", effective, upper);
        }

        /// Property: scale never drops below the fit scale, so the crop
        /// circle stays covered.
        #[test]
        fn prop_scale_never_below_fit(
            (width, height) in dimensions_strategy(),
            input in -100.0f64..=100.0,
        ) {
            let config = CropConfig::new();
            let mut view = ViewState::fitted(width, height, &config);
            let effective = view.set_scale(input, &config);

            prop_assert!(effective >= view.min_scale());
        }

        /// Property: a drag moves the image by exactly the pointer delta.
        #[test]
        fn prop_drag_moves_by_pointer_delta(
            (x0, y0) in (0.0f64..=300.0, 0.0f64..=300.0),
            (x1, y1) in (-500.0f64..=500.0, -500.0f64..=500.0),
            (ox, oy) in (-200.0f64..=200.0, -200.0f64..=200.0),
        ) {
            let config = CropConfig::new();
            let mut view = ViewState::fitted(800, 400, &config);
            view.begin_drag(0.0, 0.0);
            view.continue_drag(ox, oy);
            view.end_drag();
            let before = view.offset();

            view.begin_drag(x0, y0);
            view.continue_drag(x1, y1);
            view.end_drag();

            let after = view.offset();
            prop_assert!((after.0 - (before.0 + (x1 - x0))).abs() < 1e-9);
            prop_assert!((after.1 - (before.1 + (y1 - y0))).abs() < 1e-9);
        }
    }
}
