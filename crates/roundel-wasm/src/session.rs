//! JavaScript-facing cropping session.

use js_sys::Uint8Array;
use roundel_core::{CropConfig, CropEngine, ViewState};
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// Snapshot of the view transform handed to the host as a plain object.
#[derive(Debug, Clone, Copy, Serialize)]
struct ViewSnapshot {
    scale: f64,
    offset_x: f64,
    offset_y: f64,
    dragging: bool,
}

impl ViewSnapshot {
    fn of(view: &ViewState) -> Self {
        let (offset_x, offset_y) = view.offset();
        ViewSnapshot {
            scale: view.scale(),
            offset_x,
            offset_y,
            dragging: view.is_dragging(),
        }
    }
}

/// An interactive cropping session for the browser.
///
/// Wraps the core [`CropEngine`] with the reference configuration: a
/// 300 px canvas, a 250 px crop circle, a 0.5-3.0 zoom slider, and JPEG
/// export at quality 90. Coordinates passed to the drag methods are in
/// preview-canvas pixels (origin top-left).
#[wasm_bindgen]
pub struct CropSession {
    engine: CropEngine,
}

impl Default for CropSession {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl CropSession {
    /// Create a session with the reference configuration.
    #[wasm_bindgen(constructor)]
    pub fn new() -> CropSession {
        CropSession {
            engine: CropEngine::new(CropConfig::default()),
        }
    }

    /// Decode image bytes (JPEG or PNG) and start cropping them.
    ///
    /// On failure the session stays in its previous state and the error
    /// message names the decode problem so the host can show it.
    pub fn load(&mut self, bytes: &[u8]) -> Result<(), JsValue> {
        self.engine.load(bytes).map_err(|e| {
            web_sys::console::warn_1(&format!("image load failed: {e}").into());
            JsValue::from_str(&e.to_string())
        })
    }

    /// True once an image is loaded.
    #[wasm_bindgen(getter)]
    pub fn loaded(&self) -> bool {
        self.engine.is_loaded()
    }

    /// Side length of the preview canvas in pixels.
    #[wasm_bindgen(getter)]
    pub fn canvas_size(&self) -> u32 {
        self.engine.config().canvas_size
    }

    /// Diameter of the crop circle (and the exported square) in pixels.
    #[wasm_bindgen(getter)]
    pub fn crop_diameter(&self) -> u32 {
        self.engine.config().crop_diameter
    }

    /// Current zoom scale.
    #[wasm_bindgen(getter)]
    pub fn scale(&self) -> f64 {
        self.engine.view().scale()
    }

    /// Lower bound of the zoom slider.
    #[wasm_bindgen(getter)]
    pub fn min_zoom(&self) -> f64 {
        self.engine.config().min_zoom
    }

    /// Upper bound of the zoom slider.
    #[wasm_bindgen(getter)]
    pub fn max_zoom(&self) -> f64 {
        self.engine.config().max_zoom
    }

    /// Step of the zoom slider.
    #[wasm_bindgen(getter)]
    pub fn zoom_step(&self) -> f64 {
        self.engine.config().zoom_step
    }

    /// Set the zoom scale. Out-of-range values are clamped, never
    /// rejected; returns the effective scale for the slider to display.
    pub fn set_scale(&mut self, value: f64) -> f64 {
        self.engine.set_scale(value)
    }

    /// Pointer down on the preview canvas.
    pub fn begin_drag(&mut self, x: f64, y: f64) {
        self.engine.begin_drag(x, y);
    }

    /// Pointer move while dragging (no-op otherwise).
    pub fn continue_drag(&mut self, x: f64, y: f64) {
        self.engine.continue_drag(x, y);
    }

    /// Pointer up or leave. Idempotent.
    pub fn end_drag(&mut self) {
        self.engine.end_drag();
    }

    /// The preview as RGBA bytes, `canvas_size * canvas_size * 4` long,
    /// ready for `putImageData`.
    pub fn preview_pixels(&self) -> Uint8Array {
        Uint8Array::from(self.engine.preview().pixels())
    }

    /// Export the crop square as JPEG bytes.
    ///
    /// Fails when no image is loaded or encoding fails; the session state
    /// is untouched either way, so the host may retry.
    pub fn crop(&self) -> Result<Vec<u8>, JsValue> {
        self.engine
            .crop()
            .map(|result| result.bytes)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// The current view transform as a plain object
    /// (`{ scale, offset_x, offset_y, dragging }`) for host-side
    /// inspection.
    pub fn view_state(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&ViewSnapshot::of(self.engine.view()))
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Close the session: drop the image and invalidate any in-flight
    /// load, so a late completion cannot resurrect stale state.
    pub fn close(&mut self) {
        self.engine.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roundel_core::encode_jpeg;

    fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
        let pixels = vec![140u8; (width as usize) * (height as usize) * 3];
        encode_jpeg(&pixels, width, height, 95).unwrap()
    }

    #[test]
    fn test_session_defaults() {
        let session = CropSession::new();
        assert!(!session.loaded());
        assert_eq!(session.canvas_size(), 300);
        assert_eq!(session.crop_diameter(), 250);
        assert_eq!(session.min_zoom(), 0.5);
        assert_eq!(session.max_zoom(), 3.0);
    }

    #[test]
    fn test_load_and_fit() {
        let mut session = CropSession::new();
        session.load(&jpeg_bytes(800, 400)).unwrap();
        assert!(session.loaded());
        assert_eq!(session.scale(), 0.625);
    }

    #[test]
    fn test_set_scale_clamps() {
        let mut session = CropSession::new();
        session.load(&jpeg_bytes(800, 400)).unwrap();
        assert_eq!(session.set_scale(10.0), 3.0);
        assert_eq!(session.set_scale(0.1), 0.625);
    }

    #[test]
    fn test_drag_updates_scale_independent_offset() {
        let mut session = CropSession::new();
        session.load(&jpeg_bytes(600, 600)).unwrap();
        session.begin_drag(100.0, 100.0);
        session.continue_drag(140.0, 90.0);
        session.end_drag();
        // Offset only; scale unchanged from the fit
        assert_eq!(session.scale(), 250.0 / 600.0);
    }

    #[test]
    fn test_view_snapshot_tracks_drag() {
        let mut session = CropSession::new();
        session.load(&jpeg_bytes(600, 600)).unwrap();
        session.begin_drag(10.0, 10.0);
        session.continue_drag(25.0, 4.0);

        let snap = ViewSnapshot::of(session.engine.view());
        assert_eq!((snap.offset_x, snap.offset_y), (15.0, -6.0));
        assert_eq!(snap.scale, 250.0 / 600.0);
        assert!(snap.dragging);
    }

    #[test]
    fn test_crop_produces_jpeg() {
        let mut session = CropSession::new();
        session.load(&jpeg_bytes(500, 500)).unwrap();

        let bytes = session.crop().unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_close_unloads() {
        let mut session = CropSession::new();
        session.load(&jpeg_bytes(500, 500)).unwrap();
        session.close();
        assert!(!session.loaded());
    }
}
