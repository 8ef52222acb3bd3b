//! Roundel WASM - WebAssembly bindings for the Roundel crop engine
//!
//! This crate exposes the cropping session to the browser host, which
//! supplies image bytes and pointer events and displays the preview via
//! `putImageData`.
//!
//! # Usage
//!
//! ```typescript
//! import init, { CropSession } from '@roundel/wasm';
//!
//! await init();
//!
//! const session = new CropSession();
//! session.load(new Uint8Array(await file.arrayBuffer()));
//!
//! // On every pointer/slider event:
//! session.continue_drag(x, y);
//! const rgba = session.preview_pixels();
//! ctx.putImageData(new ImageData(new Uint8ClampedArray(rgba.buffer), size, size), 0, 0);
//!
//! // On confirm:
//! const jpeg = session.crop();
//! ```

use wasm_bindgen::prelude::*;

mod session;

pub use session::CropSession;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    // No setup needed yet; reserved for start-time hooks
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
