//! Image loading for a cropping session.
//!
//! This module decodes an uploaded image (JPEG or PNG) into the RGB pixel
//! buffer the rest of the engine works with. EXIF orientation is applied
//! during decoding so phone photos land upright before cropping; the
//! source's natural dimensions are always post-orientation.
//!
//! Loading either succeeds completely or leaves no state behind: a failed
//! decode never produces a partial [`SourceImage`].

mod load;
mod types;

pub use load::{load_image, Orientation};
pub use types::{LoadError, SourceImage};
