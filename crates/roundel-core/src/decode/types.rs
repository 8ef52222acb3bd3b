//! Core types for image loading.

use thiserror::Error;

/// Errors that can occur while loading a source image.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The bytes are not in a recognized image format.
    #[error("invalid or unsupported image format")]
    InvalidFormat,

    /// The image file is corrupted or truncated.
    #[error("corrupted or incomplete image file: {0}")]
    CorruptedFile(String),

    /// The decoded image has a zero width or height.
    #[error("image has zero width or height")]
    ZeroDimension,
}

/// A decoded source image, immutable for the duration of a cropping session.
///
/// Pixel data is RGB8 in row-major order (3 bytes per pixel). A new upload
/// replaces the whole value; nothing ever mutates it in place.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceImage {
    /// Natural width in pixels (post EXIF orientation).
    pub width: u32,
    /// Natural height in pixels (post EXIF orientation).
    pub height: u32,
    /// RGB pixel data, length `width * height * 3`.
    pub pixels: Vec<u8>,
}

impl SourceImage {
    /// Create a source image from raw dimensions and pixel data.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(
            pixels.len(),
            (width as usize) * (height as usize) * 3,
            "pixel buffer size mismatch"
        );
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Build from an `image::RgbImage` without copying the pixel buffer.
    pub fn from_rgb_image(img: image::RgbImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            pixels: img.into_raw(),
        }
    }

    /// The RGB value at `(x, y)`. Coordinates are clamped to the image
    /// bounds, which is what edge-clamped bilinear sampling wants.
    #[inline]
    pub fn pixel_clamped(&self, x: i64, y: i64) -> [u8; 3] {
        let x = x.clamp(0, self.width as i64 - 1) as usize;
        let y = y.clamp(0, self.height as i64 - 1) as usize;
        let idx = (y * self.width as usize + x) * 3;
        [self.pixels[idx], self.pixels[idx + 1], self.pixels[idx + 2]]
    }

    /// True when the image has no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.pixels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_image_creation() {
        let img = SourceImage::new(4, 2, vec![0u8; 4 * 2 * 3]);
        assert_eq!(img.width, 4);
        assert_eq!(img.height, 2);
        assert!(!img.is_empty());
    }

    #[test]
    fn test_source_image_empty() {
        let img = SourceImage::new(0, 0, vec![]);
        assert!(img.is_empty());
    }

    #[test]
    fn test_pixel_clamped_in_bounds() {
        let mut pixels = vec![0u8; 2 * 2 * 3];
        pixels[3] = 10; // pixel (1, 0)
        pixels[4] = 20;
        pixels[5] = 30;
        let img = SourceImage::new(2, 2, pixels);
        assert_eq!(img.pixel_clamped(1, 0), [10, 20, 30]);
    }

    #[test]
    fn test_pixel_clamped_out_of_bounds() {
        let mut pixels = vec![0u8; 2 * 2 * 3];
        pixels[9] = 99; // pixel (1, 1), red channel
        let img = SourceImage::new(2, 2, pixels);
        // Coordinates past either edge clamp to the nearest pixel
        assert_eq!(img.pixel_clamped(5, 5), img.pixel_clamped(1, 1));
        assert_eq!(img.pixel_clamped(-3, -3), img.pixel_clamped(0, 0));
    }

    #[test]
    fn test_load_error_display() {
        let err = LoadError::InvalidFormat;
        assert_eq!(err.to_string(), "invalid or unsupported image format");

        let err = LoadError::CorruptedFile("truncated".to_string());
        assert_eq!(err.to_string(), "corrupted or incomplete image file: truncated");
    }
}
