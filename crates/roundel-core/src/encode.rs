//! JPEG encoding for crop export.
//!
//! The exported blob is a plain baseline JPEG produced by the `image`
//! crate's encoder at the session's configured quality.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder};
use thiserror::Error;

/// Errors that can occur while encoding the crop output.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Width or height is zero.
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// Pixel buffer length does not match the dimensions.
    #[error("pixel buffer has {actual} bytes, expected {expected}")]
    PixelBufferMismatch { expected: usize, actual: usize },

    /// The underlying encoder failed.
    #[error("JPEG encoding failed: {0}")]
    EncoderFailed(String),
}

/// Encode RGB pixel data to JPEG bytes at the given quality.
///
/// `pixels` is row-major RGB8 (3 bytes per pixel) and must match
/// `width * height * 3` exactly. Quality is clamped to 1-100.
pub fn encode_jpeg(
    pixels: &[u8],
    width: u32,
    height: u32,
    quality: u8,
) -> Result<Vec<u8>, EncodeError> {
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    let expected = (width as usize) * (height as usize) * 3;
    if pixels.len() != expected {
        return Err(EncodeError::PixelBufferMismatch {
            expected,
            actual: pixels.len(),
        });
    }

    let mut buffer = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100))
        .write_image(pixels, width, height, ExtendedColorType::Rgb8)
        .map_err(|e| EncodeError::EncoderFailed(e.to_string()))?;

    Ok(buffer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_produces_jpeg_markers() {
        let pixels = vec![128u8; 32 * 32 * 3];
        let bytes = encode_jpeg(&pixels, 32, 32, 90).unwrap();

        // SOI at the start, EOI at the end
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
        assert_eq!(&bytes[bytes.len() - 2..], &[0xFF, 0xD9]);
    }

    #[test]
    fn test_encode_round_trips_through_decoder() {
        let mut pixels = Vec::with_capacity(20 * 10 * 3);
        for y in 0..10u32 {
            for x in 0..20u32 {
                pixels.extend_from_slice(&[(x * 12) as u8, (y * 25) as u8, 100]);
            }
        }
        let bytes = encode_jpeg(&pixels, 20, 10, 95).unwrap();

        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.width(), 20);
        assert_eq!(decoded.height(), 10);
    }

    #[test]
    fn test_encode_zero_dimensions() {
        assert!(matches!(
            encode_jpeg(&[], 0, 10, 90),
            Err(EncodeError::InvalidDimensions { .. })
        ));
        assert!(matches!(
            encode_jpeg(&[], 10, 0, 90),
            Err(EncodeError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_encode_buffer_mismatch() {
        let pixels = vec![0u8; 10 * 10 * 3 - 1];
        assert!(matches!(
            encode_jpeg(&pixels, 10, 10, 90),
            Err(EncodeError::PixelBufferMismatch { .. })
        ));
    }

    #[test]
    fn test_encode_quality_clamped() {
        let pixels = vec![64u8; 8 * 8 * 3];
        assert!(encode_jpeg(&pixels, 8, 8, 0).is_ok());
        assert!(encode_jpeg(&pixels, 8, 8, 255).is_ok());
    }

    #[test]
    fn test_encode_single_pixel() {
        let bytes = encode_jpeg(&[255, 0, 0], 1, 1, 90).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: any valid buffer and quality produce a decodable JPEG
        /// with the input dimensions.
        #[test]
        fn prop_encode_decodable(
            (width, height) in (1u32..=40, 1u32..=40),
            quality in 1u8..=100,
            seed in any::<u8>(),
        ) {
            let size = (width as usize) * (height as usize) * 3;
            let pixels: Vec<u8> = (0..size)
                .map(|i| (i as u32).wrapping_mul(31).wrapping_add(seed as u32) as u8)
                .collect();

            let bytes = encode_jpeg(&pixels, width, height, quality).unwrap();
            let decoded = image::load_from_memory(&bytes).unwrap();
            prop_assert_eq!(decoded.width(), width);
            prop_assert_eq!(decoded.height(), height);
        }

        /// Property: encoding is deterministic.
        #[test]
        fn prop_encode_deterministic(
            (width, height) in (1u32..=20, 1u32..=20),
            quality in 1u8..=100,
        ) {
            let pixels = vec![100u8; (width as usize) * (height as usize) * 3];
            let a = encode_jpeg(&pixels, width, height, quality).unwrap();
            let b = encode_jpeg(&pixels, width, height, quality).unwrap();
            prop_assert_eq!(a, b);
        }

        /// Property: a buffer whose length is off by any amount is rejected.
        #[test]
        fn prop_encode_rejects_bad_buffer(
            (width, height) in (1u32..=20, 1u32..=20),
            delta in prop_oneof![(-12i32..=-1), (1i32..=12)],
        ) {
            let expected = (width as usize) * (height as usize) * 3;
            let actual = (expected as i64 + delta as i64).max(0) as usize;
            prop_assume!(actual != expected);

            let pixels = vec![0u8; actual];
            prop_assert!(
                matches!(
                    encode_jpeg(&pixels, width, height, 90),
                    Err(EncodeError::PixelBufferMismatch { .. })
                ),
                "expected Err(EncodeError::PixelBufferMismatch)"
            );
        }
    }
}
