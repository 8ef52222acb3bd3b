//! Decoding with EXIF orientation handling.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::{DynamicImage, ImageReader};

use super::{LoadError, SourceImage};

/// EXIF orientation values (1-8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Normal,
    FlipHorizontal,
    Rotate180,
    FlipVertical,
    Transpose,
    Rotate90Cw,
    Transverse,
    Rotate270Cw,
}

impl Orientation {
    /// Map a raw EXIF orientation tag value. Unknown values are treated
    /// as `Normal`.
    fn from_exif(value: u32) -> Self {
        match value {
            2 => Orientation::FlipHorizontal,
            3 => Orientation::Rotate180,
            4 => Orientation::FlipVertical,
            5 => Orientation::Transpose,
            6 => Orientation::Rotate90Cw,
            7 => Orientation::Transverse,
            8 => Orientation::Rotate270Cw,
            _ => Orientation::Normal,
        }
    }

    /// Apply this orientation to a decoded image.
    fn apply(self, img: DynamicImage) -> DynamicImage {
        match self {
            Orientation::Normal => img,
            Orientation::FlipHorizontal => img.fliph(),
            Orientation::Rotate180 => img.rotate180(),
            Orientation::FlipVertical => img.flipv(),
            Orientation::Transpose => img.rotate90().fliph(),
            Orientation::Rotate90Cw => img.rotate90(),
            Orientation::Transverse => img.rotate270().fliph(),
            Orientation::Rotate270Cw => img.rotate270(),
        }
    }
}

/// Decode an uploaded image into a [`SourceImage`].
///
/// The format is guessed from the bytes (JPEG and PNG are supported), EXIF
/// orientation is applied, and the result is converted to RGB8.
///
/// # Errors
///
/// - [`LoadError::InvalidFormat`] if the bytes are not a recognized format
/// - [`LoadError::CorruptedFile`] if decoding fails partway
/// - [`LoadError::ZeroDimension`] if the decoded image has no pixels
pub fn load_image(bytes: &[u8]) -> Result<SourceImage, LoadError> {
    let orientation = read_orientation(bytes);

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| LoadError::CorruptedFile(e.to_string()))?;

    if reader.format().is_none() {
        return Err(LoadError::InvalidFormat);
    }

    let img = reader
        .decode()
        .map_err(|e| LoadError::CorruptedFile(e.to_string()))?;

    into_source(orientation.apply(img))
}

/// Convert a decoded image to RGB8, rejecting images with no pixels.
fn into_source(img: DynamicImage) -> Result<SourceImage, LoadError> {
    let source = SourceImage::from_rgb_image(img.into_rgb8());
    if source.is_empty() {
        return Err(LoadError::ZeroDimension);
    }
    Ok(source)
}

/// Read the EXIF orientation tag, defaulting to `Normal` when the image
/// carries no EXIF data.
fn read_orientation(bytes: &[u8]) -> Orientation {
    let mut cursor = Cursor::new(bytes);
    match Reader::new().read_from_container(&mut cursor) {
        Ok(exif) => exif
            .get_field(Tag::Orientation, In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .map(Orientation::from_exif)
            .unwrap_or_default(),
        Err(_) => Orientation::Normal,
    }
}
