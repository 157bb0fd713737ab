//! Shared image utilities.

use crate::core::{TriageError, TriageResult};
use image::{imageops, RgbImage};
use std::path::Path;

/// Loads an image from a file path and converts it to RGB format.
///
/// # Arguments
///
/// * `path` - Path to the image file
///
/// # Returns
///
/// The decoded RGB image, or a [`TriageError::Processing`] with image decode
/// context if the file cannot be opened or decoded.
pub fn load_image(path: impl AsRef<Path>) -> TriageResult<RgbImage> {
    let path = path.as_ref();
    let img = image::open(path).map_err(|e| {
        TriageError::image_decode(&format!("failed to load image '{}'", path.display()), e)
    })?;
    Ok(img.to_rgb8())
}

/// Resizes an image to exact target dimensions, ignoring aspect ratio.
///
/// Both classifiers expect fixed square inputs, so the resize intentionally
/// stretches rather than letterboxes.
pub fn resize_exact(image: &RgbImage, width: u32, height: u32) -> RgbImage {
    if image.width() == width && image.height() == height {
        return image.clone();
    }
    imageops::resize(image, width, height, imageops::FilterType::Lanczos3)
}
