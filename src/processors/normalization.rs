//! Image normalization into model input tensors.
//!
//! This module converts decoded RGB images into normalized NCHW tensors. The
//! normalization parameters are folded into per-channel affine coefficients
//! (alpha = scale / std, beta = -mean / std), so each pixel costs one multiply
//! and one add regardless of the configured mean and standard deviation.

use crate::core::{Tensor4D, TriageError, TriageResult};
use image::RgbImage;

/// Normalizes RGB images into NCHW input tensors.
///
/// Encapsulates scaling factor, per-channel mean and standard deviation as
/// precomputed affine coefficients. Construction validates the parameters, so
/// a held instance is always usable.
#[derive(Debug, Clone)]
pub struct NormalizeImage {
    /// Scaling factors for each channel (alpha = scale / std)
    alpha: [f32; 3],
    /// Offset values for each channel (beta = -mean / std)
    beta: [f32; 3],
}

impl NormalizeImage {
    /// Creates a new NormalizeImage instance with the specified parameters.
    ///
    /// # Arguments
    ///
    /// * `scale` - Scaling factor applied to raw pixel values
    /// * `mean` - Mean values for each channel, in post-scale units
    /// * `std` - Standard deviation values for each channel
    ///
    /// # Errors
    ///
    /// Returns a [`TriageError::ConfigError`] if scale is not positive or any
    /// standard deviation value is not positive.
    pub fn new(scale: f32, mean: [f32; 3], std: [f32; 3]) -> TriageResult<Self> {
        if scale <= 0.0 {
            return Err(TriageError::config_error(format!(
                "normalization scale must be greater than 0, got {scale}"
            )));
        }
        for (i, &s) in std.iter().enumerate() {
            if s <= 0.0 {
                return Err(TriageError::config_error(format!(
                    "standard deviation at index {i} must be greater than 0, got {s}"
                )));
            }
        }

        let mut alpha = [0.0f32; 3];
        let mut beta = [0.0f32; 3];
        for i in 0..3 {
            alpha[i] = scale / std[i];
            beta[i] = -mean[i] / std[i];
        }
        Ok(Self { alpha, beta })
    }

    /// Creates a normalization that only rescales pixels to `[0, 1]`.
    ///
    /// This matches models trained on inputs divided by 255 with no further
    /// standardization.
    pub fn unit_scale() -> Self {
        // Parameters are statically valid, so the validation cannot fail.
        Self::new(1.0 / 255.0, [0.0, 0.0, 0.0], [1.0, 1.0, 1.0])
            .unwrap_or(Self {
                alpha: [1.0 / 255.0; 3],
                beta: [0.0; 3],
            })
    }

    /// Normalizes a single image into a one-element NCHW batch tensor.
    ///
    /// # Arguments
    ///
    /// * `image` - The decoded RGB image, already resized to the model input size
    ///
    /// # Returns
    ///
    /// A tensor of shape `[1, 3, height, width]` in CHW channel order.
    pub fn normalize_to_tensor(&self, image: &RgbImage) -> TriageResult<Tensor4D> {
        let (width, height) = (image.width() as usize, image.height() as usize);
        if width == 0 || height == 0 {
            return Err(TriageError::normalization(
                "cannot normalize an empty image",
                crate::core::SimpleError::new(format!("image dimensions {width}x{height}")),
            ));
        }

        let plane = width * height;
        let mut data = vec![0.0f32; 3 * plane];
        for (y, row) in image.rows().enumerate() {
            for (x, pixel) in row.enumerate() {
                let offset = y * width + x;
                for c in 0..3 {
                    data[c * plane + offset] =
                        pixel.0[c] as f32 * self.alpha[c] + self.beta[c];
                }
            }
        }

        let tensor = Tensor4D::from_shape_vec((1, 3, height, width), data)
            .map_err(TriageError::Tensor)?;
        Ok(tensor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_rejects_non_positive_scale() {
        assert!(NormalizeImage::new(0.0, [0.0; 3], [1.0; 3]).is_err());
        assert!(NormalizeImage::new(-1.0, [0.0; 3], [1.0; 3]).is_err());
    }

    #[test]
    fn test_rejects_non_positive_std() {
        assert!(NormalizeImage::new(1.0 / 255.0, [0.0; 3], [1.0, 0.0, 1.0]).is_err());
    }

    #[test]
    fn test_unit_scale_maps_255_to_one() {
        let normalizer = NormalizeImage::unit_scale();
        let image = RgbImage::from_pixel(2, 2, Rgb([255, 0, 128]));
        let tensor = normalizer.normalize_to_tensor(&image).unwrap();

        assert_eq!(tensor.shape(), &[1, 3, 2, 2]);
        assert!((tensor[[0, 0, 0, 0]] - 1.0).abs() < 1e-6);
        assert!(tensor[[0, 1, 0, 0]].abs() < 1e-6);
        assert!((tensor[[0, 2, 0, 0]] - 128.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_chw_layout_separates_channels() {
        let normalizer = NormalizeImage::unit_scale();
        let mut image = RgbImage::new(2, 1);
        image.put_pixel(0, 0, Rgb([255, 0, 0]));
        image.put_pixel(1, 0, Rgb([0, 255, 0]));
        let tensor = normalizer.normalize_to_tensor(&image).unwrap();

        // Red plane holds both pixels of channel 0 contiguously.
        assert!((tensor[[0, 0, 0, 0]] - 1.0).abs() < 1e-6);
        assert!(tensor[[0, 0, 0, 1]].abs() < 1e-6);
        assert!(tensor[[0, 1, 0, 0]].abs() < 1e-6);
        assert!((tensor[[0, 1, 0, 1]] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_mean_std_standardization() {
        let normalizer = NormalizeImage::new(1.0 / 255.0, [0.5, 0.5, 0.5], [0.25, 0.25, 0.25])
            .unwrap();
        let image = RgbImage::from_pixel(1, 1, Rgb([255, 255, 255]));
        let tensor = normalizer.normalize_to_tensor(&image).unwrap();

        // (1.0 - 0.5) / 0.25 = 2.0
        assert!((tensor[[0, 0, 0, 0]] - 2.0).abs() < 1e-5);
    }
}
