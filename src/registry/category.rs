//! First-stage lesion category classifier.

use crate::core::{
    lesion_category_labels, CategoryScorer, OrtInfer, OrtSessionOptions, TriageError,
    TriageResult,
};
use crate::processors::NormalizeImage;
use crate::utils::resize_exact;
use image::RgbImage;
use std::path::Path;
use std::sync::Arc;

/// Input edge length used when the model declares dynamic spatial dimensions.
const FALLBACK_INPUT_SIZE: u32 = 224;

/// The category classifier over the fixed four-label set.
///
/// Wraps an ONNX session together with the preprocessing its training used:
/// resize to the model's declared input size, then rescale pixels to `[0, 1]`.
/// The input size is read from the model's input shape metadata at load time.
#[derive(Debug)]
pub struct CategoryClassifier {
    infer: OrtInfer,
    normalizer: NormalizeImage,
    labels: Vec<Arc<str>>,
    input_size: (u32, u32),
}

impl CategoryClassifier {
    /// Loads the category model from an ONNX file.
    ///
    /// # Arguments
    ///
    /// * `model_path` - Path to the ONNX model file
    /// * `options` - ONNX Runtime session options
    ///
    /// # Errors
    ///
    /// Returns a [`TriageError::ModelLoad`] if the model cannot be loaded.
    pub fn load(model_path: impl AsRef<Path>, options: &OrtSessionOptions) -> TriageResult<Self> {
        let infer = OrtInfer::load(model_path, options)?;
        let input_size = Self::discover_input_size(&infer);

        Ok(Self {
            infer,
            normalizer: NormalizeImage::unit_scale(),
            labels: lesion_category_labels(),
            input_size,
        })
    }

    /// Reads the spatial input size from NCHW model metadata.
    ///
    /// Dynamic or missing dimensions fall back to 224x224 with a warning, so a
    /// model exported with symbolic batch and size still loads.
    fn discover_input_size(infer: &OrtInfer) -> (u32, u32) {
        if let Some(shape) = infer.primary_input_shape() {
            if shape.len() == 4 {
                let height = shape[2];
                let width = shape[3];
                if height > 0 && width > 0 {
                    return (width as u32, height as u32);
                }
            }
            tracing::warn!(
                model = %infer.model_name(),
                shape = ?shape,
                "model input shape is dynamic or unexpected, using {}x{}",
                FALLBACK_INPUT_SIZE,
                FALLBACK_INPUT_SIZE
            );
        } else {
            tracing::warn!(
                model = %infer.model_name(),
                "model input shape unavailable, using {}x{}",
                FALLBACK_INPUT_SIZE,
                FALLBACK_INPUT_SIZE
            );
        }
        (FALLBACK_INPUT_SIZE, FALLBACK_INPUT_SIZE)
    }

    /// Returns the model input size as `(width, height)`.
    pub fn input_size(&self) -> (u32, u32) {
        self.input_size
    }
}

impl CategoryScorer for CategoryClassifier {
    fn labels(&self) -> &[Arc<str>] {
        &self.labels
    }

    fn scores(&self, image: &RgbImage) -> TriageResult<Vec<f32>> {
        let (width, height) = self.input_size;
        let resized = resize_exact(image, width, height);
        let tensor = self.normalizer.normalize_to_tensor(&resized)?;
        let output = self.infer.infer_2d(&tensor)?;

        let row: Vec<f32> = output.row(0).to_vec();
        if row.len() != self.labels.len() {
            return Err(TriageError::post_processing(
                &format!(
                    "category model produced {} scores for {} labels",
                    row.len(),
                    self.labels.len()
                ),
                crate::core::SimpleError::new("output width does not match label set"),
            ));
        }
        Ok(row)
    }
}
