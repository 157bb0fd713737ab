//! Second-stage insect species classifier.

use crate::core::{
    OrtInfer, OrtSessionOptions, SimpleError, SpeciesScorer, Tensor4D, TriageError, TriageResult,
};
use crate::processors::NormalizeImage;
use crate::registry::checkpoint::{SpeciesCheckpoint, TransformSpec};
use crate::utils::resize_exact;
use image::RgbImage;
use std::path::Path;
use std::sync::Arc;

/// The bundled preprocessing transform, compiled from a checkpoint manifest.
#[derive(Debug, Clone)]
pub struct SpeciesTransform {
    resize: (u32, u32),
    normalizer: NormalizeImage,
}

impl SpeciesTransform {
    /// Compiles a manifest transform into an applicable form.
    pub fn from_spec(spec: &TransformSpec) -> TriageResult<Self> {
        let normalizer = NormalizeImage::new(spec.scale, spec.mean, spec.std)?;
        Ok(Self {
            resize: (spec.resize[0], spec.resize[1]),
            normalizer,
        })
    }

    /// Applies resize and normalization, producing a one-image NCHW batch.
    pub fn apply(&self, image: &RgbImage) -> TriageResult<Tensor4D> {
        let (width, height) = self.resize;
        let resized = resize_exact(image, width, height);
        self.normalizer.normalize_to_tensor(&resized)
    }
}

/// The species classifier loaded from a checkpoint bundle.
///
/// Produces raw logits; probability normalization happens downstream so the
/// same softmax path serves mocked and real scorers alike.
#[derive(Debug)]
pub struct SpeciesClassifier {
    infer: OrtInfer,
    transform: SpeciesTransform,
    labels: Vec<Arc<str>>,
}

impl SpeciesClassifier {
    /// Loads the species classifier from a checkpoint manifest path.
    ///
    /// # Arguments
    ///
    /// * `manifest_path` - Path to the checkpoint JSON manifest
    /// * `options` - ONNX Runtime session options
    ///
    /// # Errors
    ///
    /// * [`TriageError::CheckpointIncomplete`] when required manifest keys are absent
    /// * [`TriageError::ModelLoad`] when the manifest or weights cannot be loaded
    pub fn load(manifest_path: impl AsRef<Path>, options: &OrtSessionOptions) -> TriageResult<Self> {
        let checkpoint = SpeciesCheckpoint::load(manifest_path)?;
        Self::from_checkpoint(checkpoint, options)
    }

    /// Builds the classifier from an already-validated checkpoint.
    pub fn from_checkpoint(
        checkpoint: SpeciesCheckpoint,
        options: &OrtSessionOptions,
    ) -> TriageResult<Self> {
        let transform = SpeciesTransform::from_spec(&checkpoint.transform)?;
        let infer = OrtInfer::load(&checkpoint.weights_path, options)?;
        let labels = checkpoint
            .classes
            .iter()
            .map(|s| Arc::from(s.as_str()))
            .collect();

        Ok(Self {
            infer,
            transform,
            labels,
        })
    }
}

impl SpeciesScorer for SpeciesClassifier {
    fn labels(&self) -> &[Arc<str>] {
        &self.labels
    }

    fn logits(&self, image: &RgbImage) -> TriageResult<Vec<f32>> {
        let tensor = self.transform.apply(image)?;
        let output = self.infer.infer_2d(&tensor)?;

        let row: Vec<f32> = output.row(0).to_vec();
        if row.len() != self.labels.len() {
            return Err(TriageError::post_processing(
                &format!(
                    "species model produced {} logits for {} labels",
                    row.len(),
                    self.labels.len()
                ),
                SimpleError::new("output width does not match checkpoint classes"),
            ));
        }
        Ok(row)
    }
}
