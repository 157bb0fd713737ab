//! Trait seams between the model registry and the prediction cascade.
//!
//! The cascade never talks to ONNX Runtime directly; it calls these traits,
//! which the registry's loaded classifiers implement. Keeping the seam here
//! lets tests drive the cascade with fixed-output doubles instead of real
//! model artifacts.

use crate::core::TriageResult;
use image::RgbImage;
use std::sync::Arc;

/// First-stage classifier: scores an image over the fixed category labels.
pub trait CategoryScorer: Send + Sync {
    /// The ordered category labels, matching the output vector by index.
    fn labels(&self) -> &[Arc<str>];

    /// Scores an image, returning one probability in `[0, 1]` per label.
    ///
    /// The returned vector must have the same length and order as
    /// [`CategoryScorer::labels`]. Implementations handle their own resize and
    /// normalization; callers pass the decoded image as-is.
    fn scores(&self, image: &RgbImage) -> TriageResult<Vec<f32>>;
}

/// Second-stage classifier: raw species logits for an insect bite image.
pub trait SpeciesScorer: Send + Sync {
    /// The ordered species labels, matching the output vector by index.
    fn labels(&self) -> &[Arc<str>];

    /// Produces one raw logit per species label.
    ///
    /// The bundled checkpoint transform is applied internally; the caller
    /// treats preprocessing as opaque. Outputs are unnormalized — the cascade
    /// applies softmax.
    fn logits(&self, image: &RgbImage) -> TriageResult<Vec<f32>>;
}
