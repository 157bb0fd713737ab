//! Core building blocks of the triage pipeline.
//!
//! This module contains the fundamental components shared across the crate:
//! - Error handling
//! - ONNX Runtime inference engine integration
//! - Fixed category labels and the refinement gate sentinel
//! - Traits defining the classifier seams
//!
//! It also provides re-exports of commonly used types for convenience.

pub mod constants;
pub mod errors;
pub mod inference;
pub mod traits;

pub use constants::{INSECT_BITE_LABEL, LESION_CATEGORY_LABELS, lesion_category_labels};
pub use errors::{ProcessingStage, SimpleError, TriageError, TriageResult};
pub use inference::{OrtInfer, OrtOptimizationLevel, OrtSessionOptions};
pub use traits::{CategoryScorer, SpeciesScorer};

/// A 2D tensor of f32 values (batch_size x num_classes).
pub type Tensor2D = ndarray::Array2<f32>;
/// A 4D tensor of f32 values in NCHW layout.
pub type Tensor4D = ndarray::Array4<f32>;

/// Initializes the tracing subscriber for logging.
///
/// This function sets up the tracing subscriber with environment filter and
/// formatting layer. It's typically called at the start of an application to
/// enable logging.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();
}
