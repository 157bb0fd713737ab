//! # Skin Triage
//!
//! A Rust library for two-stage skin lesion classification using ONNX models.
//!
//! The first stage assigns an image to one of four categories (`benign`,
//! `malignant`, `insect_bite`, `no_bites`). When — and only when — the top
//! category is `insect_bite`, a second-stage species classifier refines the
//! prediction among insect species sub-classes bundled with its checkpoint.
//!
//! ## Components
//!
//! * [`registry`] - One-time loading and validation of both classifiers
//! * [`pipeline`] - The prediction cascade and the unified result record
//! * [`processors`] - Image normalization and score post-processing
//! * [`core`] - Error handling, ONNX inference engine, and classifier traits
//! * [`utils`] - Image loading and resizing helpers
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use skin_triage::prelude::*;
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = ModelRegistryBuilder::new()
//!     .category_model_path("models/lesion_category.onnx")
//!     .species_checkpoint_path("models/insect_species/checkpoint.json")
//!     .build()?;
//!
//! let cascade = PredictionCascade::new(Arc::new(registry));
//! let report = cascade.predict(Path::new("photo.jpg"));
//! println!("{}", serde_json::to_string_pretty(&report)?);
//! # Ok(())
//! # }
//! ```
//!
//! A prediction never fails with an error type: decode, preprocessing, and
//! inference failures are all converted into a structured
//! [`pipeline::PredictionReport::Failed`] record at the cascade boundary.
//! Only model loading is fallible in the `Result` sense, and it fails fast
//! before any prediction can be served.

pub mod core;
pub mod pipeline;
pub mod processors;
pub mod registry;
pub mod utils;

/// Prelude module for convenient imports.
///
/// Bring the essentials into scope with a single use statement:
///
/// ```rust
/// use skin_triage::prelude::*;
/// ```
pub mod prelude {
    pub use crate::core::{TriageError, TriageResult};
    pub use crate::pipeline::{Prediction, PredictionCascade, PredictionReport, SpeciesPrediction};
    pub use crate::registry::{ModelRegistry, ModelRegistryBuilder, RegistryConfig};
    pub use crate::utils::load_image;
}
