//! One-time loading and validation of both classifiers.
//!
//! The registry loads the category model and the species checkpoint together
//! at startup and fails fast if either cannot be loaded. A constructed
//! registry is immutable and can be shared across threads behind an `Arc`.

pub mod category;
pub mod checkpoint;
pub mod species;

pub use category::CategoryClassifier;
pub use checkpoint::{SpeciesCheckpoint, TransformSpec};
pub use species::{SpeciesClassifier, SpeciesTransform};

use crate::core::{CategoryScorer, OrtSessionOptions, SpeciesScorer, TriageError, TriageResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// Configuration for loading the model registry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Path to the first-stage category ONNX model.
    pub category_model_path: PathBuf,
    /// Path to the species checkpoint JSON manifest.
    pub species_checkpoint_path: PathBuf,
    /// ONNX Runtime session options shared by both models.
    #[serde(default)]
    pub ort: OrtSessionOptions,
}

/// Holds both loaded classifiers for the lifetime of the process.
pub struct ModelRegistry {
    category: Box<dyn CategoryScorer>,
    species: Box<dyn SpeciesScorer>,
    category_input_size: Option<(u32, u32)>,
}

impl std::fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelRegistry")
            .field("category_labels", &self.category.labels())
            .field("species_labels", &self.species.labels())
            .finish()
    }
}

impl ModelRegistry {
    /// Loads both classifiers according to the configuration.
    ///
    /// # Errors
    ///
    /// Propagates the first startup error encountered. The registry is never
    /// constructed in a half-loaded state.
    pub fn load(config: &RegistryConfig) -> TriageResult<Self> {
        let category = CategoryClassifier::load(&config.category_model_path, &config.ort)?;
        let species = SpeciesClassifier::load(&config.species_checkpoint_path, &config.ort)?;
        let category_input_size = Some(category.input_size());

        tracing::info!(
            category_labels = category.labels().len(),
            species_labels = species.labels().len(),
            "model registry ready"
        );

        Ok(Self {
            category: Box::new(category),
            species: Box::new(species),
            category_input_size,
        })
    }

    /// Builds a registry from preconstructed scorers.
    ///
    /// Primarily useful in tests, where fixed-output scorers stand in for
    /// loaded models.
    pub fn from_parts(
        category: Box<dyn CategoryScorer>,
        species: Box<dyn SpeciesScorer>,
    ) -> Self {
        Self {
            category,
            species,
            category_input_size: None,
        }
    }

    /// Returns the first-stage category scorer.
    pub fn category(&self) -> &dyn CategoryScorer {
        self.category.as_ref()
    }

    /// Returns the second-stage species scorer.
    pub fn species(&self) -> &dyn SpeciesScorer {
        self.species.as_ref()
    }

    /// Returns the ordered category labels.
    pub fn category_labels(&self) -> &[Arc<str>] {
        self.category.labels()
    }

    /// Returns the ordered species labels.
    pub fn species_labels(&self) -> &[Arc<str>] {
        self.species.labels()
    }

    /// Returns the category model's input size as `(width, height)`, when
    /// known. Registries built from raw scorer parts have no attached model
    /// metadata and return `None`.
    pub fn category_input_size(&self) -> Option<(u32, u32)> {
        self.category_input_size
    }
}

/// Builder for [`ModelRegistry`] configuration and loading.
#[derive(Debug, Clone, Default)]
pub struct ModelRegistryBuilder {
    category_model_path: Option<PathBuf>,
    species_checkpoint_path: Option<PathBuf>,
    ort: OrtSessionOptions,
}

impl ModelRegistryBuilder {
    /// Creates a new builder with default session options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the path to the category ONNX model.
    pub fn category_model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.category_model_path = Some(path.into());
        self
    }

    /// Sets the path to the species checkpoint manifest.
    pub fn species_checkpoint_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.species_checkpoint_path = Some(path.into());
        self
    }

    /// Sets the ONNX Runtime session options for both models.
    pub fn ort_options(mut self, options: OrtSessionOptions) -> Self {
        self.ort = options;
        self
    }

    /// Validates the configuration and loads both models.
    ///
    /// # Errors
    ///
    /// Returns a [`TriageError::ConfigError`] if either path is unset, or the
    /// underlying load error otherwise.
    pub fn build(self) -> TriageResult<ModelRegistry> {
        let category_model_path = self.category_model_path.ok_or_else(|| {
            TriageError::config_error("category model path is required")
        })?;
        let species_checkpoint_path = self.species_checkpoint_path.ok_or_else(|| {
            TriageError::config_error("species checkpoint path is required")
        })?;

        ModelRegistry::load(&RegistryConfig {
            category_model_path,
            species_checkpoint_path,
            ort: self.ort,
        })
    }
}
