//! The two-stage prediction cascade.
//!
//! One call classifies one image. The first stage always runs; the second
//! stage runs only when the first stage's top label is the insect bite
//! sentinel. Every failure inside a call is caught at the boundary and turned
//! into a failure record, so `predict` has no error path for the caller to
//! handle.

use crate::core::{INSECT_BITE_LABEL, SimpleError, TriageError, TriageResult};
use crate::pipeline::result::{Prediction, PredictionReport, ScoredClasses, SpeciesPrediction};
use crate::processors::{softmax, to_percentages};
use crate::registry::ModelRegistry;
use crate::utils::load_image;
use std::path::Path;
use std::sync::Arc;

/// Runs the category classifier and conditionally the species classifier.
///
/// The registry is injected and shared; the cascade holds no other state, so
/// repeated calls on the same image are independent and deterministic.
#[derive(Debug, Clone)]
pub struct PredictionCascade {
    registry: Arc<ModelRegistry>,
}

impl PredictionCascade {
    /// Creates a cascade over a loaded registry.
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self { registry }
    }

    /// Classifies one image, refining with the species classifier when the
    /// top category is an insect bite.
    ///
    /// # Arguments
    ///
    /// * `image_path` - Path to the image file to classify
    ///
    /// # Returns
    ///
    /// A complete prediction, or a failure record if anything went wrong.
    /// Errors never escape this method.
    pub fn predict(&self, image_path: impl AsRef<Path>) -> PredictionReport {
        let image_path = image_path.as_ref();
        match self.predict_inner(image_path) {
            Ok(prediction) => PredictionReport::Completed(prediction),
            Err(error) => {
                tracing::error!(
                    image = %image_path.display(),
                    error = %error,
                    "prediction failed"
                );
                PredictionReport::Failed {
                    error: error.to_string(),
                }
            }
        }
    }

    fn predict_inner(&self, image_path: &Path) -> TriageResult<Prediction> {
        let image = load_image(image_path)?;

        let probabilities = self.registry.category().scores(&image)?;
        let percents = to_percentages(&probabilities);
        let category = ScoredClasses::from_percents(self.registry.category_labels(), &percents)
            .ok_or_else(|| {
                TriageError::post_processing(
                    "category scores do not align with the label set",
                    SimpleError::new(format!("{} scores returned", percents.len())),
                )
            })?;

        tracing::debug!(
            image = %image_path.display(),
            category = %category.top_label,
            confidence = category.top_confidence,
            "category stage complete"
        );

        let species = if category.top_label == INSECT_BITE_LABEL {
            Some(self.refine_species(image_path)?)
        } else {
            None
        };

        Ok(Prediction {
            image_path: image_path.display().to_string(),
            category: category.top_label,
            category_confidence: category.top_confidence,
            category_probabilities: category.probabilities,
            species,
        })
    }

    /// Second stage: re-decode the image and score it over the species labels.
    ///
    /// The image is re-opened rather than reusing the first stage's decoded
    /// copy; the checkpoint transform owns all preprocessing from raw RGB.
    fn refine_species(&self, image_path: &Path) -> TriageResult<SpeciesPrediction> {
        let image = load_image(image_path)?;
        let logits = self.registry.species().logits(&image)?;
        let percents = to_percentages(&softmax(&logits));

        let scored = ScoredClasses::from_percents(self.registry.species_labels(), &percents)
            .ok_or_else(|| {
                TriageError::post_processing(
                    "species logits do not align with the checkpoint classes",
                    SimpleError::new(format!("{} logits returned", logits.len())),
                )
            })?;

        tracing::debug!(
            image = %image_path.display(),
            species = %scored.top_label,
            confidence = scored.top_confidence,
            "species stage complete"
        );

        Ok(SpeciesPrediction {
            label: scored.top_label,
            confidence: scored.top_confidence,
            probabilities: scored.probabilities,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CategoryScorer, SpeciesScorer, TriageResult};
    use image::RgbImage;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedCategory {
        labels: Vec<Arc<str>>,
        scores: Vec<f32>,
    }

    impl FixedCategory {
        fn new(scores: Vec<f32>) -> Self {
            Self {
                labels: crate::core::lesion_category_labels(),
                scores,
            }
        }
    }

    impl CategoryScorer for FixedCategory {
        fn labels(&self) -> &[Arc<str>] {
            &self.labels
        }
        fn scores(&self, _image: &RgbImage) -> TriageResult<Vec<f32>> {
            Ok(self.scores.clone())
        }
    }

    struct FixedSpecies {
        labels: Vec<Arc<str>>,
        logits: Vec<f32>,
        calls: Arc<AtomicUsize>,
    }

    impl FixedSpecies {
        fn new(labels: &[&str], logits: Vec<f32>) -> Self {
            Self {
                labels: labels.iter().map(|&l| Arc::from(l)).collect(),
                logits,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn call_counter(&self) -> Arc<AtomicUsize> {
            Arc::clone(&self.calls)
        }
    }

    impl SpeciesScorer for FixedSpecies {
        fn labels(&self) -> &[Arc<str>] {
            &self.labels
        }
        fn logits(&self, _image: &RgbImage) -> TriageResult<Vec<f32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.logits.clone())
        }
    }

    fn cascade(category_scores: Vec<f32>, species: FixedSpecies) -> PredictionCascade {
        let registry = ModelRegistry::from_parts(
            Box::new(FixedCategory::new(category_scores)),
            Box::new(species),
        );
        PredictionCascade::new(Arc::new(registry))
    }

    fn temp_image() -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lesion.png");
        RgbImage::from_pixel(8, 8, image::Rgb([120, 80, 60]))
            .save(&path)
            .unwrap();
        (dir, path)
    }

    #[test]
    fn test_insect_bite_triggers_species_refinement() {
        let (_dir, path) = temp_image();
        let cascade = cascade(
            vec![0.1, 0.05, 0.8, 0.05],
            FixedSpecies::new(&["mosquito", "tick"], vec![2.0, 0.5]),
        );

        let report = cascade.predict(&path);
        let prediction = report.prediction().expect("prediction must complete");

        assert_eq!(prediction.category, "insect_bite");
        assert!((prediction.category_confidence - 80.0).abs() < 1e-4);

        let species = prediction.species.as_ref().expect("species must be present");
        assert_eq!(species.label, "mosquito");
        assert!((species.confidence - 81.76).abs() < 0.1);
        assert_eq!(species.probabilities.len(), 2);
    }

    #[test]
    fn test_top_category_matches_argmax_of_reported_vector() {
        let (_dir, path) = temp_image();
        let cascade = cascade(
            vec![0.3, 0.4, 0.2, 0.1],
            FixedSpecies::new(&["mosquito"], vec![1.0]),
        );

        let report = cascade.predict(&path);
        let prediction = report.prediction().unwrap();

        let max_entry = prediction
            .category_probabilities
            .iter()
            .max_by(|a, b| a.percent.partial_cmp(&b.percent).unwrap())
            .unwrap();
        assert_eq!(prediction.category, max_entry.label);
        assert_eq!(prediction.category_confidence, max_entry.percent);
    }

    #[test]
    fn test_benign_short_circuits_species_stage() {
        let (_dir, path) = temp_image();
        let species = FixedSpecies::new(&["mosquito", "tick"], vec![2.0, 0.5]);
        let registry = ModelRegistry::from_parts(
            Box::new(FixedCategory::new(vec![0.9, 0.02, 0.03, 0.05])),
            Box::new(species),
        );
        let cascade = PredictionCascade::new(Arc::new(registry));

        let report = cascade.predict(&path);
        let prediction = report.prediction().unwrap();

        assert_eq!(prediction.category, "benign");
        assert!((prediction.category_confidence - 90.0).abs() < 1e-4);
        assert!(prediction.species.is_none());
    }

    #[test]
    fn test_species_never_invoked_without_gate() {
        let (_dir, path) = temp_image();
        let species = FixedSpecies::new(&["mosquito"], vec![1.0]);
        let calls = species.call_counter();
        let registry = ModelRegistry::from_parts(
            Box::new(FixedCategory::new(vec![0.9, 0.02, 0.03, 0.05])),
            Box::new(species),
        );
        let cascade = PredictionCascade::new(Arc::new(registry));

        let report = cascade.predict(&path);
        assert!(report.prediction().unwrap().species.is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_species_percentages_sum_to_hundred() {
        let (_dir, path) = temp_image();
        let cascade = cascade(
            vec![0.1, 0.05, 0.8, 0.05],
            FixedSpecies::new(&["mosquito", "tick", "spider"], vec![1.2, 0.4, -0.3]),
        );

        let report = cascade.predict(&path);
        let species = report.prediction().unwrap().species.clone().unwrap();

        let sum: f32 = species.probabilities.iter().map(|p| p.percent).sum();
        assert!((sum - 100.0).abs() < 0.1);
        assert!(species
            .probabilities
            .iter()
            .all(|p| (0.0..=100.0).contains(&p.percent)));
    }

    #[test]
    fn test_repeated_calls_are_identical() {
        let (_dir, path) = temp_image();
        let cascade = cascade(
            vec![0.1, 0.05, 0.8, 0.05],
            FixedSpecies::new(&["mosquito", "tick"], vec![2.0, 0.5]),
        );

        let first = cascade.predict(&path);
        let second = cascade.predict(&path);
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_image_becomes_error_record() {
        let cascade = cascade(
            vec![0.1, 0.05, 0.8, 0.05],
            FixedSpecies::new(&["mosquito"], vec![1.0]),
        );

        let report = cascade.predict("no/such/image.jpg");
        match report {
            PredictionReport::Failed { error } => assert!(!error.is_empty()),
            other => panic!("expected a failure record, got {other:?}"),
        }
    }

    #[test]
    fn test_tie_breaks_to_first_category_label() {
        let (_dir, path) = temp_image();
        let cascade = cascade(
            vec![0.4, 0.4, 0.1, 0.1],
            FixedSpecies::new(&["mosquito"], vec![1.0]),
        );

        let report = cascade.predict(&path);
        assert_eq!(report.prediction().unwrap().category, "benign");
    }
}
