//! The unified prediction record and its assembly.
//!
//! Every outcome of a prediction call serializes into one of two shapes: a
//! complete [`Prediction`] or a one-field failure record. The species block is
//! serialized as an explicit `null` when the refinement gate did not fire, so
//! callers can distinguish "not computed" from "computed with low confidence".

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A single label with its percent-scale probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassProbability {
    /// The class label.
    pub label: String,
    /// Probability in `[0, 100]`.
    pub percent: f32,
}

/// The species refinement block, present only when the gate fired.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesPrediction {
    /// Top species label.
    pub label: String,
    /// Top species probability in `[0, 100]`.
    pub confidence: f32,
    /// Full species probability vector in label order.
    pub probabilities: Vec<ClassProbability>,
}

/// A complete prediction for one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// The input image path, echoed back.
    pub image_path: String,
    /// Top category label.
    pub category: String,
    /// Top category probability in `[0, 100]`.
    pub category_confidence: f32,
    /// Full category probability vector in label order.
    pub category_probabilities: Vec<ClassProbability>,
    /// Species refinement, or `null` when the top category is not an
    /// insect bite.
    pub species: Option<SpeciesPrediction>,
}

/// The externally visible outcome of one prediction call.
///
/// Serializes untagged: a completed prediction keeps the [`Prediction`] shape,
/// a failure becomes `{"error": <message>}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PredictionReport {
    /// The cascade completed and produced a prediction.
    Completed(Prediction),
    /// Something failed during the call; the message is always non-empty.
    Failed {
        /// Human-readable description of the failure.
        error: String,
    },
}

impl PredictionReport {
    /// Returns the prediction if the call completed.
    pub fn prediction(&self) -> Option<&Prediction> {
        match self {
            PredictionReport::Completed(prediction) => Some(prediction),
            PredictionReport::Failed { .. } => None,
        }
    }

    /// Returns true if the call failed.
    pub fn is_failed(&self) -> bool {
        matches!(self, PredictionReport::Failed { .. })
    }
}

/// A percent-scale probability vector with its arg-max entry selected.
///
/// The top label and confidence are taken from the same vector that is
/// reported, never recomputed, so the two cannot drift apart.
#[derive(Debug, Clone)]
pub struct ScoredClasses {
    /// Full probability vector in label order.
    pub probabilities: Vec<ClassProbability>,
    /// Label of the arg-max entry.
    pub top_label: String,
    /// Percent value of the arg-max entry.
    pub top_confidence: f32,
}

impl ScoredClasses {
    /// Pairs labels with percent values and selects the arg-max entry.
    ///
    /// Ties resolve to the lowest index. Returns `None` when the inputs are
    /// empty or their lengths disagree.
    pub fn from_percents(labels: &[Arc<str>], percents: &[f32]) -> Option<Self> {
        if labels.is_empty() || labels.len() != percents.len() {
            return None;
        }
        let top_index = crate::processors::argmax(percents)?;

        let probabilities = labels
            .iter()
            .zip(percents.iter())
            .map(|(label, &percent)| ClassProbability {
                label: label.to_string(),
                percent,
            })
            .collect();

        Some(Self {
            probabilities,
            top_label: labels[top_index].to_string(),
            top_confidence: percents[top_index],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> Vec<Arc<str>> {
        names.iter().map(|&n| Arc::from(n)).collect()
    }

    #[test]
    fn test_top_entry_comes_from_the_reported_vector() {
        let scored =
            ScoredClasses::from_percents(&labels(&["a", "b", "c"]), &[10.0, 70.0, 20.0]).unwrap();
        assert_eq!(scored.top_label, "b");
        assert_eq!(scored.top_confidence, 70.0);
        assert_eq!(scored.probabilities[1].percent, scored.top_confidence);
    }

    #[test]
    fn test_tie_breaks_to_lowest_index() {
        let scored =
            ScoredClasses::from_percents(&labels(&["a", "b"]), &[50.0, 50.0]).unwrap();
        assert_eq!(scored.top_label, "a");
    }

    #[test]
    fn test_length_mismatch_is_rejected() {
        assert!(ScoredClasses::from_percents(&labels(&["a", "b"]), &[1.0]).is_none());
        assert!(ScoredClasses::from_percents(&[], &[]).is_none());
    }

    #[test]
    fn test_absent_species_serializes_as_null() {
        let prediction = Prediction {
            image_path: "photo.jpg".to_string(),
            category: "benign".to_string(),
            category_confidence: 90.0,
            category_probabilities: vec![ClassProbability {
                label: "benign".to_string(),
                percent: 90.0,
            }],
            species: None,
        };
        let json = serde_json::to_value(PredictionReport::Completed(prediction)).unwrap();
        assert!(json.get("species").unwrap().is_null());
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_failure_serializes_as_single_error_field() {
        let report = PredictionReport::Failed {
            error: "image decode failed".to_string(),
        };
        let json = serde_json::to_value(&report).unwrap();
        let object = json.as_object().unwrap();
        assert_eq!(object.len(), 1);
        assert_eq!(object["error"], "image decode failed");
    }
}
