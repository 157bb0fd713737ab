//! Species checkpoint bundle loading.
//!
//! A species checkpoint is a JSON manifest next to its ONNX weights file. The
//! manifest carries everything the second stage needs beyond the weights: the
//! trained class names in output order and the preprocessing transform the
//! model was trained with. All three keys are required; a manifest that parses
//! but lacks any of them is rejected with every missing key named at once.

use crate::core::{TriageError, TriageResult};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// The preprocessing transform bundled with a species checkpoint.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TransformSpec {
    /// Target input size as `[width, height]`.
    pub resize: [u32; 2],
    /// Pixel scaling factor applied before standardization.
    #[serde(default = "default_scale")]
    pub scale: f32,
    /// Per-channel mean, in post-scale units.
    #[serde(default)]
    pub mean: [f32; 3],
    /// Per-channel standard deviation.
    #[serde(default = "default_std")]
    pub std: [f32; 3],
}

fn default_scale() -> f32 {
    1.0 / 255.0
}

fn default_std() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

/// Raw manifest shape with every key optional, so missing keys can be
/// collected and reported together instead of failing on the first.
#[derive(Debug, Deserialize)]
struct RawManifest {
    weights: Option<String>,
    classes: Option<Vec<String>>,
    transform: Option<TransformSpec>,
}

/// A validated species checkpoint manifest.
#[derive(Debug, Clone)]
pub struct SpeciesCheckpoint {
    /// Absolute or manifest-relative path to the ONNX weights, resolved.
    pub weights_path: PathBuf,
    /// Species class names in model output order.
    pub classes: Vec<String>,
    /// The preprocessing transform to apply before inference.
    pub transform: TransformSpec,
}

impl SpeciesCheckpoint {
    /// Loads and validates a checkpoint manifest from disk.
    ///
    /// # Arguments
    ///
    /// * `manifest_path` - Path to the JSON manifest file
    ///
    /// # Errors
    ///
    /// * [`TriageError::ModelLoad`] if the file cannot be read or is not valid JSON
    /// * [`TriageError::CheckpointIncomplete`] if required keys are absent
    pub fn load(manifest_path: impl AsRef<Path>) -> TriageResult<Self> {
        let manifest_path = manifest_path.as_ref();
        let contents = std::fs::read_to_string(manifest_path).map_err(|e| {
            TriageError::model_load_error(
                manifest_path,
                "failed to read checkpoint manifest",
                Some("verify the checkpoint path"),
                Some(e),
            )
        })?;
        Self::from_json(&contents, manifest_path)
    }

    /// Parses and validates manifest JSON.
    ///
    /// The weights path in the manifest is resolved relative to the manifest's
    /// parent directory when it is not absolute.
    pub fn from_json(contents: &str, manifest_path: &Path) -> TriageResult<Self> {
        let raw: RawManifest = serde_json::from_str(contents).map_err(|e| {
            TriageError::model_load_error(
                manifest_path,
                "checkpoint manifest is not valid JSON",
                None,
                Some(e),
            )
        })?;

        let mut missing = Vec::new();
        if raw.weights.is_none() {
            missing.push("weights".to_string());
        }
        if raw.classes.is_none() {
            missing.push("classes".to_string());
        }
        if raw.transform.is_none() {
            missing.push("transform".to_string());
        }
        if !missing.is_empty() {
            return Err(TriageError::checkpoint_incomplete(manifest_path, missing));
        }

        // Guarded above, so the unwraps cannot fail.
        let weights = raw.weights.unwrap_or_default();
        let classes = raw.classes.unwrap_or_default();
        let transform = raw.transform.ok_or_else(|| {
            TriageError::checkpoint_incomplete(manifest_path, vec!["transform".to_string()])
        })?;

        if classes.is_empty() {
            return Err(TriageError::model_load_error(
                manifest_path,
                "checkpoint declares an empty class list",
                Some("re-export the checkpoint with its trained class names"),
                None::<crate::core::SimpleError>,
            ));
        }

        let weights_path = {
            let candidate = PathBuf::from(&weights);
            if candidate.is_absolute() {
                candidate
            } else {
                manifest_path
                    .parent()
                    .map(|dir| dir.join(&candidate))
                    .unwrap_or(candidate)
            }
        };

        Ok(SpeciesCheckpoint {
            weights_path,
            classes,
            transform,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST_PATH: &str = "models/species/checkpoint.json";

    fn manifest_path() -> &'static Path {
        Path::new(MANIFEST_PATH)
    }

    #[test]
    fn test_complete_manifest_parses() {
        let json = r#"{
            "weights": "species.onnx",
            "classes": ["mosquito", "tick", "spider"],
            "transform": {
                "resize": [224, 224],
                "mean": [0.485, 0.456, 0.406],
                "std": [0.229, 0.224, 0.225]
            }
        }"#;
        let checkpoint = SpeciesCheckpoint::from_json(json, manifest_path()).unwrap();
        assert_eq!(checkpoint.classes, vec!["mosquito", "tick", "spider"]);
        assert_eq!(checkpoint.transform.resize, [224, 224]);
        assert_eq!(
            checkpoint.weights_path,
            Path::new("models/species/species.onnx")
        );
    }

    #[test]
    fn test_missing_classes_is_incomplete() {
        let json = r#"{
            "weights": "species.onnx",
            "transform": { "resize": [224, 224] }
        }"#;
        let error = SpeciesCheckpoint::from_json(json, manifest_path()).unwrap_err();
        match error {
            TriageError::CheckpointIncomplete { missing, .. } => {
                assert_eq!(missing, vec!["classes".to_string()]);
            }
            other => panic!("expected CheckpointIncomplete, got {other:?}"),
        }
    }

    #[test]
    fn test_all_missing_keys_reported_together() {
        let error = SpeciesCheckpoint::from_json("{}", manifest_path()).unwrap_err();
        match error {
            TriageError::CheckpointIncomplete { missing, .. } => {
                assert_eq!(
                    missing,
                    vec![
                        "weights".to_string(),
                        "classes".to_string(),
                        "transform".to_string()
                    ]
                );
            }
            other => panic!("expected CheckpointIncomplete, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_json_is_model_load_error() {
        let error = SpeciesCheckpoint::from_json("not json", manifest_path()).unwrap_err();
        assert!(matches!(error, TriageError::ModelLoad { .. }));
    }

    #[test]
    fn test_transform_defaults() {
        let json = r#"{
            "weights": "/abs/species.onnx",
            "classes": ["mosquito"],
            "transform": { "resize": [160, 160] }
        }"#;
        let checkpoint = SpeciesCheckpoint::from_json(json, manifest_path()).unwrap();
        assert!((checkpoint.transform.scale - 1.0 / 255.0).abs() < 1e-9);
        assert_eq!(checkpoint.transform.mean, [0.0, 0.0, 0.0]);
        assert_eq!(checkpoint.transform.std, [1.0, 1.0, 1.0]);
        assert_eq!(checkpoint.weights_path, Path::new("/abs/species.onnx"));
    }

    #[test]
    fn test_empty_class_list_rejected() {
        let json = r#"{
            "weights": "species.onnx",
            "classes": [],
            "transform": { "resize": [224, 224] }
        }"#;
        let error = SpeciesCheckpoint::from_json(json, manifest_path()).unwrap_err();
        assert!(matches!(error, TriageError::ModelLoad { .. }));
    }
}
