//! Error types for the triage pipeline.
//!
//! The error taxonomy mirrors the lifecycle of the system:
//!
//! - [`TriageError::ModelLoad`] and [`TriageError::CheckpointIncomplete`] are
//!   startup errors. They are fatal: the registry refuses to serve predictions
//!   with only one model loaded.
//! - Everything else can occur during a single prediction call and is caught
//!   at the cascade boundary, where it is converted into a structured failure
//!   record instead of propagating to the caller.

use thiserror::Error;

/// Convenient result alias for triage operations.
pub type TriageResult<T> = Result<T, TriageError>;

/// The stage of per-image processing where an error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStage {
    /// Decoding an image file from disk.
    ImageDecode,
    /// Resizing an image to the model input dimensions.
    Resize,
    /// Pixel normalization and tensor conversion.
    Normalization,
    /// Converting raw model output into scores and labels.
    PostProcessing,
}

impl std::fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ProcessingStage::ImageDecode => "image decode",
            ProcessingStage::Resize => "resize",
            ProcessingStage::Normalization => "normalization",
            ProcessingStage::PostProcessing => "post-processing",
        };
        f.write_str(name)
    }
}

/// Errors produced by the triage pipeline.
#[derive(Error, Debug)]
pub enum TriageError {
    /// A model artifact could not be deserialized. Fatal at startup.
    #[error("Model load failed for '{model_path}': {reason}{suggestion}")]
    ModelLoad {
        /// Path to the artifact that failed to load.
        model_path: String,
        /// Short reason description.
        reason: String,
        /// Optional suggestion, pre-formatted with a leading separator.
        suggestion: String,
        /// The underlying cause, when one exists.
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A checkpoint bundle parsed but lacks required metadata. Fatal at startup.
    #[error("Checkpoint '{checkpoint_path}' is missing required fields: {}", missing.join(", "))]
    CheckpointIncomplete {
        /// Path to the incomplete checkpoint manifest.
        checkpoint_path: String,
        /// Names of every missing required field.
        missing: Vec<String>,
    },

    /// A per-image processing step failed.
    #[error("{kind} failed: {context}")]
    Processing {
        /// The processing stage where the failure occurred.
        kind: ProcessingStage,
        /// Human-readable context for the failure.
        context: String,
        /// The underlying cause.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Model inference failed.
    #[error("Inference failed for model '{model_name}': {context}")]
    Inference {
        /// Name of the model that failed.
        model_name: String,
        /// Human-readable context for the failure.
        context: String,
        /// The underlying cause.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The caller provided input the pipeline cannot work with.
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// A message describing the invalid input.
        message: String,
    },

    /// A configuration value is out of range or inconsistent.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// A message describing the configuration error.
        message: String,
    },

    /// A tensor could not be built with the expected shape.
    #[error("Tensor shape error: {0}")]
    Tensor(#[from] ndarray::ShapeError),

    /// An ONNX Runtime call failed outside of a model-specific context.
    #[error("ONNX Runtime error: {0}")]
    Ort(#[from] ort::Error),
}

/// A minimal error type for failures without an underlying source.
#[derive(Debug)]
pub struct SimpleError(String);

impl SimpleError {
    /// Creates a new SimpleError with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl std::fmt::Display for SimpleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for SimpleError {}

impl TriageError {
    /// Creates a TriageError for model load failures with contextual suggestions.
    ///
    /// # Arguments
    ///
    /// * `model_path` - Path to the model artifact
    /// * `reason` - Short reason description
    /// * `suggestion` - Optional suggestion message (without punctuation)
    /// * `source` - Optional underlying error
    pub fn model_load_error(
        model_path: impl AsRef<std::path::Path>,
        reason: impl Into<String>,
        suggestion: Option<&str>,
        source: Option<impl std::error::Error + Send + Sync + 'static>,
    ) -> Self {
        let suggestion = suggestion
            .map(|s| format!("; suggested fix: {}", s))
            .unwrap_or_default();
        Self::ModelLoad {
            model_path: model_path.as_ref().display().to_string(),
            reason: reason.into(),
            suggestion,
            source: source.map(|e| Box::new(e) as _),
        }
    }

    /// Creates a TriageError for a checkpoint that parsed but lacks required fields.
    pub fn checkpoint_incomplete(
        checkpoint_path: impl AsRef<std::path::Path>,
        missing: Vec<String>,
    ) -> Self {
        Self::CheckpointIncomplete {
            checkpoint_path: checkpoint_path.as_ref().display().to_string(),
            missing,
        }
    }

    /// Internal helper to build a Processing error with minimal boilerplate.
    #[inline]
    fn processing_with_context(
        kind: ProcessingStage,
        context: impl Into<String>,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Processing {
            kind,
            context: context.into(),
            source: Box::new(error),
        }
    }

    /// Creates a TriageError for image decode failures.
    pub fn image_decode(
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::processing_with_context(ProcessingStage::ImageDecode, context, error)
    }

    /// Creates a TriageError for resize failures.
    pub fn resize_error(
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::processing_with_context(ProcessingStage::Resize, context, error)
    }

    /// Creates a TriageError for normalization failures.
    pub fn normalization(
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::processing_with_context(ProcessingStage::Normalization, context, error)
    }

    /// Creates a TriageError for post-processing failures.
    pub fn post_processing(
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::processing_with_context(ProcessingStage::PostProcessing, context, error)
    }

    /// Creates a TriageError for inference operations with model context.
    pub fn inference_error(
        model_name: &str,
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Inference {
            model_name: model_name.to_string(),
            context: context.to_string(),
            source: Box::new(error),
        }
    }

    /// Creates a TriageError for invalid input.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates a TriageError for configuration errors.
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Returns true for errors that are fatal at startup.
    ///
    /// Startup errors propagate unrecovered; per-call errors are caught at the
    /// cascade boundary instead.
    pub fn is_startup_error(&self) -> bool {
        matches!(
            self,
            TriageError::ModelLoad { .. } | TriageError::CheckpointIncomplete { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkpoint_incomplete_names_missing_fields() {
        let error = TriageError::checkpoint_incomplete(
            "models/checkpoint.json",
            vec!["classes".to_string(), "transform".to_string()],
        );
        let message = error.to_string();
        assert!(message.contains("classes"));
        assert!(message.contains("transform"));
        assert!(error.is_startup_error());
    }

    #[test]
    fn test_model_load_error_with_suggestion() {
        let error = TriageError::model_load_error(
            "models/missing.onnx",
            "failed to create ONNX session",
            Some("verify the model path"),
            Some(std::io::Error::other("no such file")),
        );
        let message = error.to_string();
        assert!(message.contains("models/missing.onnx"));
        assert!(message.contains("suggested fix: verify the model path"));
        assert!(error.is_startup_error());
    }

    #[test]
    fn test_processing_error_is_not_fatal() {
        let error = TriageError::image_decode(
            "failed to open 'nope.jpg'",
            std::io::Error::other("no such file"),
        );
        assert!(!error.is_startup_error());
        assert!(error.to_string().contains("image decode"));
    }
}
