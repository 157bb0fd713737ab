//! ONNX Runtime inference engine with configurable sessions.
//!
//! [`OrtInfer`] wraps a single ONNX Runtime session behind a mutex, discovers
//! input/output tensor names from session metadata, and exposes the 2D
//! inference shape (`batch_size x num_classes`) both classifiers produce.

use crate::core::{
    errors::{SimpleError, TriageError, TriageResult},
    Tensor2D, Tensor4D,
};
use ndarray::ArrayView2;
use ort::{
    logging::LogLevel,
    session::{builder::GraphOptimizationLevel, Session},
    value::{TensorRef, ValueType},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Graph optimization levels for ONNX Runtime sessions.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub enum OrtOptimizationLevel {
    /// Disable all optimizations.
    DisableAll,
    /// Enable basic optimizations.
    Level1,
    /// Enable extended optimizations.
    Level2,
    /// Enable all optimizations.
    #[default]
    Level3,
}

impl OrtOptimizationLevel {
    fn to_ort(self) -> GraphOptimizationLevel {
        match self {
            OrtOptimizationLevel::DisableAll => GraphOptimizationLevel::Disable,
            OrtOptimizationLevel::Level1 => GraphOptimizationLevel::Level1,
            OrtOptimizationLevel::Level2 => GraphOptimizationLevel::Level2,
            OrtOptimizationLevel::Level3 => GraphOptimizationLevel::Level3,
        }
    }
}

/// Options applied when building ONNX Runtime sessions.
///
/// Accelerator selection is a performance concern only: with the `cuda` cargo
/// feature enabled and `prefer_cuda` set, sessions register the CUDA
/// execution provider ahead of the CPU fallback. Callers observe no
/// behavioral difference.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OrtSessionOptions {
    /// Number of threads used to parallelize execution within nodes.
    pub intra_threads: Option<usize>,
    /// Graph optimization level (defaults to Level3).
    pub optimization_level: Option<OrtOptimizationLevel>,
    /// Prefer the CUDA execution provider when compiled in and available.
    pub prefer_cuda: bool,
}

impl OrtSessionOptions {
    /// Creates options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of intra-op threads.
    pub fn with_intra_threads(mut self, threads: usize) -> Self {
        self.intra_threads = Some(threads);
        self
    }

    /// Sets the graph optimization level.
    pub fn with_optimization_level(mut self, level: OrtOptimizationLevel) -> Self {
        self.optimization_level = Some(level);
        self
    }

    /// Prefers the CUDA execution provider when available.
    pub fn with_cuda_preference(mut self, prefer: bool) -> Self {
        self.prefer_cuda = prefer;
        self
    }
}

/// A loaded ONNX session with discovered tensor names.
pub struct OrtInfer {
    session: Mutex<Session>,
    input_name: String,
    output_name: String,
    model_path: PathBuf,
    model_name: String,
}

impl std::fmt::Debug for OrtInfer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrtInfer")
            .field("input_name", &self.input_name)
            .field("output_name", &self.output_name)
            .field("model_path", &self.model_path)
            .field("model_name", &self.model_name)
            .finish()
    }
}

impl OrtInfer {
    /// Loads an ONNX model and discovers its input and output tensor names.
    ///
    /// # Arguments
    ///
    /// * `model_path` - Path to the ONNX model file
    /// * `options` - Session options (threading, optimization, accelerator)
    ///
    /// # Returns
    ///
    /// A ready inference engine, or a [`TriageError::ModelLoad`] if the
    /// artifact cannot be deserialized or declares no usable tensors.
    pub fn load(model_path: impl AsRef<Path>, options: &OrtSessionOptions) -> TriageResult<Self> {
        let path = model_path.as_ref();

        let mut builder = Session::builder()?
            .with_log_level(LogLevel::Error)?
            .with_optimization_level(options.optimization_level.unwrap_or_default().to_ort())?;
        if let Some(threads) = options.intra_threads {
            builder = builder.with_intra_threads(threads)?;
        }
        #[cfg(feature = "cuda")]
        if options.prefer_cuda {
            use ort::execution_providers::CUDAExecutionProvider;
            builder =
                builder.with_execution_providers([CUDAExecutionProvider::default().build()])?;
            tracing::debug!(model = %path.display(), "registered CUDA execution provider");
        }
        #[cfg(not(feature = "cuda"))]
        if options.prefer_cuda {
            tracing::warn!(
                model = %path.display(),
                "CUDA preference ignored: crate was built without the 'cuda' feature"
            );
        }

        let session = builder.commit_from_file(path).map_err(|e| {
            TriageError::model_load_error(
                path,
                "failed to create ONNX session",
                Some("verify model path and compatibility with selected execution providers"),
                Some(e),
            )
        })?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .ok_or_else(|| {
                TriageError::model_load_error(
                    path,
                    "model declares no inputs",
                    Some("re-export the model with a named input tensor"),
                    None::<SimpleError>,
                )
            })?;
        let output_name = session
            .outputs
            .first()
            .map(|output| output.name.clone())
            .ok_or_else(|| {
                TriageError::model_load_error(
                    path,
                    "model declares no outputs",
                    Some("re-export the model with a named output tensor"),
                    None::<SimpleError>,
                )
            })?;

        let model_name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown_model")
            .to_string();

        tracing::info!(
            model = %model_name,
            input = %input_name,
            output = %output_name,
            "loaded ONNX model"
        );

        Ok(OrtInfer {
            session: Mutex::new(session),
            input_name,
            output_name,
            model_path: path.to_path_buf(),
            model_name,
        })
    }

    /// Returns the model path associated with this inference engine.
    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    /// Returns the model name associated with this inference engine.
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Attempts to retrieve the primary input tensor shape from the session.
    ///
    /// Returns a vector of dimensions if available. Dynamic dimensions
    /// (e.g., -1) are returned as-is.
    pub fn primary_input_shape(&self) -> Option<Vec<i64>> {
        let session_guard = self.session.lock().ok()?;
        let input = session_guard.inputs.first()?;
        match &input.input_type {
            ValueType::Tensor { shape, .. } => Some(shape.iter().copied().collect()),
            _ => None,
        }
    }

    /// Runs inference on an NCHW batch and returns the 2D class-score output.
    ///
    /// # Arguments
    ///
    /// * `x` - Preprocessed input tensor of shape `[batch, channels, h, w]`
    ///
    /// # Returns
    ///
    /// A `batch_size x num_classes` tensor, or a [`TriageError::Inference`]
    /// describing the failing operation.
    pub fn infer_2d(&self, x: &Tensor4D) -> TriageResult<Tensor2D> {
        let batch_size = x.shape()[0];
        let input_shape = x.shape().to_vec();

        let input_tensor = TensorRef::from_array_view(x.view()).map_err(|e| {
            TriageError::inference_error(
                &self.model_name,
                &format!("failed to convert input tensor with shape {input_shape:?}"),
                e,
            )
        })?;
        let inputs = ort::inputs![self.input_name.as_str() => input_tensor];

        let mut session_guard = self.session.lock().map_err(|_| {
            TriageError::inference_error(
                &self.model_name,
                "failed to acquire session lock",
                SimpleError::new("session lock poisoned"),
            )
        })?;

        let outputs = session_guard.run(inputs).map_err(|e| {
            TriageError::inference_error(
                &self.model_name,
                &format!(
                    "forward pass failed with input '{}' -> output '{}'",
                    self.input_name, self.output_name
                ),
                e,
            )
        })?;

        let (output_shape, output_data) = outputs[self.output_name.as_str()]
            .try_extract_tensor::<f32>()
            .map_err(|e| {
                TriageError::inference_error(
                    &self.model_name,
                    &format!("failed to extract output tensor '{}' as f32", self.output_name),
                    e,
                )
            })?;

        if output_shape.len() != 2 {
            return Err(TriageError::inference_error(
                &self.model_name,
                &format!(
                    "expected 2D output tensor, got {}D with shape {output_shape:?}",
                    output_shape.len()
                ),
                SimpleError::new("invalid output tensor dimensions"),
            ));
        }

        let num_classes = output_shape[1] as usize;
        let expected_len = batch_size * num_classes;
        if output_data.len() != expected_len {
            return Err(TriageError::inference_error(
                &self.model_name,
                &format!(
                    "output data size mismatch: expected {expected_len}, got {}",
                    output_data.len()
                ),
                SimpleError::new("output tensor data size mismatch"),
            ));
        }

        let array_view = ArrayView2::from_shape((batch_size, num_classes), output_data)
            .map_err(TriageError::Tensor)?;
        Ok(array_view.to_owned())
    }
}
