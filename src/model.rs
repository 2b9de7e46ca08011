//! The neural-network model abstraction.
//!
//! A `Model` maps a flat `f32` tensor to a flat `f32` tensor. The pipeline
//! never looks inside this box: mel, embedding and wake-word stages all
//! drive it through the same `Infer` trait, whether the concrete
//! implementation is a real ONNX Runtime session or a test mock.

use ndarray::ArrayD;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::Path;

use crate::error::{InferenceError, ModelLoadError};

/// Anything that can run a single named model against a flat input tensor.
///
/// Implementations own their session/interpreter and are not required to be
/// `Sync`. Each pipeline stage owns exactly one `Model` on its own thread.
pub trait Infer: Send {
    /// Run inference. `input` is the flattened row-major tensor data,
    /// `shape` its dimensions (e.g. `[1, frame_size]`). Returns the
    /// flattened row-major output tensor.
    fn run(&mut self, input: &[f32], shape: &[usize]) -> Result<Vec<f32>, InferenceError>;
}

/// A loaded ONNX model, run single-threaded. Both intra- and inter-op
/// parallelism are forced to 1; the runtime must not spawn its own worker
/// pools on top of our per-stage threads.
pub struct OrtModel {
    name: String,
    session: Session,
}

impl OrtModel {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelLoadError> {
        let path = path.as_ref();
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let session = Session::builder()
            .and_then(|b| b.with_optimization_level(GraphOptimizationLevel::Level3))
            .and_then(|b| b.with_intra_threads(1))
            .and_then(|b| b.with_inter_threads(1))
            .and_then(|b| b.commit_from_file(path))
            .map_err(|source| ModelLoadError::Open {
                path: path.display().to_string(),
                source,
            })?;

        Ok(Self { name, session })
    }

    /// The model's display name, derived from the file stem (no directory,
    /// no extension). This is the string emitted to stdout on a trigger.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Infer for OrtModel {
    fn run(&mut self, input: &[f32], shape: &[usize]) -> Result<Vec<f32>, InferenceError> {
        let array = ArrayD::from_shape_vec(shape.to_vec(), input.to_vec()).map_err(|e| {
            InferenceError::TensorBuild {
                model: self.name.clone(),
                reason: e.to_string(),
            }
        })?;

        let input_name = self.session.inputs[0].name.clone();
        let value = Value::from_array(array).map_err(|e| InferenceError::TensorBuild {
            model: self.name.clone(),
            reason: e.to_string(),
        })?;

        let outputs =
            self.session
                .run(ort::inputs![input_name => value])
                .map_err(|source| InferenceError::Run {
                    model: self.name.clone(),
                    source,
                })?;

        let output_name = self.session.outputs[0].name.clone();
        let (_, data) = outputs[&output_name]
            .try_extract_tensor::<f32>()
            .map_err(|source| InferenceError::Run {
                model: self.name.clone(),
                source,
            })?;

        if data.is_empty() {
            return Err(InferenceError::EmptyOutput {
                model: self.name.clone(),
            });
        }

        Ok(data.to_vec())
    }
}
