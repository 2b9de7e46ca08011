//! Error types for the wake-word pipeline.

use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("--model is required (pass at least one --model FILE)")]
    MissingModel,
}

#[derive(Error, Debug)]
pub enum ModelLoadError {
    #[error("failed to open model {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: ort::Error,
    },

    #[error("model {path} has unexpected shape: {reason}")]
    UnexpectedShape { path: String, reason: String },
}

#[derive(Error, Debug)]
pub enum InferenceError {
    #[error("inference failed for {model}: {source}")]
    Run {
        model: String,
        #[source]
        source: ort::Error,
    },

    #[error("could not build input tensor for {model}: {reason}")]
    TensorBuild { model: String, reason: String },

    #[error("model {model} produced an empty output tensor")]
    EmptyOutput { model: String },
}

#[derive(Error, Debug)]
pub enum InputError {
    #[error("failed to read PCM samples from input: {0}")]
    Io(#[from] std::io::Error),
}

/// Top-level error a pipeline stage can fail with. Any variant is fatal to
/// the whole process. There is no partial-failure mode.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    ModelLoad(#[from] ModelLoadError),

    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error(transparent)]
    Input(#[from] InputError),

    #[error("stage thread panicked")]
    ThreadPanic,
}
