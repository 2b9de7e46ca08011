//! Streaming wake-word detector: raw PCM in, wake-word names out.
//!
//! A little-endian signed-16 mono PCM stream is read from stdin, chunked
//! into mel-spectrogram frames, turned into a sliding window of speech
//! embeddings, and finally scored by one activation state machine per
//! configured wake-word model. See [`pipeline::run`] for the wiring.

pub mod barrier;
pub mod buffer;
pub mod error;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod settings;

pub use error::{PipelineError, Result};
pub use output::Output;
pub use settings::{ParseOutcome, Settings};
