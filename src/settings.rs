//! CLI surface and the resulting immutable run configuration.

use clap::Parser;
use std::path::PathBuf;

use crate::error::ConfigError;

pub const CHUNK_SAMPLES: usize = 1280;

#[derive(Parser, Debug)]
#[command(
    name = "wakeword",
    about = "Streaming wake-word detector: mel spectrogram -> speech embedding -> wake-word classifiers",
    disable_help_flag = false
)]
struct Cli {
    /// Path to a wake-word model (repeat to listen for more than one word)
    #[arg(short = 'm', long = "model", value_name = "FILE")]
    model: Vec<PathBuf>,

    /// Activation threshold in [0, 1]
    #[arg(short = 't', long = "threshold", value_name = "NUM", default_value_t = 0.5)]
    threshold: f32,

    /// Consecutive above-threshold steps required to trigger
    #[arg(short = 'l', long = "trigger-level", value_name = "NUM", default_value_t = 4)]
    trigger_level: i32,

    /// Sub-threshold steps of enforced silence after a trigger
    #[arg(short = 'r', long = "refractory", value_name = "NUM", default_value_t = 20)]
    refractory: i32,

    /// Number of 80 ms audio chunks fed to the mel model per invocation
    #[arg(long = "step-frames", value_name = "NUM", default_value_t = 4)]
    step_frames: usize,

    /// Path to the mel-spectrogram model
    #[arg(
        long = "melspectrogram-model",
        value_name = "FILE",
        default_value = "models/melspectrogram.onnx"
    )]
    melspectrogram_model: PathBuf,

    /// Path to the speech-embedding model
    #[arg(
        long = "embedding-model",
        value_name = "FILE",
        default_value = "models/embedding_model.onnx"
    )]
    embedding_model: PathBuf,

    /// Print every model probability to stderr
    #[arg(long = "debug")]
    debug: bool,
}

/// Immutable run configuration, built once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub melspectrogram_model: PathBuf,
    pub embedding_model: PathBuf,
    pub wakeword_models: Vec<PathBuf>,
    pub step_frames: usize,
    pub frame_size: usize,
    pub threshold: f32,
    pub trigger_level: i32,
    pub refractory: i32,
    pub debug: bool,
}

/// Outcome of parsing argv: either a ready-to-run `Settings`, or a request
/// to print something and exit 0 (`--help`, or any malformed argument list).
/// Preserves the reference implementation's `ensureArg` behavior of
/// printing usage and exiting cleanly rather than failing hard.
pub enum ParseOutcome {
    Run(Settings),
    PrintAndExit0(String),
}

impl Settings {
    pub fn parse_args<I, T>(args: I) -> Result<ParseOutcome, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli = match Cli::try_parse_from(args) {
            Ok(cli) => cli,
            Err(e) => return Ok(ParseOutcome::PrintAndExit0(e.to_string())),
        };

        if cli.model.is_empty() {
            return Err(ConfigError::MissingModel);
        }

        let frame_size = cli.step_frames * CHUNK_SAMPLES;

        Ok(ParseOutcome::Run(Settings {
            melspectrogram_model: cli.melspectrogram_model,
            embedding_model: cli.embedding_model,
            wakeword_models: cli.model,
            step_frames: cli.step_frames,
            frame_size,
            threshold: cli.threshold,
            trigger_level: cli.trigger_level,
            refractory: cli.refractory,
            debug: cli.debug,
        }))
    }
}
