//! Pipeline assembly and lifecycle: wires the four stages together on their
//! own OS threads and drives shutdown in strict downstream order.

pub mod activation;
pub mod embedding;
pub mod mel;
pub mod source;
pub mod wakeword;

use std::io::Read;
use std::sync::Arc;
use std::thread;

use crate::barrier::ReadyBarrier;
use crate::buffer::StageBuffer;
use crate::error::{PipelineError, Result};
use crate::model::OrtModel;
use crate::output::Output;
use crate::settings::Settings;

/// Runs the full pipeline against `input` until EOF, joining every stage in
/// shutdown order. Returns the first error any stage encountered.
pub fn run(settings: Settings, input: impl Read + Send + 'static, output: Arc<Output>) -> Result<()> {
    let settings = Arc::new(settings);
    let num_wake_words = settings.wakeword_models.len();
    let barrier = Arc::new(ReadyBarrier::new(2 + num_wake_words));

    let samples: Arc<StageBuffer<f32>> = Arc::new(StageBuffer::new());
    let mels: Arc<StageBuffer<f32>> = Arc::new(StageBuffer::new());
    let feature_buffers: Vec<Arc<StageBuffer<f32>>> =
        (0..num_wake_words).map(|_| Arc::new(StageBuffer::new())).collect();

    let mel_handle = {
        let settings = Arc::clone(&settings);
        let samples = Arc::clone(&samples);
        let mels = Arc::clone(&mels);
        let output = Arc::clone(&output);
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || -> Result<()> {
            let model = OrtModel::load(&settings.melspectrogram_model).map_err(PipelineError::from)?;
            barrier.signal_ready();
            mel::run(&settings, model, &samples, &mels, &output)
        })
    };

    let embedding_handle = {
        let settings = Arc::clone(&settings);
        let mels = Arc::clone(&mels);
        let feature_buffers = feature_buffers.clone();
        let output = Arc::clone(&output);
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || -> Result<()> {
            let model = OrtModel::load(&settings.embedding_model).map_err(PipelineError::from)?;
            barrier.signal_ready();
            embedding::run(model, &mels, &feature_buffers, &output)
        })
    };

    let mut wakeword_handles = Vec::with_capacity(num_wake_words);
    for (path, features) in settings.wakeword_models.iter().zip(feature_buffers.iter()) {
        let path = path.clone();
        let features = Arc::clone(features);
        let settings = Arc::clone(&settings);
        let output = Arc::clone(&output);
        let barrier = Arc::clone(&barrier);
        wakeword_handles.push(thread::spawn(move || -> Result<()> {
            let model = OrtModel::load(&path).map_err(PipelineError::from)?;
            let name = model.name().to_string();
            barrier.signal_ready();
            wakeword::run(&settings, &name, model, &features, &output)
        }));
    }

    // The orchestrator (this thread) plays the role of Source: it blocks on
    // the barrier itself before reading, same as every other stage. A
    // genuine read error still has to close `samples` and join every
    // downstream stage before it propagates, same as any other stage's
    // error does below.
    let source_result = source::run(input, settings.frame_size, &samples, &barrier, &output)
        .map_err(PipelineError::from);
    samples.close();

    let mel_result = join_stage(mel_handle)?;
    mels.close();
    let embedding_result = join_stage(embedding_handle)?;
    for fb in &feature_buffers {
        fb.close();
    }

    let mut wakeword_results = Vec::with_capacity(wakeword_handles.len());
    for handle in wakeword_handles {
        wakeword_results.push(join_stage(handle)?);
    }

    source_result?;
    mel_result?;
    embedding_result?;
    for r in wakeword_results {
        r?;
    }

    log::debug!("pipeline shut down cleanly after upstream exhaustion");
    Ok(())
}

fn join_stage(handle: thread::JoinHandle<Result<()>>) -> Result<Result<()>> {
    handle.join().map_err(|_| PipelineError::ThreadPanic)
}
