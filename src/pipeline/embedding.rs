//! Embedding stage: mel frames -> 96-dim speech embeddings, fanned out to
//! every wake-word stage.

use std::sync::Arc;

use crate::buffer::StageBuffer;
use crate::error::Result;
use crate::model::Infer;
use crate::output::Output;

pub const NUM_MELS: usize = 32;
pub const EMB_WINDOW: usize = 76;
pub const EMB_STEP: usize = 8;

pub fn run(
    mut model: impl Infer,
    mels_in: &StageBuffer<f32>,
    feature_buffers: &[Arc<StageBuffer<f32>>],
    output: &Arc<Output>,
) -> Result<()> {
    output.log("Loaded speech embedding model");

    let mut todo_mels: Vec<f32> = Vec::new();

    loop {
        let (batch, exhausted) = mels_in.wait_and_drain();
        todo_mels.extend(batch);

        if exhausted && todo_mels.is_empty() {
            break;
        }

        let mut mel_frames = todo_mels.len() / NUM_MELS;
        while mel_frames >= EMB_WINDOW {
            let window = &todo_mels[..EMB_WINDOW * NUM_MELS];
            let embedding = model.run(window, &[1, EMB_WINDOW, NUM_MELS, 1])?;

            for fb in feature_buffers {
                fb.push_batch(embedding.iter().copied());
            }

            todo_mels.drain(..EMB_STEP * NUM_MELS);
            mel_frames = todo_mels.len() / NUM_MELS;
        }

        if exhausted {
            break;
        }
    }

    for fb in feature_buffers {
        fb.close();
    }
    Ok(())
}
