//! Mel stage: raw PCM samples -> mel-spectrogram frames.

use std::sync::Arc;

use crate::buffer::StageBuffer;
use crate::error::Result;
use crate::model::Infer;
use crate::output::Output;
use crate::settings::Settings;

/// Run the mel stage to completion. Blocks until `samples` closes and every
/// full `frame_size` chunk has been processed.
pub fn run(
    settings: &Settings,
    mut model: impl Infer,
    samples: &StageBuffer<f32>,
    mels_out: &StageBuffer<f32>,
    output: &Arc<Output>,
) -> Result<()> {
    output.log("Loaded mel spectrogram model");

    let mut todo_samples: Vec<f32> = Vec::new();

    loop {
        let (batch, exhausted) = samples.wait_and_drain();
        todo_samples.extend(batch);

        if exhausted && todo_samples.is_empty() {
            break;
        }

        while todo_samples.len() >= settings.frame_size {
            let frame = &todo_samples[..settings.frame_size];
            let mel_values = model.run(frame, &[1, settings.frame_size])?;

            // Output tensor is [1, 1, F, 32]; flatten row-major and apply
            // the affine scale the embedding model was trained against.
            let scaled: Vec<f32> = mel_values.iter().map(|m| (m / 10.0) + 2.0).collect();
            mels_out.push_batch(scaled);

            todo_samples.drain(..settings.frame_size);
        }

        if exhausted {
            break;
        }
    }

    mels_out.close();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::mock::MockModel;

    fn settings(step_frames: usize) -> Settings {
        Settings {
            melspectrogram_model: "mel.onnx".into(),
            embedding_model: "emb.onnx".into(),
            wakeword_models: vec!["ww.onnx".into()],
            step_frames,
            frame_size: step_frames * crate::settings::CHUNK_SAMPLES,
            threshold: 0.5,
            trigger_level: 4,
            refractory: 20,
            debug: false,
        }
    }

    #[test]
    fn drops_trailing_partial_frame_on_exhaustion() {
        let s = settings(1);
        let samples: StageBuffer<f32> = StageBuffer::new();
        let mels: StageBuffer<f32> = StageBuffer::new();
        let output = Arc::new(Output::new());

        // One full frame plus a partial one that must be dropped.
        let full_frame = vec![0.0_f32; s.frame_size];
        let partial = vec![0.0_f32; s.frame_size - 1];
        samples.push_batch(full_frame);
        samples.push_batch(partial);
        samples.close();

        let model = MockModel::new(|_input, _shape| vec![0.0_f32; 32]);
        run(&s, model, &samples, &mels, &output).unwrap();

        let (drained, exhausted) = mels.wait_and_drain();
        assert!(exhausted);
        // Exactly one frame's worth of mel output (32 values, one model call).
        assert_eq!(drained.len(), 32);
    }

    #[test]
    fn applies_affine_scale_to_every_value() {
        let s = settings(1);
        let samples: StageBuffer<f32> = StageBuffer::new();
        let mels: StageBuffer<f32> = StageBuffer::new();
        let output = Arc::new(Output::new());

        samples.push_batch(vec![0.0_f32; s.frame_size]);
        samples.close();

        let model = MockModel::new(|_input, _shape| vec![10.0_f32; 32]);
        run(&s, model, &samples, &mels, &output).unwrap();

        let (drained, _) = mels.wait_and_drain();
        assert!(drained.iter().all(|&v| (v - 3.0).abs() < 1e-6));
    }
}
