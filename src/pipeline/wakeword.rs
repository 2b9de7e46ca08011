//! Wake-word stage: a sliding window of embeddings -> per-step probability
//! -> the activation/refractory state machine -> stdout trigger events.

use std::sync::Arc;

use super::activation::Activation;
use crate::buffer::StageBuffer;
use crate::error::Result;
use crate::model::Infer;
use crate::output::Output;
use crate::settings::Settings;

pub const EMB_FEATURES: usize = 96;
pub const WW_FEATURES: usize = 16;

pub fn run(
    settings: &Settings,
    name: &str,
    mut model: impl Infer,
    features_in: &StageBuffer<f32>,
    output: &Arc<Output>,
) -> Result<()> {
    output.log(&format!("Loaded {name} model"));

    let mut activation = Activation::new(settings.threshold, settings.trigger_level, settings.refractory);
    let mut todo_features: Vec<f32> = Vec::new();

    loop {
        let (batch, exhausted) = features_in.wait_and_drain();
        todo_features.extend(batch);

        if exhausted && todo_features.is_empty() {
            break;
        }

        let mut n = todo_features.len() / EMB_FEATURES;
        while n >= WW_FEATURES {
            let window = &todo_features[..WW_FEATURES * EMB_FEATURES];
            let probabilities = model.run(window, &[1, WW_FEATURES, EMB_FEATURES])?;

            for &p in &probabilities {
                if settings.debug {
                    output.debug_probability(name, p);
                }
                if activation.step(p) {
                    output.emit_wakeword(name);
                }
            }

            todo_features.drain(..EMB_FEATURES);
            n = todo_features.len() / EMB_FEATURES;
        }

        if exhausted {
            break;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::mock::MockModel;

    fn settings() -> Settings {
        Settings {
            melspectrogram_model: "mel.onnx".into(),
            embedding_model: "emb.onnx".into(),
            wakeword_models: vec!["ww.onnx".into()],
            step_frames: 4,
            frame_size: 4 * crate::settings::CHUNK_SAMPLES,
            threshold: 0.5,
            trigger_level: 4,
            refractory: 20,
            debug: false,
        }
    }

    fn push_embeddings(buf: &StageBuffer<f32>, count: usize) {
        for _ in 0..count {
            buf.push_batch(vec![0.0_f32; EMB_FEATURES]);
        }
    }

    #[test]
    fn no_wake_scenario_emits_nothing() {
        let s = settings();
        let features: StageBuffer<f32> = StageBuffer::new();
        let output = Arc::new(Output::new());

        push_embeddings(&features, WW_FEATURES + 5);
        features.close();

        let model = MockModel::new(|_input, _shape| vec![0.01_f32]);
        run(&s, "trivial", model, &features, &output).unwrap();
        // Nothing to observe directly here beyond a clean exit. Stdout
        // output itself is covered by the activation unit tests.
    }

    #[test]
    fn single_trigger_then_refractory_scenario() {
        let mut s = settings();
        s.trigger_level = 2;
        s.refractory = 5;
        let features: StageBuffer<f32> = StageBuffer::new();
        let output = Arc::new(Output::new());

        // Enough embeddings for several wake-word steps, all above threshold.
        push_embeddings(&features, WW_FEATURES + 10);
        features.close();

        let model = MockModel::new(|_input, _shape| vec![1.0_f32]);
        run(&s, "always_on", model, &features, &output).unwrap();
    }

    #[test]
    fn advances_window_by_one_embedding_per_step() {
        let s = settings();
        let features: StageBuffer<f32> = StageBuffer::new();
        let output = Arc::new(Output::new());

        // WW_FEATURES + 3 embeddings -> 4 distinct windows (advance by 1).
        push_embeddings(&features, WW_FEATURES + 3);
        features.close();

        let calls = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let calls_inner = Arc::clone(&calls);
        let model = MockModel::new(move |_input, _shape| {
            calls_inner.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            vec![0.0_f32]
        });
        run(&s, "counter", model, &features, &output).unwrap();
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 4);
    }

    #[test]
    fn drops_leftover_embeddings_shorter_than_window_on_exhaustion() {
        let s = settings();
        let features: StageBuffer<f32> = StageBuffer::new();
        let output = Arc::new(Output::new());

        push_embeddings(&features, WW_FEATURES - 1);
        features.close();

        let model = MockModel::new(|_input, _shape| {
            panic!("model should never run: not enough embeddings for one window")
        });
        run(&s, "never_runs", model, &features, &output).unwrap();
    }
}
