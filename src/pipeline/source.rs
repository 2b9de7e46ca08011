//! Source stage: reads little-endian signed-16 PCM mono samples from a
//! blocking byte source (stdin in production) and pushes float batches
//! into the sample buffer in `frame_size`-sample chunks.

use std::io::Read;

use crate::barrier::ReadyBarrier;
use crate::buffer::StageBuffer;
use crate::error::InputError;
use crate::output::Output;

/// Reads until EOF, pushing one batch of up to `frame_size` samples at a
/// time. Blocks on `barrier` before reading the first byte so no samples
/// are produced until every downstream model has loaded, then logs the
/// single `[LOG] Ready` line the instant the barrier releases.
pub fn run(
    mut reader: impl Read,
    frame_size: usize,
    samples_out: &StageBuffer<f32>,
    barrier: &ReadyBarrier,
    output: &Output,
) -> Result<(), InputError> {
    barrier.wait_ready();
    output.log("Ready");

    let mut byte_buf = vec![0u8; frame_size * 2];
    loop {
        let n = read_up_to(&mut reader, &mut byte_buf)?;
        if n == 0 {
            break;
        }

        let samples: Vec<f32> = byte_buf[..n]
            .chunks_exact(2)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]) as f32)
            .collect();
        samples_out.push_batch(samples);
    }

    samples_out.close();
    Ok(())
}

/// Fill `buf` from `reader`, returning the number of bytes read (0 on EOF).
/// Unlike `Read::read`, this keeps reading until either `buf` is full or
/// the source is exhausted, so a short read never silently truncates a
/// frame.
fn read_up_to(reader: &mut impl Read, buf: &mut [u8]) -> Result<usize, InputError> {
    let mut total = 0;
    while total < buf.len() {
        match reader.read(&mut buf[total..])? {
            0 => break,
            n => total += n,
        }
    }
    Ok(total)
}
