//! Audio resampling using rubato.

use crate::error::{Error, Result};
use audioadapter_buffers::direct::SequentialSlice;
use rubato::{Fft, FixedSync, Resampler};

const CHUNK_SIZE: usize = 1024;

/// Resample mono audio to `to_rate`.
///
/// Returns the input unchanged if already at the target rate. The resampler's
/// output delay is dropped from the front and flushed out with silent blocks
/// at the end, so the result is time-aligned with the input and exactly
/// `ceil(len * to / from)` samples long.
pub fn resample(samples: Vec<f32>, from_rate: u32, to_rate: u32) -> Result<Vec<f32>> {
    if from_rate == to_rate || samples.is_empty() {
        return Ok(samples);
    }

    let mut resampler = Fft::<f32>::new(
        from_rate as usize,
        to_rate as usize,
        CHUNK_SIZE,
        1,
        1,
        FixedSync::Both,
    )
    .map_err(|e| Error::Resample {
        reason: e.to_string(),
    })?;

    let block = resampler.input_frames_next();
    let delay = resampler.output_delay();
    let expected = scaled_len(samples.len(), from_rate, to_rate);
    let mut output = Vec::with_capacity(delay + expected + 2 * block);

    let mut blocks = samples.chunks_exact(block);
    for chunk in blocks.by_ref() {
        output.extend_from_slice(&process_block(&mut resampler, chunk)?);
    }

    let tail = blocks.remainder();
    if !tail.is_empty() {
        let mut padded = tail.to_vec();
        padded.resize(block, 0.0);
        output.extend_from_slice(&process_block(&mut resampler, &padded)?);
    }

    let silence = vec![0.0; block];
    while output.len() < delay + expected {
        let flushed = process_block(&mut resampler, &silence)?;
        if flushed.is_empty() {
            break;
        }
        output.extend_from_slice(&flushed);
    }

    output.drain(..delay.min(output.len()));
    output.truncate(expected);
    Ok(output)
}

fn process_block(resampler: &mut Fft<f32>, block: &[f32]) -> Result<Vec<f32>> {
    let input = SequentialSlice::new(block, 1, block.len()).map_err(|e| Error::Resample {
        reason: format!("failed to create input adapter: {e}"),
    })?;

    let resampled = resampler
        .process(&input, 0, None)
        .map_err(|e| Error::Resample {
            reason: e.to_string(),
        })?;

    Ok(resampled.take_data())
}

#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn scaled_len(input_len: usize, from_rate: u32, to_rate: u32) -> usize {
    (input_len as f64 * f64::from(to_rate) / f64::from(from_rate)).ceil() as usize
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_resample_same_rate_returns_input() {
        let samples = vec![0.1, 0.2, 0.3, 0.4, 0.5];
        let result = resample(samples.clone(), 16_000, 16_000).unwrap();
        assert_eq!(result, samples);
    }

    #[test]
    fn test_resample_empty_input() {
        let result = resample(Vec::new(), 44_100, 16_000).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_resample_44k_to_16k() {
        #[allow(clippy::cast_precision_loss)]
        let samples: Vec<f32> = (0..132_300).map(|i| (i as f32 * 0.01).sin()).collect();
        let output = resample(samples, 44_100, 16_000).unwrap();
        // 3 seconds at 16 kHz
        assert_eq!(output.len(), 48_000);
    }

    #[test]
    fn test_resample_upsample_short_input() {
        let samples = vec![0.25; 100];
        let output = resample(samples, 8_000, 16_000).unwrap();
        assert_eq!(output.len(), 200);
    }

    #[test]
    fn test_resample_is_time_aligned() {
        let mut samples = vec![0.0f32; 4_410];
        samples[2_205] = 1.0;
        let output = resample(samples, 44_100, 16_000).unwrap();
        assert_eq!(output.len(), 1_600);

        let peak = output
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.abs().total_cmp(&b.1.abs()))
            .map(|(i, _)| i)
            .unwrap();
        // 2205 input samples at 44.1 kHz land at 800 output samples at 16 kHz.
        assert!(peak.abs_diff(800) <= 2, "peak at {peak}");
    }

    #[test]
    fn test_resample_keeps_last_samples() {
        let mut samples = vec![0.0f32; 4_410];
        samples[4_400] = 1.0;
        let output = resample(samples, 44_100, 16_000).unwrap();

        let tail_energy: f32 = output[1_590..].iter().map(|s| s * s).sum();
        assert!(tail_energy > 0.01, "tail energy {tail_energy}");
    }
}
