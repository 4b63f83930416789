//! Log-mel spectrogram.
//!
//! Matches the librosa defaults the classifier was trained with:
//! - centered frames with constant (zero) padding of `n_fft / 2`
//! - periodic Hann window, power spectrum
//! - Slaney mel scale with Slaney area normalization
//! - decibels relative to the spectrogram peak, clamped to `TOP_DB` below it

use crate::constants::TARGET_SAMPLE_RATE;
use crate::constants::mel::{AMIN, F_MAX, F_MIN, HOP_LENGTH, N_FFT, N_MELS, TOP_DB};
use ndarray::Array2;
use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::f32::consts::PI;
use std::sync::Arc;

const F_SP: f32 = 200.0 / 3.0;
const MIN_LOG_HZ: f32 = 1000.0;
const MIN_LOG_MEL: f32 = MIN_LOG_HZ / F_SP;

fn log_step() -> f32 {
    6.4f32.ln() / 27.0
}

/// Hz to mel on the Slaney scale (linear below 1 kHz, logarithmic above).
pub fn hz_to_mel(hz: f32) -> f32 {
    if hz < MIN_LOG_HZ {
        hz / F_SP
    } else {
        MIN_LOG_MEL + (hz / MIN_LOG_HZ).ln() / log_step()
    }
}

/// Mel to Hz on the Slaney scale.
pub fn mel_to_hz(mel: f32) -> f32 {
    if mel < MIN_LOG_MEL {
        mel * F_SP
    } else {
        MIN_LOG_HZ * (log_step() * (mel - MIN_LOG_MEL)).exp()
    }
}

/// One triangular filter, stored from its first non-zero FFT bin.
#[derive(Debug, Clone)]
struct MelFilter {
    start: usize,
    weights: Vec<f32>,
}

impl MelFilter {
    fn apply(&self, power: &[f32]) -> f32 {
        power[self.start..]
            .iter()
            .zip(&self.weights)
            .map(|(p, w)| p * w)
            .sum()
    }
}

#[allow(clippy::cast_precision_loss)]
fn build_filterbank(sample_rate: u32, n_fft: usize, n_mels: usize) -> Vec<MelFilter> {
    let n_freqs = n_fft / 2 + 1;
    let fft_freqs: Vec<f32> = (0..n_freqs)
        .map(|k| k as f32 * sample_rate as f32 / n_fft as f32)
        .collect();

    let mel_min = hz_to_mel(F_MIN);
    let mel_max = hz_to_mel(F_MAX);
    let mut edges: Vec<f32> = (0..n_mels + 2)
        .map(|i| mel_to_hz(mel_min + (mel_max - mel_min) * i as f32 / (n_mels + 1) as f32))
        .collect();
    // The mel round trip drifts by a few ulps, which would leak weight past F_MAX.
    if let Some(first) = edges.first_mut() {
        *first = F_MIN;
    }
    if let Some(last) = edges.last_mut() {
        *last = F_MAX;
    }

    (0..n_mels)
        .map(|m| {
            let (left, center, right) = (edges[m], edges[m + 1], edges[m + 2]);
            let enorm = 2.0 / (right - left);
            let dense: Vec<f32> = fft_freqs
                .iter()
                .map(|&f| {
                    let lower = (f - left) / (center - left);
                    let upper = (right - f) / (right - center);
                    lower.min(upper).max(0.0) * enorm
                })
                .collect();

            let start = dense.iter().position(|&w| w > 0.0).unwrap_or(0);
            let end = dense.iter().rposition(|&w| w > 0.0).map_or(start, |i| i + 1);
            MelFilter {
                start,
                weights: dense[start..end].to_vec(),
            }
        })
        .collect()
}

/// Reusable mel spectrogram calculator.
///
/// Holds the window, filterbank, and FFT plan; `compute` takes `&self` so a
/// single instance can serve concurrent callers.
pub struct MelSpectrogram {
    window: Vec<f32>,
    filters: Vec<MelFilter>,
    fft: Arc<dyn Fft<f32>>,
}

impl std::fmt::Debug for MelSpectrogram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MelSpectrogram")
            .field("n_fft", &self.window.len())
            .field("n_mels", &self.filters.len())
            .finish_non_exhaustive()
    }
}

impl Default for MelSpectrogram {
    fn default() -> Self {
        Self::new()
    }
}

impl MelSpectrogram {
    /// Build a calculator for the fixed model parameters.
    pub fn new() -> Self {
        #[allow(clippy::cast_precision_loss)]
        let window = (0..N_FFT)
            .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f32 / N_FFT as f32).cos()))
            .collect();

        Self {
            window,
            filters: build_filterbank(TARGET_SAMPLE_RATE, N_FFT, N_MELS),
            fft: FftPlanner::<f32>::new().plan_fft_forward(N_FFT),
        }
    }

    /// Number of frames produced for `len` samples.
    pub const fn frame_count(len: usize) -> usize {
        1 + len / HOP_LENGTH
    }

    /// Compute the log-mel spectrogram, shape `(N_MELS, frame_count(len))`.
    pub fn compute(&self, samples: &[f32]) -> Array2<f32> {
        let pad = N_FFT / 2;
        let mut padded = vec![0.0f32; samples.len() + 2 * pad];
        padded[pad..pad + samples.len()].copy_from_slice(samples);

        let frames = Self::frame_count(samples.len());
        let mut mel = Array2::<f32>::zeros((self.filters.len(), frames));

        let mut buffer = vec![Complex::new(0.0f32, 0.0); N_FFT];
        let mut scratch = vec![Complex::new(0.0f32, 0.0); self.fft.get_inplace_scratch_len()];
        let mut power = vec![0.0f32; N_FFT / 2 + 1];

        for frame in 0..frames {
            let start = frame * HOP_LENGTH;
            for ((slot, &s), &w) in buffer
                .iter_mut()
                .zip(&padded[start..start + N_FFT])
                .zip(&self.window)
            {
                *slot = Complex::new(s * w, 0.0);
            }

            self.fft.process_with_scratch(&mut buffer, &mut scratch);

            for (p, c) in power.iter_mut().zip(&buffer) {
                *p = c.norm_sqr();
            }

            for (band, filter) in self.filters.iter().enumerate() {
                mel[[band, frame]] = filter.apply(&power);
            }
        }

        power_to_db(&mut mel);
        mel
    }
}

fn to_db(power: f32) -> f32 {
    10.0 * power.max(AMIN).log10()
}

/// Convert power to decibels relative to the peak, in place.
pub fn power_to_db(spec: &mut Array2<f32>) {
    let peak = spec.iter().copied().fold(0.0f32, f32::max);
    let ref_db = to_db(peak);
    spec.mapv_inplace(|p| to_db(p) - ref_db);

    let max_db = spec.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let floor = max_db - TOP_DB;
    spec.mapv_inplace(|db| db.max(floor));
}
