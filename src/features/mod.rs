//! Waveform to fixed-shape feature tensor.

mod mel;
mod normalize;

pub use mel::{MelSpectrogram, hz_to_mel, mel_to_hz, power_to_db};
pub use normalize::Normalization;

use crate::audio::Waveform;
use crate::constants::features::{MEL_BINS, TIME_FRAMES};
use crate::error::{Error, Result};
use ndarray::{Array2, ArrayView2, s};
use tracing::debug;

/// Normalized log-mel features of shape exactly `(MEL_BINS, TIME_FRAMES)`.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTensor {
    data: Array2<f32>,
}

impl FeatureTensor {
    /// Wrap an array, checking the shape contract.
    pub fn new(data: Array2<f32>) -> Result<Self> {
        if data.dim() != (MEL_BINS, TIME_FRAMES) {
            return Err(Error::Inference {
                reason: format!(
                    "feature tensor must be {MEL_BINS}x{TIME_FRAMES}, got {}x{}",
                    data.nrows(),
                    data.ncols()
                ),
            });
        }
        Ok(Self { data })
    }

    /// Shape as `[mel_bins, time_frames]`.
    pub fn shape(&self) -> [usize; 2] {
        [self.data.nrows(), self.data.ncols()]
    }

    /// Borrow the underlying array.
    pub fn view(&self) -> ArrayView2<'_, f32> {
        self.data.view()
    }
}

/// Pad with zeros at the end or truncate to exactly `frames` columns.
pub fn fix_length(spec: ArrayView2<'_, f32>, frames: usize) -> Array2<f32> {
    let mut out = Array2::<f32>::zeros((spec.nrows(), frames));
    let keep = spec.ncols().min(frames);
    out.slice_mut(s![.., ..keep])
        .assign(&spec.slice(s![.., ..keep]));
    out
}

/// Turns waveforms into classifier-ready features.
#[derive(Debug, Default)]
pub struct FeatureExtractor {
    mel: MelSpectrogram,
    normalization: Normalization,
}

impl FeatureExtractor {
    /// Create an extractor with the given normalization policy.
    pub fn new(normalization: Normalization) -> Self {
        Self {
            mel: MelSpectrogram::new(),
            normalization,
        }
    }

    /// Normalization policy in use.
    pub const fn normalization(&self) -> Normalization {
        self.normalization
    }

    /// Mel spectrogram, fixed length, then normalization.
    pub fn extract(&self, waveform: &Waveform) -> Result<FeatureTensor> {
        if waveform.is_empty() {
            return Err(Error::EmptyAudio);
        }

        let spec = self.mel.compute(waveform.samples());
        debug!(
            "Mel spectrogram: {}x{} from {:.2}s of audio",
            spec.nrows(),
            spec.ncols(),
            waveform.duration_secs()
        );

        let fixed = fix_length(spec.view(), TIME_FRAMES);
        FeatureTensor::new(self.normalization.apply(fixed))
    }
}
