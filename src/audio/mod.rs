//! Audio decoding and resampling.

mod decode;
mod format;
mod resample;

pub use decode::{DecodedAudio, decode_audio_file};
pub use format::AudioFormat;
pub use resample::resample;

use crate::constants::TARGET_SAMPLE_RATE;
use crate::error::Result;
use std::path::Path;
use tracing::debug;

/// Mono audio at [`TARGET_SAMPLE_RATE`].
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    samples: Vec<f32>,
}

impl Waveform {
    /// Wrap samples that are already mono at [`TARGET_SAMPLE_RATE`].
    pub fn from_samples(samples: Vec<f32>) -> Self {
        Self { samples }
    }

    /// Audio samples.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the waveform has no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds.
    #[allow(clippy::cast_precision_loss)]
    pub fn duration_secs(&self) -> f32 {
        self.samples.len() as f32 / TARGET_SAMPLE_RATE as f32
    }
}

/// Decode a file and bring it to mono [`TARGET_SAMPLE_RATE`].
pub fn load_waveform(path: &Path, format: AudioFormat) -> Result<Waveform> {
    let decoded = decode_audio_file(path, format)?;

    let samples = if decoded.sample_rate == TARGET_SAMPLE_RATE {
        decoded.samples
    } else {
        debug!(
            "Resampling from {} Hz to {} Hz...",
            decoded.sample_rate, TARGET_SAMPLE_RATE
        );
        resample(decoded.samples, decoded.sample_rate, TARGET_SAMPLE_RATE)?
    };

    Ok(Waveform::from_samples(samples))
}
