//! Application-wide constants.
//!
//! The feature and model constants form a hard contract with the trained
//! classifier; changing any of them requires retraining.

/// Application name used for config directories and user-facing messages.
pub const APP_NAME: &str = "eagle-detect";

/// Human-readable service name reported by `info`.
pub const SERVICE_NAME: &str = "Eagle Detection API";

/// Sample rate every waveform is resampled to, in Hz.
pub const TARGET_SAMPLE_RATE: u32 = 16_000;

/// Decision threshold applied to the eagle probability.
pub const DECISION_THRESHOLD: f32 = 0.5;

/// Tolerance for the classifier's probability pair summing to one.
pub const PROBABILITY_SUM_TOLERANCE: f32 = 1e-3;

/// Upload limits and accepted formats.
pub mod upload {
    /// Maximum accepted payload size (16 MiB).
    pub const MAX_BYTES: u64 = 16 * 1024 * 1024;

    /// Human-readable form of [`MAX_BYTES`].
    pub const MAX_SIZE_LABEL: &str = "16MB";

    /// Accepted filename extensions, lower case.
    pub const ALLOWED_EXTENSIONS: &[&str] = &["wav", "mp3", "flac", "ogg"];

    /// Subdirectory of the system temp dir used when no upload dir is configured.
    pub const DEFAULT_DIR_NAME: &str = "uploads";

    /// Name used when sanitizing strips a filename down to nothing.
    pub const FALLBACK_FILENAME: &str = "upload";
}

/// Mel spectrogram parameters.
pub mod mel {
    /// Number of mel bands.
    pub const N_MELS: usize = 128;

    /// FFT window length in samples.
    pub const N_FFT: usize = 2048;

    /// Hop between successive frames in samples.
    pub const HOP_LENGTH: usize = 512;

    /// Lowest filterbank frequency in Hz.
    pub const F_MIN: f32 = 0.0;

    /// Highest filterbank frequency in Hz (Nyquist at 16 kHz).
    pub const F_MAX: f32 = 8_000.0;

    /// Power floor before taking the logarithm.
    pub const AMIN: f32 = 1e-10;

    /// Dynamic range kept below the spectrogram peak, in dB.
    pub const TOP_DB: f32 = 80.0;
}

/// Feature tensor shape.
pub mod features {
    /// Mel bins (rows).
    pub const MEL_BINS: usize = super::mel::N_MELS;

    /// Time frames (columns) after padding or truncation.
    pub const TIME_FRAMES: usize = 150;

    /// Standard deviation below which standardization divides by one.
    pub const MIN_STD: f32 = 1e-6;
}

/// Shape fed to the classifier: batch, mel bins, time frames, channel.
pub const MODEL_INPUT_SHAPE: [usize; 4] = [1, features::MEL_BINS, features::TIME_FRAMES, 1];
