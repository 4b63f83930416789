//! Feature normalization policies.

use crate::constants::features::MIN_STD;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// How a padded spectrogram is rescaled before inference.
///
/// Must match the statistic used when the classifier was trained; a mismatch
/// degrades accuracy without raising any error.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum Normalization {
    /// Global per-tensor `(x - mean) / std` (population std).
    #[default]
    Standard,
    /// Global per-tensor `(x - min) / (max - min)`.
    MinMax,
}

impl Normalization {
    /// Apply the policy to a whole tensor.
    pub fn apply(self, mut features: Array2<f32>) -> Array2<f32> {
        if features.is_empty() {
            return features;
        }

        match self {
            Self::Standard => {
                let mean = features.mean().unwrap_or(0.0);
                let std = features.std(0.0);
                let std = if std < MIN_STD { 1.0 } else { std };
                features.mapv_inplace(|x| (x - mean) / std);
            }
            Self::MinMax => {
                let min = features.iter().copied().fold(f32::INFINITY, f32::min);
                let max = features.iter().copied().fold(f32::NEG_INFINITY, f32::max);
                let range = max - min;
                if range > 0.0 {
                    features.mapv_inplace(|x| (x - min) / range);
                } else {
                    features.fill(0.0);
                }
            }
        }

        features
    }
}

impl std::fmt::Display for Normalization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Standard => write!(f, "standard"),
            Self::MinMax => write!(f, "min-max"),
        }
    }
}
