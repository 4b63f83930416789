//! Decision objects built from classifier output.

use crate::constants::DECISION_THRESHOLD;
use crate::inference::ProbabilityPair;
use serde::{Deserialize, Serialize};

/// Per-class probabilities as reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Probabilities {
    /// Probability the clip is not an eagle call.
    pub non_eagle: f32,
    /// Probability the clip is an eagle call.
    pub eagle: f32,
}

/// Classification outcome for one clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Whether the eagle probability exceeds the decision threshold.
    pub is_eagle: bool,
    /// The eagle probability, reported even when the decision is negative.
    pub confidence: f32,
    /// Both class probabilities.
    pub probabilities: Probabilities,
    /// Shape of the tensor actually fed to the model.
    pub feature_shape: Vec<usize>,
}

/// Build a [`PredictionResult`].
///
/// `confidence` is always the eagle probability, not the winning class's.
pub fn build_result(pair: ProbabilityPair, feature_shape: &[usize]) -> PredictionResult {
    PredictionResult {
        is_eagle: pair.eagle > DECISION_THRESHOLD,
        confidence: pair.eagle,
        probabilities: Probabilities {
            non_eagle: pair.non_eagle,
            eagle: pair.eagle,
        },
        feature_shape: feature_shape.to_vec(),
    }
}
