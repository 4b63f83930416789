//! Inference on feature tensors.

mod onnx;
mod result;

pub use onnx::OnnxClassifier;
pub use result::{PredictionResult, Probabilities, build_result};

use crate::constants::{MODEL_INPUT_SHAPE, PROBABILITY_SUM_TOLERANCE};
use crate::error::{Error, Result};
use crate::features::FeatureTensor;
use ndarray::{ArrayView4, Axis};
use std::sync::Arc;
use tracing::debug;

/// A pretrained binary classifier.
///
/// Implementations are pure functions of their input and must be safe to
/// call concurrently through a shared reference.
pub trait ClassifierModel: Send + Sync {
    /// Run a forward pass on a `(1, mel_bins, time_frames, 1)` tensor and
    /// return the class probabilities `[non_eagle, eagle]`.
    fn predict(&self, input: ArrayView4<'_, f32>) -> Result<Vec<f32>>;
}

/// Softmax output over the two classes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbabilityPair {
    /// Probability of class 0.
    pub non_eagle: f32,
    /// Probability of class 1.
    pub eagle: f32,
}

impl ProbabilityPair {
    /// Validate raw classifier output.
    pub fn from_output(output: &[f32]) -> Result<Self> {
        let &[non_eagle, eagle] = output else {
            return Err(Error::Inference {
                reason: format!("expected 2 class probabilities, got {}", output.len()),
            });
        };

        let valid = |p: f32| p.is_finite() && p >= 0.0;
        if !valid(non_eagle) || !valid(eagle) {
            return Err(Error::Inference {
                reason: format!("invalid probabilities [{non_eagle}, {eagle}]"),
            });
        }

        if (non_eagle + eagle - 1.0).abs() > PROBABILITY_SUM_TOLERANCE {
            return Err(Error::Inference {
                reason: format!("probabilities [{non_eagle}, {eagle}] do not sum to 1"),
            });
        }

        Ok(Self { non_eagle, eagle })
    }
}

/// Shapes features for the model and runs it.
#[derive(Clone)]
pub struct InferenceExecutor {
    model: Arc<dyn ClassifierModel>,
}

impl std::fmt::Debug for InferenceExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceExecutor").finish_non_exhaustive()
    }
}

impl InferenceExecutor {
    /// Wrap a shared, already loaded model.
    pub fn new(model: Arc<dyn ClassifierModel>) -> Self {
        Self { model }
    }

    /// Shape `(mel_bins, time_frames)` to `(1, mel_bins, time_frames, 1)` and run.
    pub fn infer(&self, features: &FeatureTensor) -> Result<(ProbabilityPair, [usize; 4])> {
        let input = features.view().insert_axis(Axis(2)).insert_axis(Axis(0));

        let shape: [usize; 4] = [
            input.len_of(Axis(0)),
            input.len_of(Axis(1)),
            input.len_of(Axis(2)),
            input.len_of(Axis(3)),
        ];
        if shape != MODEL_INPUT_SHAPE {
            return Err(Error::Inference {
                reason: format!("input shape {shape:?} does not match model {MODEL_INPUT_SHAPE:?}"),
            });
        }

        debug!("Final input shape for model: {shape:?}");
        let output = self.model.predict(input)?;
        debug!("Raw prediction: {output:?}");

        Ok((ProbabilityPair::from_output(&output)?, shape))
    }
}
