//! ONNX Runtime backed classifier.

use crate::error::{Error, Result};
use crate::inference::ClassifierModel;
use ndarray::ArrayView4;
use ort::session::Session;
use ort::value::Tensor;
use std::path::Path;
use std::sync::Mutex;
use tracing::info;

/// The trained eagle network exported to ONNX.
///
/// Loaded once and never reloaded. ONNX Runtime needs exclusive access to a
/// session for each run, so calls are serialized through a mutex; the model
/// weights themselves are never mutated.
pub struct OnnxClassifier {
    session: Mutex<Session>,
}

impl OnnxClassifier {
    /// Load the model artifact from disk.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ModelFileNotFound {
                path: path.to_path_buf(),
            });
        }

        let load_error = |reason: String| Error::ModelLoad {
            path: path.to_path_buf(),
            reason,
        };

        let mut builder = Session::builder().map_err(|e| load_error(e.to_string()))?;
        let session = builder
            .commit_from_file(path)
            .map_err(|e| load_error(e.to_string()))?;

        info!("Loaded model: {}", path.display());

        Ok(Self {
            session: Mutex::new(session),
        })
    }
}

impl ClassifierModel for OnnxClassifier {
    fn predict(&self, input: ArrayView4<'_, f32>) -> Result<Vec<f32>> {
        let shape: [usize; 4] = [
            input.shape()[0],
            input.shape()[1],
            input.shape()[2],
            input.shape()[3],
        ];
        let data: Vec<f32> = input.iter().copied().collect();

        let tensor = Tensor::from_array((shape, data)).map_err(|e| Error::Inference {
            reason: format!("failed to create input tensor: {e}"),
        })?;

        let mut session = self.session.lock().map_err(|_| Error::Inference {
            reason: "classifier session lock poisoned".to_string(),
        })?;

        let outputs = session
            .run(ort::inputs![tensor])
            .map_err(|e| Error::Inference {
                reason: e.to_string(),
            })?;

        let (_, probabilities) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| Error::Inference {
                reason: format!("failed to extract output: {e}"),
            })?;

        Ok(probabilities.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_model_fails_before_runtime() {
        let result = OnnxClassifier::load(Path::new("/nonexistent/cnn-eagle-model.onnx"));
        assert!(matches!(result, Err(Error::ModelFileNotFound { .. })));
    }
}
