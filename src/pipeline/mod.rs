//! Upload to decision pipeline with guaranteed cleanup.

mod lifecycle;
mod response;

pub use lifecycle::{UploadLifecycle, UploadState};
pub use response::{Classification, ClassifyResponse};

use crate::audio::{AudioFormat, load_waveform};
use crate::error::Result;
use crate::features::FeatureExtractor;
use crate::inference::{ClassifierModel, InferenceExecutor, PredictionResult, build_result};
use crate::upload::{UploadStore, UploadedAudio, sanitize_filename};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Classifies uploads end to end.
///
/// Holds only immutable configuration and the shared model, so one detector
/// can serve concurrent requests from many threads.
#[derive(Debug)]
pub struct EagleDetector {
    store: UploadStore,
    extractor: FeatureExtractor,
    executor: InferenceExecutor,
}

impl EagleDetector {
    /// Assemble a detector around an already loaded model.
    pub fn new(
        store: UploadStore,
        extractor: FeatureExtractor,
        model: Arc<dyn ClassifierModel>,
    ) -> Self {
        Self {
            store,
            extractor,
            executor: InferenceExecutor::new(model),
        }
    }

    /// Scoped upload storage.
    pub const fn store(&self) -> &UploadStore {
        &self.store
    }

    /// Feature extraction settings.
    pub const fn extractor(&self) -> &FeatureExtractor {
        &self.extractor
    }

    /// Validate, persist, classify, and remove one upload.
    ///
    /// The persisted copy is gone by the time this returns, whatever the
    /// outcome. A processing error takes precedence over a cleanup error.
    pub fn classify(&self, upload: UploadedAudio) -> Result<Classification> {
        let mut lifecycle = UploadLifecycle::new(Uuid::new_v4());

        let format = match upload.validate(self.store.max_bytes()) {
            Ok(format) => format,
            Err(e) => {
                debug!("Upload {} rejected: {e}", lifecycle.id());
                lifecycle.advance(UploadState::Failed);
                return Err(e);
            }
        };
        lifecycle.advance(UploadState::Validated);

        let mut file = match self
            .store
            .persist(lifecycle.id(), upload.filename(), upload.bytes())
        {
            Ok(file) => file,
            Err(e) => {
                lifecycle.advance(UploadState::Failed);
                return Err(e);
            }
        };
        lifecycle.advance(UploadState::Persisted);
        let filename = sanitize_filename(upload.filename());
        drop(upload);

        lifecycle.advance(UploadState::Processing);
        let outcome = self.process(file.path(), format);
        lifecycle.advance(if outcome.is_ok() {
            UploadState::Succeeded
        } else {
            UploadState::Failed
        });

        let cleanup = file.remove();
        if cleanup.is_ok() {
            lifecycle.advance(UploadState::Cleaned);
        } else {
            warn!("Upload {}: cleanup deferred to drop", lifecycle.id());
        }

        let result = outcome?;
        cleanup?;

        info!(
            "Classified {filename}: is_eagle={} confidence={:.4}",
            result.is_eagle, result.confidence
        );

        Ok(Classification { filename, result })
    }

    /// Decode, extract, infer, and build a result from a stored file.
    pub fn process(&self, path: &Path, format: AudioFormat) -> Result<PredictionResult> {
        let waveform = load_waveform(path, format)?;
        debug!(
            "Loaded {} samples ({:.2}s) from {}",
            waveform.len(),
            waveform.duration_secs(),
            path.display()
        );

        let features = self.extractor.extract(&waveform)?;
        let (probabilities, shape) = self.executor.infer(&features)?;
        Ok(build_result(probabilities, &shape))
    }
}
