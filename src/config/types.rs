//! Configuration type definitions.

use crate::constants::APP_NAME;
use crate::constants::upload::{DEFAULT_DIR_NAME, MAX_BYTES};
use crate::features::Normalization;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default location of the exported classifier, relative to the working directory.
pub const DEFAULT_MODEL_PATH: &str = "models/cnn-eagle-model.onnx";

/// Complete application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Classifier model settings.
    pub model: ModelConfig,

    /// Feature extraction settings.
    pub features: FeaturesConfig,

    /// Upload storage settings.
    pub uploads: UploadsConfig,
}

/// Classifier model settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Path to the ONNX model file.
    pub path: PathBuf,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_MODEL_PATH),
        }
    }
}

/// Feature extraction settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeaturesConfig {
    /// Normalization applied to the log-mel spectrogram.
    ///
    /// Must match what the model was trained with.
    pub normalization: Normalization,
}

/// Upload storage settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadsConfig {
    /// Directory for in-flight uploads. Defaults to a folder under the system temp dir.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,

    /// Maximum accepted upload size in bytes.
    pub max_bytes: u64,
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            dir: None,
            max_bytes: MAX_BYTES,
        }
    }
}

impl UploadsConfig {
    /// Configured directory, or `<tmp>/eagle-detect/uploads`.
    pub fn resolved_dir(&self) -> PathBuf {
        self.dir.clone().unwrap_or_else(|| {
            std::env::temp_dir()
                .join(APP_NAME)
                .join(DEFAULT_DIR_NAME)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.model.path, PathBuf::from(DEFAULT_MODEL_PATH));
        assert_eq!(config.features.normalization, Normalization::Standard);
        assert_eq!(config.uploads.max_bytes, 16 * 1024 * 1024);
        assert!(config.uploads.dir.is_none());
    }

    #[test]
    fn test_resolved_dir_defaults_under_temp() {
        let dir = UploadsConfig::default().resolved_dir();
        assert!(dir.starts_with(std::env::temp_dir()));
        assert!(dir.ends_with("eagle-detect/uploads"));
    }

    #[test]
    fn test_resolved_dir_prefers_configured() {
        let uploads = UploadsConfig {
            dir: Some(PathBuf::from("/srv/uploads")),
            ..UploadsConfig::default()
        };
        assert_eq!(uploads.resolved_dir(), PathBuf::from("/srv/uploads"));
    }
}
