//! Service description printed by `eagle-detect info`.

use crate::constants::{MODEL_INPUT_SHAPE, SERVICE_NAME};
use crate::constants::upload::ALLOWED_EXTENSIONS;
use crate::upload::size_label;
use serde::Serialize;

/// Static facts about the detector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceInfo {
    /// Service name.
    pub name: &'static str,
    /// Crate version.
    pub version: &'static str,
    /// One-line description.
    pub description: &'static str,
    /// Accepted file extensions.
    pub supported_formats: Vec<&'static str>,
    /// Size limit as shown to users.
    pub max_file_size: String,
    /// Tensor shape fed to the classifier.
    pub input_shape: [usize; 4],
}

impl ServiceInfo {
    /// Describe a detector accepting uploads up to `max_bytes`.
    pub fn new(max_bytes: u64) -> Self {
        Self {
            name: SERVICE_NAME,
            version: env!("CARGO_PKG_VERSION"),
            description: "Detects eagle calls in audio recordings with a CNN over mel spectrograms",
            supported_formats: ALLOWED_EXTENSIONS.to_vec(),
            max_file_size: size_label(max_bytes),
            input_shape: MODEL_INPUT_SHAPE,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::constants::upload::MAX_BYTES;

    #[test]
    fn test_default_info_json() {
        let json = serde_json::to_value(ServiceInfo::new(MAX_BYTES)).unwrap();
        assert_eq!(json["name"], "Eagle Detection API");
        assert_eq!(json["max_file_size"], "16MB");
        assert_eq!(
            json["supported_formats"],
            serde_json::json!(["wav", "mp3", "flac", "ogg"])
        );
        assert_eq!(json["input_shape"], serde_json::json!([1, 128, 150, 1]));
    }

    #[test]
    fn test_custom_limit_is_reported_in_bytes() {
        assert_eq!(ServiceInfo::new(1000).max_file_size, "1000 bytes");
    }
}
