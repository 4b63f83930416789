//! JSON envelope returned for each classified upload.

use crate::error::{Error, ErrorKind, Result};
use crate::inference::PredictionResult;
use serde::Serialize;

/// Successful classification of one upload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    /// Sanitized name the upload was stored under.
    pub filename: String,
    /// Decision and probabilities.
    pub result: PredictionResult,
}

/// Outcome envelope, `success` plus either a result or an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifyResponse {
    /// Whether classification succeeded.
    pub success: bool,
    /// Sanitized filename, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Classification result on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<PredictionResult>,
    /// Error message on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Error category on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
}

impl ClassifyResponse {
    /// Envelope for a successful classification.
    pub fn success(classification: Classification) -> Self {
        Self {
            success: true,
            filename: Some(classification.filename),
            result: Some(classification.result),
            error: None,
            kind: None,
        }
    }

    /// Envelope for a failed classification.
    pub fn failure(error: &Error, filename: Option<String>) -> Self {
        Self {
            success: false,
            filename,
            result: None,
            error: Some(error.to_string()),
            kind: Some(error.kind()),
        }
    }

    /// Build from a pipeline outcome.
    pub fn from_outcome(outcome: Result<Classification>, filename: Option<String>) -> Self {
        match outcome {
            Ok(classification) => Self::success(classification),
            Err(e) => Self::failure(&e, filename),
        }
    }
}
