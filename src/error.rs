//! Error types for eagle-detect.

use serde::Serialize;

/// Result type alias for eagle-detect operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for eagle-detect.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The upload was rejected before processing.
    #[error("{message}")]
    InvalidInput {
        /// Description suitable for the end user.
        message: String,
    },

    /// Failed to open or identify the audio stream.
    #[error("failed to open audio stream: {source}")]
    AudioOpen {
        /// Underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Audio bytes could not be decoded.
    #[error("failed to decode audio: {reason}")]
    Decode {
        /// Description of the decoding failure.
        reason: String,
    },

    /// Decoding produced no samples.
    #[error("audio contains no samples")]
    EmptyAudio,

    /// Failed to resample audio.
    #[error("failed to resample audio: {reason}")]
    Resample {
        /// Description of the resampling failure.
        reason: String,
    },

    /// The classifier rejected the input or produced an unusable output.
    #[error("inference failed: {reason}")]
    Inference {
        /// Description of the inference failure.
        reason: String,
    },

    /// Failed to persist or remove a temporary upload.
    #[error("storage error at '{path}'")]
    Storage {
        /// Path of the temporary file or directory.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Model file does not exist.
    #[error("model file does not exist: {path}")]
    ModelFileNotFound {
        /// Path to the missing model file.
        path: std::path::PathBuf,
    },

    /// Failed to load the classifier model.
    #[error("failed to load model '{path}': {reason}")]
    ModelLoad {
        /// Path to the model file.
        path: std::path::PathBuf,
        /// Description of the load failure.
        reason: String,
    },

    /// Configuration directory could not be determined.
    #[error("could not determine configuration directory for this platform")]
    ConfigDirNotFound,

    /// Failed to read configuration file.
    #[error("failed to read config file '{path}'")]
    ConfigRead {
        /// Path to the config file.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse configuration file.
    #[error("failed to parse config file '{path}'")]
    ConfigParse {
        /// Path to the config file.
        path: std::path::PathBuf,
        /// Underlying parse error.
        #[source]
        source: toml::de::Error,
    },

    /// Configuration validation failed.
    #[error("configuration validation failed: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    /// Failed to write configuration file.
    #[error("failed to write config file '{path}'")]
    ConfigWrite {
        /// Path to the config file.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize configuration.
    #[error("failed to serialize config")]
    ConfigSerialize {
        /// Underlying serialization error.
        #[source]
        source: toml::ser::Error,
    },

    /// Failed to serialize a response.
    #[error("failed to serialize response")]
    ResponseSerialize {
        /// Underlying serialization error.
        #[source]
        source: serde_json::Error,
    },

    /// One or more inputs could not be classified.
    #[error("{count} input(s) failed to classify")]
    FailedInputs {
        /// Number of failed inputs.
        count: usize,
    },
}

/// Coarse error category reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Bad filename, extension, or size.
    InvalidInput,
    /// Unparseable audio.
    Decode,
    /// Audio decoded to zero samples.
    EmptyAudio,
    /// Classifier contract violation.
    Inference,
    /// Temporary storage failure.
    Storage,
    /// Anything else.
    Internal,
}

impl ErrorKind {
    /// Whether the caller can fix the request (a 4xx-class failure).
    pub const fn is_user_error(self) -> bool {
        matches!(self, Self::InvalidInput | Self::Decode | Self::EmptyAudio)
    }
}

impl Error {
    /// Build an [`Error::InvalidInput`] from a message.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Category of this error.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput { .. } => ErrorKind::InvalidInput,
            Self::AudioOpen { .. } | Self::Decode { .. } => ErrorKind::Decode,
            Self::EmptyAudio => ErrorKind::EmptyAudio,
            Self::Inference { .. } => ErrorKind::Inference,
            Self::Storage { .. } => ErrorKind::Storage,
            _ => ErrorKind::Internal,
        }
    }
}
