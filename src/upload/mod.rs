//! Upload validation and scoped temporary storage.

mod store;

pub use store::{ScopedFile, UploadStore};

use crate::audio::AudioFormat;
use crate::constants::upload::{FALLBACK_FILENAME, MAX_SIZE_LABEL};
use crate::error::{Error, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use unicode_normalization::UnicodeNormalization;

/// Raw upload as received from a caller.
#[derive(Debug, Clone)]
pub struct UploadedAudio {
    filename: String,
    bytes: Vec<u8>,
}

impl UploadedAudio {
    /// Wrap bytes with their declared filename.
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }

    /// Read a local file as an upload, keeping only its file name.
    ///
    /// Files over `max_bytes` are rejected from their metadata, and the read
    /// itself stops after `max_bytes + 1` bytes in case the file grows.
    pub fn from_path(path: &Path, max_bytes: u64) -> Result<Self> {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let file = File::open(path)?;
        if file.metadata()?.len() > max_bytes {
            return Err(too_large(max_bytes));
        }

        let mut bytes = Vec::new();
        file.take(max_bytes.saturating_add(1))
            .read_to_end(&mut bytes)?;
        if bytes.len() as u64 > max_bytes {
            return Err(too_large(max_bytes));
        }

        Ok(Self::new(filename, bytes))
    }

    /// Declared filename.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Payload bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Check filename, extension, and size.
    ///
    /// Runs before anything touches the disk or the decoder.
    pub fn validate(&self, max_bytes: u64) -> Result<AudioFormat> {
        if self.filename.trim().is_empty() {
            return Err(Error::invalid_input("No file selected"));
        }

        let format = AudioFormat::from_filename(&self.filename).ok_or_else(|| {
            Error::invalid_input(format!(
                "Invalid file type. Allowed: {}",
                AudioFormat::allowed_list()
            ))
        })?;

        if self.bytes.len() as u64 > max_bytes {
            return Err(too_large(max_bytes));
        }

        Ok(format)
    }
}

/// The oversize rejection shared by every upload path.
pub(crate) fn too_large(max_bytes: u64) -> Error {
    Error::invalid_input(format!(
        "File too large. Maximum size is {}",
        size_label(max_bytes)
    ))
}

/// Size limit as shown in messages: `16MB` for the default, bytes otherwise.
pub fn size_label(max_bytes: u64) -> String {
    if max_bytes == crate::constants::upload::MAX_BYTES {
        MAX_SIZE_LABEL.to_string()
    } else {
        format!("{max_bytes} bytes")
    }
}

/// Reduce a client-supplied filename to a safe single path component.
///
/// Drops any directory part and folds accented letters to ASCII through NFKD
/// decomposition. Whitespace becomes `_`, and only ASCII alphanumerics plus
/// `.`, `_` and `-` are kept. Leading or trailing `.` and `_` are stripped.
/// An empty result becomes a fixed fallback name.
pub fn sanitize_filename(filename: &str) -> String {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or_default();

    let cleaned: String = base
        .nfkd()
        .filter_map(|c| {
            if c.is_whitespace() {
                Some('_')
            } else if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                Some(c)
            } else {
                None
            }
        })
        .collect();

    let trimmed = cleaned.trim_matches(|c| c == '.' || c == '_');
    if trimmed.is_empty() {
        FALLBACK_FILENAME.to_string()
    } else {
        trimmed.to_string()
    }
}
