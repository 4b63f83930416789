//! Configuration validation.

use crate::config::Config;
use crate::error::{Error, Result};

/// Validate the entire configuration.
///
/// Only checks values; whether the model file exists is checked when it is loaded.
pub fn validate_config(config: &Config) -> Result<()> {
    if config.model.path.as_os_str().is_empty() {
        return Err(Error::ConfigValidation {
            message: "model.path must not be empty".to_string(),
        });
    }

    if config.uploads.max_bytes == 0 {
        return Err(Error::ConfigValidation {
            message: "uploads.max_bytes must be at least 1".to_string(),
        });
    }

    if let Some(dir) = &config.uploads.dir
        && dir.as_os_str().is_empty()
    {
        return Err(Error::ConfigValidation {
            message: "uploads.dir must not be empty when set".to_string(),
        });
    }

    Ok(())
}
