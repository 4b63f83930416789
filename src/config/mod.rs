//! Configuration loading and management.

mod file;
mod types;
mod validate;

pub use file::{
    CONFIG_PATH_ENV, config_file_path, load_config_file, load_default_config, save_config,
};
pub use types::{Config, DEFAULT_MODEL_PATH, FeaturesConfig, ModelConfig, UploadsConfig};
pub use validate::validate_config;
