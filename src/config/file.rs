//! Locating, reading and writing the TOML config file.

use crate::config::Config;
use crate::constants::APP_NAME;
use crate::error::{Error, Result};
use directories::ProjectDirs;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "EAGLE_CONFIG";

const CONFIG_FILE_NAME: &str = "config.toml";

/// Path of the config file in use.
///
/// `EAGLE_CONFIG` wins when set and non-empty. Otherwise the file lives in
/// the platform config directory, e.g. `~/.config/eagle-detect/config.toml`
/// on Linux or `%APPDATA%\eagle-detect\config.toml` on Windows.
pub fn config_file_path() -> Result<PathBuf> {
    let platform = ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME));
    resolve_config_path(std::env::var_os(CONFIG_PATH_ENV), platform)
}

fn resolve_config_path(explicit: Option<OsString>, platform: Option<PathBuf>) -> Result<PathBuf> {
    match explicit {
        Some(path) if !path.is_empty() => Ok(PathBuf::from(path)),
        _ => platform.ok_or(Error::ConfigDirNotFound),
    }
}

/// Load configuration from a TOML file.
///
/// A missing file yields the defaults; any other read failure is an error.
pub fn load_config_file(path: &Path) -> Result<Config> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("No config file at {}, using defaults", path.display());
            return Ok(Config::default());
        }
        Err(e) => {
            return Err(Error::ConfigRead {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };

    toml::from_str(&contents).map_err(|e| Error::ConfigParse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Load configuration from [`config_file_path`].
///
/// Falls back to defaults when no config location can be determined.
pub fn load_default_config() -> Result<Config> {
    match config_file_path() {
        Ok(path) => load_config_file(&path),
        Err(_) => Ok(Config::default()),
    }
}

/// Write configuration as TOML, creating parent directories.
pub fn save_config(config: &Config, path: &Path) -> Result<()> {
    let write_error = |e| Error::ConfigWrite {
        path: path.to_path_buf(),
        source: e,
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(write_error)?;
    }

    let contents = toml::to_string_pretty(config).map_err(|e| Error::ConfigSerialize { source: e })?;
    std::fs::write(path, contents).map_err(write_error)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::features::Normalization;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_explicit_path_overrides_platform_dir() {
        let path = resolve_config_path(
            Some(OsString::from("/srv/eagle/config.toml")),
            Some(PathBuf::from("/home/me/.config/eagle-detect/config.toml")),
        )
        .unwrap();
        assert_eq!(path, PathBuf::from("/srv/eagle/config.toml"));
    }

    #[test]
    fn test_empty_override_falls_back_to_platform_dir() {
        let platform = PathBuf::from("/home/me/.config/eagle-detect/config.toml");
        let path = resolve_config_path(Some(OsString::new()), Some(platform.clone())).unwrap();
        assert_eq!(path, platform);
    }

    #[test]
    fn test_no_location_is_an_error() {
        let err = resolve_config_path(None, None).unwrap_err();
        assert!(matches!(err, Error::ConfigDirNotFound));
    }

    #[test]
    fn test_platform_path_is_under_app_dir() {
        let platform = ProjectDirs::from("", "", APP_NAME)
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
            .unwrap();
        assert!(platform.to_string_lossy().contains(APP_NAME));
        assert!(platform.ends_with(CONFIG_FILE_NAME));
    }

    #[test]
    fn test_load_nonexistent_file_returns_default() {
        let path = Path::new("/nonexistent/path/config.toml");
        let config = load_config_file(path).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_partial_config_fills_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[model]
path = "/opt/models/eagle.onnx"

[features]
normalization = "min-max"
"#
        )
        .unwrap();

        let config = load_config_file(file.path()).unwrap();
        assert_eq!(config.model.path, PathBuf::from("/opt/models/eagle.onnx"));
        assert_eq!(config.features.normalization, Normalization::MinMax);
        assert_eq!(config.uploads.max_bytes, 16 * 1024 * 1024);
    }

    #[test]
    fn test_load_invalid_toml_returns_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "this is not valid toml {{{{").unwrap();

        let config = load_config_file(file.path());
        assert!(matches!(config, Err(Error::ConfigParse { .. })));
    }

    #[test]
    fn test_save_then_load_preserves_values() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.uploads.dir = Some(PathBuf::from("/var/tmp/eagle"));
        config.uploads.max_bytes = 1024;
        save_config(&config, &path).unwrap();

        assert_eq!(load_config_file(&path).unwrap(), config);
    }
}
