//! Eagle-detect - eagle call detection in short audio clips.
//!
//! Audio is decoded and resampled to 16 kHz mono, turned into a normalized
//! 128x150 log-mel spectrogram, and scored by a binary CNN classifier.
//! Uploads live in scoped storage that is removed on every exit path.

#![warn(missing_docs)]

pub mod audio;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod features;
pub mod inference;
pub mod pipeline;
pub mod upload;

use clap::{CommandFactory, Parser};
use cli::{Cli, Command, ConfigAction, DetectArgs};
use config::{
    Config, config_file_path, load_default_config, save_config, validate_config,
};
use features::FeatureExtractor;
use inference::{ClassifierModel, OnnxClassifier};
use pipeline::{ClassifyResponse, EagleDetector};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use upload::{UploadStore, UploadedAudio, sanitize_filename};

pub use error::{Error, Result};

/// Main entry point for the eagle-detect CLI.
#[allow(clippy::print_stdout)]
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.detect.verbose, cli.detect.quiet);

    let mut config = load_default_config()?;
    apply_overrides(&mut config, &cli.detect);
    validate_config(&config)?;

    if let Some(command) = cli.command {
        return handle_command(command, &config);
    }

    if cli.inputs.is_empty() {
        let mut command = Cli::command();
        command.print_help()?;
        println!();
        return Ok(());
    }

    classify_files(&cli.inputs, &config, cli.detect.pretty)
}

/// Layer command-line and environment overrides on top of the config file.
pub fn apply_overrides(config: &mut Config, args: &DetectArgs) {
    if let Some(path) = &args.model {
        config.model.path.clone_from(path);
    }
    if let Some(normalization) = args.normalization {
        config.features.normalization = normalization;
    }
    if let Some(dir) = &args.upload_dir {
        config.uploads.dir = Some(dir.clone());
    }
    if let Some(max_bytes) = args.max_upload_bytes {
        config.uploads.max_bytes = max_bytes;
    }
}

/// Build a detector from configuration around an already loaded model.
pub fn build_detector(config: &Config, model: Arc<dyn ClassifierModel>) -> Result<EagleDetector> {
    let store = UploadStore::new(config.uploads.resolved_dir(), config.uploads.max_bytes)?;
    let extractor = FeatureExtractor::new(config.features.normalization);
    Ok(EagleDetector::new(store, extractor, model))
}

/// Classify each input independently, printing one JSON response per input.
fn classify_files(inputs: &[PathBuf], config: &Config, pretty: bool) -> Result<()> {
    let model = OnnxClassifier::load(&config.model.path)?;
    let detector = build_detector(config, Arc::new(model))?;
    info!(
        "Using normalization '{}', uploads in {}",
        detector.extractor().normalization(),
        detector.store().root().display()
    );

    let mut failed = 0;
    for input in inputs {
        let response = match UploadedAudio::from_path(input, config.uploads.max_bytes) {
            Ok(upload) => {
                let filename = sanitize_filename(upload.filename());
                ClassifyResponse::from_outcome(detector.classify(upload), Some(filename))
            }
            Err(e @ Error::InvalidInput { .. }) => {
                let filename = input
                    .file_name()
                    .map(|n| sanitize_filename(&n.to_string_lossy()));
                ClassifyResponse::failure(&e, filename)
            }
            Err(e) => ClassifyResponse::failure(
                &Error::invalid_input(format!("cannot read '{}': {e}", input.display())),
                None,
            ),
        };

        if !response.success {
            failed += 1;
            error!(
                "Failed to classify {}: {}",
                input.display(),
                response.error.as_deref().unwrap_or_default()
            );
        }

        print_json(&response, pretty)?;
    }

    if failed > 0 {
        return Err(Error::FailedInputs { count: failed });
    }

    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .map_err(|e| Error::ResponseSerialize { source: e })?;

    println!("{json}");
    Ok(())
}

fn init_logging(verbose: u8, quiet: bool) {
    use tracing_subscriber::{EnvFilter, fmt};

    // ORT logging stays off unless asked for; stdout is reserved for JSON.
    let filter_str = if quiet {
        "warn,ort=off".to_string()
    } else {
        match verbose {
            0 => "info,ort=off".to_string(),
            1 => "debug,ort=warn".to_string(),
            2 => "trace,ort=info".to_string(),
            _ => "trace".to_string(),
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn handle_command(command: Command, config: &Config) -> Result<()> {
    match command {
        Command::Config { action } => handle_config_command(action, config),
        Command::Info => print_json(&cli::info::ServiceInfo::new(config.uploads.max_bytes), true),
    }
}

#[allow(clippy::print_stdout)]
fn handle_config_command(action: ConfigAction, config: &Config) -> Result<()> {
    match action {
        ConfigAction::Init => {
            let path = config_file_path()?;
            if path.exists() {
                println!("Configuration file already exists: {}", path.display());
            } else {
                save_config(&Config::default(), &path)?;
                println!("Created configuration file: {}", path.display());
                println!("\nNext steps:");
                println!("  set [model] path to your exported cnn-eagle-model.onnx");
            }
            Ok(())
        }
        ConfigAction::Show => {
            let contents =
                toml::to_string_pretty(config).map_err(|e| Error::ConfigSerialize { source: e })?;
            print!("{contents}");
            Ok(())
        }
        ConfigAction::Path => {
            let path = config_file_path()?;
            println!("{}", path.display());
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::features::Normalization;

    #[test]
    fn test_overrides_replace_file_values() {
        let cli = Cli::try_parse_from([
            "eagle-detect",
            "--model",
            "/tmp/m.onnx",
            "--normalization",
            "min-max",
            "--upload-dir",
            "/tmp/up",
            "--max-upload-bytes",
            "99",
        ])
        .unwrap();

        let mut config = Config::default();
        apply_overrides(&mut config, &cli.detect);

        assert_eq!(config.model.path, PathBuf::from("/tmp/m.onnx"));
        assert_eq!(config.features.normalization, Normalization::MinMax);
        assert_eq!(config.uploads.dir, Some(PathBuf::from("/tmp/up")));
        assert_eq!(config.uploads.max_bytes, 99);
    }

    #[test]
    fn test_no_overrides_keeps_config() {
        let cli = Cli::try_parse_from(["eagle-detect"]).unwrap();
        let mut config = Config::default();
        apply_overrides(&mut config, &cli.detect);
        assert_eq!(config, Config::default());
    }
}
