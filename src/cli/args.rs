//! CLI argument definitions.

use crate::features::Normalization;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Classify audio clips as eagle calls or not.
#[derive(Debug, Parser)]
#[command(name = "eagle-detect")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Audio files to classify (wav, mp3, flac, ogg).
    pub inputs: Vec<PathBuf>,

    /// Common options for classification.
    #[command(flatten)]
    pub detect: DetectArgs,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage configuration.
    Config {
        /// Configuration action to perform.
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Print service description as JSON.
    Info,
}

/// Config subcommand actions.
#[derive(Debug, Clone, Copy, Subcommand)]
pub enum ConfigAction {
    /// Create default configuration file.
    Init,
    /// Display current configuration.
    Show,
    /// Print configuration file path.
    Path,
}

/// Arguments for classification.
#[derive(Debug, Args)]
pub struct DetectArgs {
    /// Path to ONNX model file (overrides config).
    #[arg(short, long, env = "EAGLE_MODEL")]
    pub model: Option<PathBuf>,

    /// Spectrogram normalization (overrides config).
    #[arg(short, long, value_enum, env = "EAGLE_NORMALIZATION")]
    pub normalization: Option<Normalization>,

    /// Directory for in-flight uploads (overrides config).
    #[arg(long, env = "EAGLE_UPLOAD_DIR")]
    pub upload_dir: Option<PathBuf>,

    /// Maximum accepted file size in bytes (overrides config).
    #[arg(long, value_parser = parse_max_bytes, env = "EAGLE_MAX_UPLOAD_BYTES")]
    pub max_upload_bytes: Option<u64>,

    /// Pretty-print JSON output.
    #[arg(long)]
    pub pretty: bool,

    /// Only log warnings and errors.
    #[arg(short, long)]
    pub quiet: bool,

    /// Increase verbosity (-v: debug, -vv: trace+ORT info, -vvv: trace+ORT debug).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Parse and validate a positive byte count.
fn parse_max_bytes(s: &str) -> Result<u64, String> {
    let value: u64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid byte count"))?;

    if value == 0 {
        return Err("max upload size must be at least 1 byte".to_string());
    }

    Ok(value)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_max_bytes() {
        assert_eq!(parse_max_bytes("1024").ok(), Some(1024));
        assert!(parse_max_bytes("0").is_err());
        assert!(parse_max_bytes("-5").is_err());
        assert!(parse_max_bytes("16MB").is_err());
    }

    #[test]
    fn test_cli_parse_multiple_inputs() {
        let cli = Cli::try_parse_from(["eagle-detect", "a.wav", "b.mp3"]).unwrap();
        assert_eq!(cli.inputs.len(), 2);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_parse_with_options() {
        let cli = Cli::try_parse_from([
            "eagle-detect",
            "call.flac",
            "-m",
            "/models/eagle.onnx",
            "--normalization",
            "min-max",
            "--max-upload-bytes",
            "2048",
            "--pretty",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.detect.model, Some(PathBuf::from("/models/eagle.onnx")));
        assert_eq!(cli.detect.normalization, Some(Normalization::MinMax));
        assert_eq!(cli.detect.max_upload_bytes, Some(2048));
        assert!(cli.detect.pretty);
        assert_eq!(cli.detect.verbose, 2);
    }

    #[test]
    fn test_cli_rejects_unknown_normalization() {
        let cli = Cli::try_parse_from(["eagle-detect", "x.wav", "--normalization", "zscore"]);
        assert!(cli.is_err());
    }

    #[test]
    fn test_cli_parse_subcommands() {
        let cli = Cli::try_parse_from(["eagle-detect", "config", "show"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::Config {
                action: ConfigAction::Show
            })
        ));

        let cli = Cli::try_parse_from(["eagle-detect", "info"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Info)));
    }
}
