//! CLI argument parsing and command handling.

mod args;
pub mod info;

pub use args::{Cli, Command, ConfigAction, DetectArgs};
