//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Veil using clap.
//!
//! Exit codes: 0 success, 2 configuration or usage error, 3 detection
//! failure (unavailable recognizer, unsupported language), 5 fatal error.

pub mod commands;

use crate::config::{load_config, load_default_config, VeilConfig};
use crate::domain::{Result, VeilError};
use clap::{Parser, Subcommand};
use std::path::Path;

/// Configuration file used when `--config` is not given
pub const DEFAULT_CONFIG_PATH: &str = "veil.toml";

/// Veil - multilingual PII detection and redaction
#[derive(Parser, Debug)]
#[command(name = "veil")]
#[command(version, about, long_about = None)]
#[command(author = "Veil Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH, env = "VEIL_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "VEIL_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Detect and rewrite PII in text
    Anonymize(commands::anonymize::AnonymizeArgs),

    /// Detect PII without rewriting and print the spans
    Analyze(commands::analyze::AnalyzeArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

/// Loads the configuration file, falling back to built-in defaults when the
/// default path is absent
///
/// An explicitly named file that does not exist is an error.
pub fn load_config_or_default(path: &str) -> Result<VeilConfig> {
    if path == DEFAULT_CONFIG_PATH && !Path::new(path).exists() {
        tracing::debug!(config_path = %path, "No configuration file found, using defaults");
        return load_default_config();
    }
    load_config(path)
}

/// Maps a library error to the process exit code
pub fn exit_code(error: &VeilError) -> i32 {
    match error {
        VeilError::Configuration(_)
        | VeilError::InvalidPattern { .. }
        | VeilError::MissingOperatorRule { .. } => 2,
        VeilError::RecognizerUnavailable { .. }
        | VeilError::UnsupportedLanguage(_)
        | VeilError::Validation(_) => 3,
        VeilError::Io(_) | VeilError::Serialization(_) => 5,
    }
}
