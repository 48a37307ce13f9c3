//! Configuration management for Veil.
//!
//! This module provides TOML-based configuration loading, parsing, and validation.
//!
//! # Overview
//!
//! Veil uses TOML configuration files with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `VEIL_<SECTION>_<KEY>` environment overrides
//! - Default values for every setting
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use veil::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("veil.toml")?;
//!
//! println!("Default language: {}", config.anonymization.analyzer.default_language);
//! if let Some(model) = &config.anonymization.model {
//!     println!("Model endpoint: {}", model.endpoint);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Application settings (log level)
//! - `[analyzer]`, `[patterns]`, `[model]`, `[operators.*]`, `[audit]` -
//!   see [`AnonymizationConfig`](crate::anonymization::AnonymizationConfig)
//! - [`LoggingConfig`] - Logging configuration
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [analyzer]
//! default_language = "el"
//!
//! [model]
//! endpoint = "${VEIL_MODEL_URL}"
//! languages = ["en", "el"]
//!
//! [operators.redact.PERSON]
//! type = "replace"
//! new_value = "ANONYMOUS"
//! ```

pub mod loader;
pub mod schema;

// Re-export commonly used types
pub use loader::{load_config, load_config_from_str, load_default_config};
pub use schema::{ApplicationConfig, LoggingConfig, VeilConfig};
