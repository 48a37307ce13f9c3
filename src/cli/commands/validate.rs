//! Validate config command implementation
//!
//! This module implements the `validate-config` command: load the
//! configuration, build the detection engine from it and print a summary.

use crate::anonymization::{AnonymizationEngine, OperatorPreset};
use crate::cli::{exit_code, load_config_or_default};
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        let config = match load_config_or_default(config_path) {
            Ok(c) => {
                println!("✅ Configuration file loaded successfully");
                c
            }
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        let application = config.application.clone();
        let logging = config.logging.clone();
        let model = config.anonymization.model.clone();
        let audit = config.anonymization.audit.clone();
        let library = config.anonymization.patterns.library.clone();

        let engine = match AnonymizationEngine::new(config.anonymization) {
            Ok(engine) => {
                println!("✅ Recognizers and operator tables are valid");
                engine
            }
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                println!();
                return Ok(exit_code(&e));
            }
        };

        for preset in [OperatorPreset::Redact, OperatorPreset::Synthetic] {
            if let Err(e) = engine
                .operator_table(preset)
                .ensure_covers(engine.default_entities())
            {
                println!("❌ Preset '{preset}' cannot serve the default entities");
                println!("   Error: {e}");
                println!();
                return Ok(exit_code(&e));
            }
        }

        let languages: Vec<&str> = engine
            .supported_languages()
            .iter()
            .map(|l| l.as_str())
            .collect();
        let entities: Vec<&str> = engine
            .default_entities()
            .iter()
            .map(|e| e.as_str())
            .collect();

        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", application.log_level);
        println!("  Default Language: {}", engine.default_language());
        println!("  Supported Languages: {}", languages.join(", "));
        println!("  Default Entities: {}", entities.join(", "));
        println!("  Recognizers: {}", engine.recognizer_names().len());
        if let Some(path) = library {
            println!("  Pattern Library: {}", path.display());
        }
        match model {
            Some(model) => println!(
                "  Model Endpoint: {} ({})",
                model.endpoint,
                model.languages.join(", ")
            ),
            None => println!("  Model Endpoint: none"),
        }
        println!(
            "  Redact Rules: {}",
            engine.operator_table(OperatorPreset::Redact).len()
        );
        println!(
            "  Synthetic Rules: {}",
            engine.operator_table(OperatorPreset::Synthetic).len()
        );
        println!(
            "  Audit Log: {}",
            if audit.enabled {
                audit.log_path.display().to_string()
            } else {
                "disabled".to_string()
            }
        );
        println!(
            "  File Logging: {}",
            if logging.local_enabled {
                logging.local_path
            } else {
                "disabled".to_string()
            }
        );
        println!();
        Ok(0)
    }
}
