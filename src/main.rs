// Veil - Multilingual PII Detection and Redaction
// Copyright (c) 2025 Veil Contributors
// Licensed under the MIT License

use clap::Parser;
use std::process;
use veil::cli::{load_config_or_default, Cli, Commands};
use veil::config::{LoggingConfig, VeilConfig};
use veil::logging::init_logging;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // `init` and `validate-config` report configuration problems themselves
    let config = match &cli.command {
        Commands::Init(_) | Commands::ValidateConfig(_) => None,
        _ => match load_config_or_default(&cli.config) {
            Ok(config) => Some(config),
            Err(e) => {
                eprintln!("❌ Failed to load configuration: {e}");
                process::exit(2);
            }
        },
    };

    let log_level = cli
        .log_level
        .clone()
        .or_else(|| config.as_ref().map(|c| c.application.log_level.clone()))
        .unwrap_or_else(|| "info".to_string());
    let logging_config = config
        .as_ref()
        .map(|c| c.logging.clone())
        .unwrap_or_else(LoggingConfig::default);

    let guard = match init_logging(&log_level, &logging_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(5);
        }
    };

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "Veil starting");

    let exit_code = match execute_command(&cli, config).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e:#}");
            5 // Fatal error exit code
        }
    };

    // Flush file logs before exiting
    drop(guard);
    process::exit(exit_code);
}

/// Execute the CLI command
async fn execute_command(cli: &Cli, config: Option<VeilConfig>) -> anyhow::Result<i32> {
    match &cli.command {
        Commands::Anonymize(args) => args.execute(config.unwrap_or_default()).await,
        Commands::Analyze(args) => args.execute(config.unwrap_or_default()).await,
        Commands::ValidateConfig(args) => args.execute(&cli.config).await,
        Commands::Init(args) => args.execute().await,
    }
}
