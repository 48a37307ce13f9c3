//! Analyze command implementation
//!
//! This module implements the `analyze` command: detection without
//! rewriting. Each text yields one JSON line with its resolved spans in
//! character offsets. `--report` prints a summary instead.

use super::input::InputArgs;
use crate::anonymization::{AnalysisReport, AnonymizationEngine, AnonymizeRequest};
use crate::cli::exit_code;
use crate::config::VeilConfig;
use crate::log_error_with_context;
use anyhow::Context;
use clap::Args;
use std::path::PathBuf;
use std::time::Instant;

/// Arguments for the analyze command
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Print a summary report instead of per-text spans
    #[arg(long)]
    pub report: bool,

    /// Write the summary report as JSON to this file
    #[arg(long)]
    pub report_file: Option<PathBuf>,
}

impl AnalyzeArgs {
    /// Execute the analyze command
    pub async fn execute(&self, config: VeilConfig) -> anyhow::Result<i32> {
        let engine = match AnonymizationEngine::new(config.anonymization) {
            Ok(engine) => engine,
            Err(e) => {
                eprintln!("❌ Failed to initialize detection engine");
                eprintln!("   Error: {e}");
                return Ok(exit_code(&e));
            }
        };

        let (language, entities) = match (
            self.input.language(&engine),
            self.input.entity_types(),
        ) {
            (Ok(language), Ok(entities)) => (language, entities),
            (Err(e), _) | (_, Err(e)) => {
                eprintln!("❌ Invalid arguments");
                eprintln!("   Error: {e}");
                return Ok(2); // Usage error exit code
            }
        };

        let texts = self.input.read_texts().await?;
        tracing::info!(texts = texts.len(), language = %language, "Starting analysis");

        let mut report = AnalysisReport::new();
        let mut code = 0;

        for (index, text) in texts.into_iter().enumerate() {
            let mut request = AnonymizeRequest::new(language.clone(), text);
            request.entities = entities.clone();

            let started = Instant::now();
            match engine.analyze(&request).await {
                Ok(result) => {
                    report.add_result(&result, started.elapsed().as_millis() as u64);
                    if !self.report {
                        println!("{}", serde_json::to_string(&result)?);
                    }
                }
                Err(e) => {
                    log_error_with_context!(&e, "Failed to analyze text");
                    eprintln!("❌ Text {}: {e}", index + 1);
                    report.add_warning(format!("text {}: {e}", index + 1));
                    code = code.max(exit_code(&e));
                }
            }
        }

        if self.report {
            println!("{}", report.format_console());
        }

        if let Some(path) = &self.report_file {
            report
                .write_to_file(path)
                .with_context(|| format!("Failed to write report: {}", path.display()))?;
            eprintln!("✅ Report written to {}", path.display());
        }

        Ok(code)
    }
}
