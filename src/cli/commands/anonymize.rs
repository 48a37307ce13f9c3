//! Anonymize command implementation
//!
//! This module implements the `anonymize` command: detect PII in the input
//! and print the rewritten text. When any text fails, nothing is written.

use super::input::InputArgs;
use crate::anonymization::{AnonymizationEngine, AnonymizeRequest, OperatorPreset};
use crate::cli::exit_code;
use crate::config::VeilConfig;
use crate::{log_batch_complete, log_error_with_context};
use anyhow::Context;
use clap::Args;
use std::path::PathBuf;
use std::time::Instant;

/// Arguments for the anonymize command
#[derive(Args, Debug)]
pub struct AnonymizeArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Operator preset (redact or synthetic)
    #[arg(short, long, default_value = "redact", value_parser = parse_preset)]
    pub preset: OperatorPreset,

    /// Print JSON results including the span report
    #[arg(long)]
    pub spans: bool,

    /// Write output to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl AnonymizeArgs {
    /// Execute the anonymize command
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
        tracing::info!(
            texts = texts.len(),
            language = %language,
            preset = %self.preset,
            "Starting anonymization"
        );

        let requests: Vec<AnonymizeRequest> = texts
            .into_iter()
            .map(|text| {
                let mut request =
                    AnonymizeRequest::new(language.clone(), text).with_preset(self.preset);
                request.entities = entities.clone();
                request.return_spans = self.spans;
                request
            })
            .collect();

        let started = Instant::now();
        let results = engine.anonymize_batch(requests).await;

        let mut outputs = Vec::with_capacity(results.len());
        let mut code = 0;
        let mut failed = 0usize;
        for (index, result) in results.into_iter().enumerate() {
            match result {
                Ok(anonymized) => outputs.push(anonymized),
                Err(e) => {
                    log_error_with_context!(&e, "Failed to anonymize text");
                    eprintln!("❌ Text {}: {e}", index + 1);
                    code = code.max(exit_code(&e));
                    failed += 1;
                }
            }
        }
        log_batch_complete!(outputs.len(), failed, started.elapsed());

        if code != 0 {
            return Ok(code);
        }

        let rendered = if self.spans {
            let mut lines = Vec::with_capacity(outputs.len());
            for anonymized in &outputs {
                lines.push(serde_json::to_string(anonymized)?);
            }
            format!("{}\n", lines.join("\n"))
        } else if self.input.lines {
            let lines: Vec<&str> = outputs.iter().map(|o| o.output_text.as_str()).collect();
            format!("{}\n", lines.join("\n"))
        } else {
            outputs
                .into_iter()
                .map(|o| o.output_text)
                .collect::<String>()
        };

        match &self.output {
            Some(path) => {
                tokio::fs::write(path, rendered)
                    .await
                    .with_context(|| format!("Failed to write output file: {}", path.display()))?;
                eprintln!("✅ Output written to {}", path.display());
            }
            None => print!("{rendered}"),
        }

        Ok(0)
    }
}

/// Parse a preset name
pub fn parse_preset(value: &str) -> Result<OperatorPreset, String> {
    match value.to_lowercase().as_str() {
        "redact" => Ok(OperatorPreset::Redact),
        "synthetic" => Ok(OperatorPreset::Synthetic),
        other => Err(format!(
            "Invalid preset '{other}'. Must be one of: redact, synthetic"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use tempfile::tempdir;

    #[test]
    fn test_parse_preset() {
        assert_eq!(parse_preset("redact").unwrap(), OperatorPreset::Redact);
        assert_eq!(parse_preset("Synthetic").unwrap(), OperatorPreset::Synthetic);
        assert!(parse_preset("shuffle").is_err());
    }

    #[test]
    fn test_parse_args() {
        let cli = Cli::parse_from([
            "veil",
            "anonymize",
            "--text",
            "hi",
            "--preset",
            "synthetic",
            "--entities",
            "EMAIL_ADDRESS,IP_ADDRESS",
            "--spans",
        ]);
        let Commands::Anonymize(args) = cli.command else {
            panic!("expected anonymize");
        };
        assert_eq!(args.preset, OperatorPreset::Synthetic);
        assert_eq!(args.input.entities.len(), 2);
        assert!(args.spans);
    }

    #[tokio::test]
    async fn test_execute_writes_output_file() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("out.txt");
        let args = AnonymizeArgs {
            input: InputArgs {
                text: Some("Mail test@example.com".to_string()),
                ..Default::default()
            },
            preset: OperatorPreset::Redact,
            spans: false,
            output: Some(output.clone()),
        };

        let code = args.execute(VeilConfig::default()).await.unwrap();
        assert_eq!(code, 0);
        assert_eq!(
            std::fs::read_to_string(&output).unwrap(),
            "Mail HIDDEN_EMAIL"
        );
    }

    #[tokio::test]
    async fn test_execute_unsupported_language() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("out.txt");
        let args = AnonymizeArgs {
            input: InputArgs {
                text: Some("Bonjour".to_string()),
                language: Some("fr".to_string()),
                ..Default::default()
            },
            preset: OperatorPreset::Redact,
            spans: false,
            output: Some(output.clone()),
        };

        let code = args.execute(VeilConfig::default()).await.unwrap();
        assert_eq!(code, 3);
        assert!(!output.exists());
    }
}
