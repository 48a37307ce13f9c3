//! Text input shared by `anonymize` and `analyze`

use crate::anonymization::AnonymizationEngine;
use crate::domain::{EntityType, LanguageCode};
use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use tokio::io::AsyncReadExt;

/// Where texts come from and how they are scanned
#[derive(Args, Debug, Default)]
pub struct InputArgs {
    /// Text to process; reads --input or stdin when absent
    #[arg(short, long, conflicts_with = "input")]
    pub text: Option<String>,

    /// Input file
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Treat every non-empty line as a separate text
    #[arg(long)]
    pub lines: bool,

    /// Language code (defaults to analyzer.default_language)
    #[arg(long)]
    pub language: Option<String>,

    /// Entity types to detect, comma-separated (defaults to analyzer.entities)
    #[arg(short, long, value_delimiter = ',')]
    pub entities: Vec<String>,
}

impl InputArgs {
    /// Read the texts to process
    pub async fn read_texts(&self) -> Result<Vec<String>> {
        let raw = match (&self.text, &self.input) {
            (Some(text), _) => text.clone(),
            (None, Some(path)) => tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read input file: {}", path.display()))?,
            (None, None) => {
                let mut buf = String::new();
                tokio::io::stdin()
                    .read_to_string(&mut buf)
                    .await
                    .context("Failed to read stdin")?;
                buf
            }
        };

        if self.lines {
            Ok(raw
                .lines()
                .filter(|line| !line.trim().is_empty())
                .map(str::to_string)
                .collect())
        } else {
            Ok(vec![raw])
        }
    }

    /// Requested language, or the engine default
    pub fn language(&self, engine: &AnonymizationEngine) -> Result<LanguageCode> {
        match &self.language {
            Some(code) => LanguageCode::new(code.as_str()).map_err(anyhow::Error::msg),
            None => Ok(engine.default_language().clone()),
        }
    }

    /// Requested entity filter; `None` selects the engine default
    pub fn entity_types(&self) -> Result<Option<Vec<EntityType>>> {
        if self.entities.is_empty() {
            return Ok(None);
        }
        self.entities
            .iter()
            .map(|e| EntityType::new(e.as_str()).map_err(anyhow::Error::msg))
            .collect::<Result<Vec<_>>>()
            .map(Some)
    }
}
