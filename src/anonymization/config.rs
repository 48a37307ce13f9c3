//! Anonymization configuration
//!
//! These sections sit at the top level of `veil.toml`:
//! `[analyzer]`, `[patterns]`, `[model]`, `[operators.*]` and `[audit]`.

use crate::anonymization::recognizer::ContextEnhancer;
use crate::domain::{EntityType, LanguageCode};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// Entity types detected when a request does not name any
pub const DEFAULT_ENTITIES: &[&str] = &[
    "PHONES_en",
    "PHONES_el",
    "PERSON",
    "LONG_NUMBERS_en",
    "LONG_NUMBERS_el",
    "EMAIL_ADDRESS",
    "IP_ADDRESS",
    "LOCATION",
    "DATE_TIME",
    "IBAN_CODE",
    "CREDIT_CARD",
];

/// Detection pipeline configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnonymizationConfig {
    /// Analyzer settings
    #[serde(default)]
    pub analyzer: AnalyzerConfig,

    /// Pattern library settings
    #[serde(default)]
    pub patterns: PatternsConfig,

    /// Optional model-backed recognizer
    #[serde(default)]
    pub model: Option<ModelConfig>,

    /// Operator rule overrides per preset
    #[serde(default)]
    pub operators: OperatorsConfig,

    /// Audit logging configuration
    #[serde(default)]
    pub audit: AuditConfig,
}

impl AnonymizationConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.analyzer
            .validate()
            .context("Invalid analyzer configuration")?;
        self.patterns
            .validate()
            .context("Invalid patterns configuration")?;
        if let Some(ref model) = self.model {
            model.validate().context("Invalid model configuration")?;
        }
        self.operators
            .validate()
            .context("Invalid operators configuration")?;
        self.audit.validate().context("Invalid audit configuration")?;
        Ok(())
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.analyzer.apply_env_overrides()?;

        if let Ok(val) = std::env::var("VEIL_PATTERNS_LIBRARY") {
            self.patterns.library = Some(PathBuf::from(val));
        }

        if let Ok(val) = std::env::var("VEIL_MODEL_ENDPOINT") {
            self.model.get_or_insert_with(ModelConfig::default).endpoint = val;
        }
        if let Some(ref mut model) = self.model {
            if let Ok(val) = std::env::var("VEIL_MODEL_TIMEOUT_MS") {
                model.timeout_ms = val.parse().context("Invalid VEIL_MODEL_TIMEOUT_MS value")?;
            }
        }

        self.audit.apply_env_overrides()?;

        Ok(())
    }
}

/// Analyzer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Language used when a request does not name one
    pub default_language: String,

    /// Entity types detected when a request does not name any
    pub entities: Vec<String>,

    /// Append the terminator to texts that lack it before detection
    pub append_terminator: bool,

    /// Terminator appended for detection
    pub terminator: String,

    /// Spans scoring below this are dropped
    pub score_threshold: f64,

    /// Per-request budget for each recognizer
    pub recognizer_timeout_ms: u64,

    /// Context-word enhancement
    pub context: ContextEnhancer,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            default_language: "en".to_string(),
            entities: DEFAULT_ENTITIES.iter().map(|e| e.to_string()).collect(),
            append_terminator: true,
            terminator: ".".to_string(),
            score_threshold: 0.0,
            recognizer_timeout_ms: 5000,
            context: ContextEnhancer::default(),
        }
    }
}

impl AnalyzerConfig {
    /// Validate analyzer configuration
    pub fn validate(&self) -> Result<()> {
        self.language()?;
        if self.entities.is_empty() {
            anyhow::bail!("entities must not be empty");
        }
        self.entity_types()?;
        if self.append_terminator && self.terminator.is_empty() {
            anyhow::bail!("terminator must not be empty when append_terminator is set");
        }
        if !(0.0..=1.0).contains(&self.score_threshold) {
            anyhow::bail!("score_threshold must be between 0.0 and 1.0");
        }
        if self.recognizer_timeout_ms == 0 {
            anyhow::bail!("recognizer_timeout_ms must be greater than 0");
        }
        if !(0.0..=1.0).contains(&self.context.similarity_factor)
            || !(0.0..=1.0).contains(&self.context.min_score_with_context)
        {
            anyhow::bail!("context factors must be between 0.0 and 1.0");
        }
        Ok(())
    }

    /// Default language as a validated code
    pub fn language(&self) -> Result<LanguageCode> {
        LanguageCode::new(self.default_language.as_str())
            .map_err(|e| anyhow::anyhow!("Invalid default_language: {e}"))
    }

    /// Default entity set as validated types
    pub fn entity_types(&self) -> Result<Vec<EntityType>> {
        self.entities
            .iter()
            .map(|e| EntityType::new(e.as_str()).map_err(|err| anyhow::anyhow!(err)))
            .collect()
    }

    /// Recognizer timeout as a duration
    pub fn recognizer_timeout(&self) -> Duration {
        Duration::from_millis(self.recognizer_timeout_ms)
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var("VEIL_ANALYZER_DEFAULT_LANGUAGE") {
            self.default_language = val;
        }
        if let Ok(val) = std::env::var("VEIL_ANALYZER_ENTITIES") {
            self.entities = val
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Ok(val) = std::env::var("VEIL_ANALYZER_APPEND_TERMINATOR") {
            self.append_terminator = val
                .parse()
                .context("Invalid VEIL_ANALYZER_APPEND_TERMINATOR value")?;
        }
        if let Ok(val) = std::env::var("VEIL_ANALYZER_SCORE_THRESHOLD") {
            self.score_threshold = val
                .parse()
                .context("Invalid VEIL_ANALYZER_SCORE_THRESHOLD value")?;
        }
        if let Ok(val) = std::env::var("VEIL_ANALYZER_RECOGNIZER_TIMEOUT_MS") {
            self.recognizer_timeout_ms = val
                .parse()
                .context("Invalid VEIL_ANALYZER_RECOGNIZER_TIMEOUT_MS value")?;
        }
        Ok(())
    }
}

/// Pattern library configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternsConfig {
    /// Load the embedded default library
    pub include_defaults: bool,

    /// Additional pattern library TOML file
    pub library: Option<PathBuf>,
}

impl Default for PatternsConfig {
    fn default() -> Self {
        Self {
            include_defaults: true,
            library: None,
        }
    }
}

impl PatternsConfig {
    /// Validate pattern library settings
    pub fn validate(&self) -> Result<()> {
        if let Some(ref path) = self.library {
            if !path.exists() {
                anyhow::bail!("Pattern library file not found: {}", path.display());
            }
            if path.extension().and_then(|s| s.to_str()) != Some("toml") {
                anyhow::bail!("Pattern library must be a TOML file: {}", path.display());
            }
        }
        Ok(())
    }
}

/// Model-backed recognizer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// JSON-over-HTTP model endpoint
    pub endpoint: String,

    /// Languages the model serves; one recognizer is registered per language
    pub languages: Vec<String>,

    /// HTTP timeout
    pub timeout_ms: u64,

    /// Score for predictions without one
    pub default_score: f64,

    /// Model labels to drop
    pub ignored_labels: Vec<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            languages: vec!["en".to_string(), "el".to_string()],
            timeout_ms: 5000,
            default_score: crate::anonymization::recognizer::model::DEFAULT_MODEL_SCORE,
            ignored_labels: vec!["NORP".to_string()],
        }
    }
}

impl ModelConfig {
    /// Validate model configuration
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.endpoint)
            .with_context(|| format!("Invalid model endpoint '{}'", self.endpoint))?;
        if self.languages.is_empty() {
            anyhow::bail!("model languages must not be empty");
        }
        self.language_codes()?;
        if self.timeout_ms == 0 {
            anyhow::bail!("timeout_ms must be greater than 0");
        }
        if !(0.0..=1.0).contains(&self.default_score) {
            anyhow::bail!("default_score must be between 0.0 and 1.0");
        }
        Ok(())
    }

    /// Languages as validated codes
    pub fn language_codes(&self) -> Result<Vec<LanguageCode>> {
        self.languages
            .iter()
            .map(|l| LanguageCode::new(l.as_str()).map_err(|e| anyhow::anyhow!(e)))
            .collect()
    }

    /// HTTP timeout as a duration
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Operator rule as written in configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OperatorRuleConfig {
    /// Replace with a literal value
    Replace { new_value: String },
    /// Replace characters with a masking character
    Mask {
        masking_char: char,
        chars_to_mask: usize,
        #[serde(default)]
        from_end: bool,
    },
    /// Replace with a generated value
    Generate {
        generator: String,
        #[serde(default)]
        values: Vec<String>,
    },
}

/// Operator overrides per preset, keyed by entity type
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OperatorsConfig {
    pub redact: BTreeMap<String, OperatorRuleConfig>,
    pub synthetic: BTreeMap<String, OperatorRuleConfig>,
}

impl OperatorsConfig {
    /// Validate rule overrides
    pub fn validate(&self) -> Result<()> {
        for (preset, rules) in [("redact", &self.redact), ("synthetic", &self.synthetic)] {
            for (entity, rule) in rules {
                EntityType::new(entity.as_str())
                    .map_err(|e| anyhow::anyhow!("[operators.{preset}] {e}"))?;
                if let OperatorRuleConfig::Generate { generator, values } = rule {
                    match generator.as_str() {
                        "iban" | "digits" => {}
                        "list" if !values.is_empty() => {}
                        "list" => anyhow::bail!(
                            "[operators.{preset}] {entity}: list generator needs values"
                        ),
                        other => anyhow::bail!(
                            "[operators.{preset}] {entity}: unknown generator '{other}'"
                        ),
                    }
                }
            }
        }
        Ok(())
    }
}

/// Audit logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Enable audit logging
    #[serde(default)]
    pub enabled: bool,

    /// Audit log file path
    #[serde(default = "default_audit_log_path")]
    pub log_path: PathBuf,

    /// Use JSON format for audit logs
    #[serde(default = "default_audit_json_format")]
    pub json_format: bool,
}

fn default_audit_log_path() -> PathBuf {
    PathBuf::from("./audit/redactions.log")
}

fn default_audit_json_format() -> bool {
    true
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            log_path: default_audit_log_path(),
            json_format: default_audit_json_format(),
        }
    }
}

impl AuditConfig {
    /// Validate audit configuration
    pub fn validate(&self) -> Result<()> {
        if self.enabled {
            if let Some(parent) = self.log_path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    std::fs::create_dir_all(parent).with_context(|| {
                        format!("Failed to create audit log directory: {}", parent.display())
                    })?;
                }
            }
        }
        Ok(())
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var("VEIL_AUDIT_ENABLED") {
            self.enabled = val.parse().context("Invalid VEIL_AUDIT_ENABLED value")?;
        }

        if let Ok(val) = std::env::var("VEIL_AUDIT_LOG_PATH") {
            self.log_path = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var("VEIL_AUDIT_JSON_FORMAT") {
            self.json_format = val
                .parse()
                .context("Invalid VEIL_AUDIT_JSON_FORMAT value")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AnonymizationConfig::default();
        assert_eq!(config.analyzer.default_language, "en");
        assert_eq!(config.analyzer.entities.len(), DEFAULT_ENTITIES.len());
        assert!(config.analyzer.append_terminator);
        assert!(config.patterns.include_defaults);
        assert!(config.model.is_none());
        assert!(!config.audit.enabled);
        assert!(config.audit.json_format);
    }

    #[test]
    fn test_config_validation() {
        let config = AnonymizationConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_threshold() {
        let mut config = AnonymizationConfig::default();
        config.analyzer.score_threshold = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_entity_name() {
        let mut config = AnonymizationConfig::default();
        config.analyzer.entities.push("NOT VALID".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_pattern_library() {
        let mut config = AnonymizationConfig::default();
        config.patterns.library = Some(PathBuf::from("/nonexistent/library.toml"));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_model_endpoint_must_be_url() {
        let mut config = AnonymizationConfig::default();
        config.model = Some(ModelConfig {
            endpoint: "not a url".to_string(),
            ..Default::default()
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_operator_overrides() {
        let toml = r##"
            [operators.redact]
            PERSON = { type = "replace", new_value = "<PERSON>" }
            CREDIT_CARD = { type = "mask", masking_char = "#", chars_to_mask = 12 }

            [operators.synthetic]
            IBAN_CODE = { type = "generate", generator = "iban" }
            PERSON = { type = "generate", generator = "list", values = ["Alex", "Sam"] }
        "##;
        let config: AnonymizationConfig = toml::from_str(toml).unwrap();
        assert_eq!(
            config.operators.redact["CREDIT_CARD"],
            OperatorRuleConfig::Mask {
                masking_char: '#',
                chars_to_mask: 12,
                from_end: false
            }
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_generator_rejected() {
        let toml = r#"
            [operators.synthetic]
            PERSON = { type = "generate", generator = "faker" }
        "#;
        let config: AnonymizationConfig = toml::from_str(toml).unwrap();
        assert!(config.validate().is_err());
    }
}
