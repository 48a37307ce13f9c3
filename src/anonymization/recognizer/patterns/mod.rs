//! Pattern library for PII detection
//!
//! A pattern library is a TOML document listing `[[recognizer]]` tables, each
//! compiled into one [`PatternRecognizer`]. The default library is embedded in
//! the binary; a user library can add recognizers on top of it.

use super::{
    context::ContextEnhancer,
    pattern::{Pattern, PatternRecognizer},
    validators::Validator,
};
use crate::domain::{EntityType, LanguageCode, Result, VeilError};
use anyhow::Context;
use serde::Deserialize;
use std::path::Path;

/// Embedded default library
const DEFAULT_LIBRARY: &str = include_str!("../../../../patterns/recognizers.toml");

/// Pattern definition from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct PatternDefinition {
    /// Pattern name
    pub name: String,
    /// Regex source
    pub regex: String,
    /// Score assigned to matches (0.0 - 1.0)
    pub score: f64,
}

/// Recognizer definition from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct RecognizerDefinition {
    /// Unique recognizer name
    pub name: String,
    /// Entity type emitted
    pub entity: String,
    /// Language code, absent for language-agnostic recognizers
    #[serde(default)]
    pub language: Option<String>,
    /// Context words
    #[serde(default)]
    pub context: Vec<String>,
    /// Optional checksum validator
    #[serde(default)]
    pub validator: Option<Validator>,
    /// Patterns
    pub patterns: Vec<PatternDefinition>,
}

/// Pattern library container
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PatternLibrary {
    #[serde(default, rename = "recognizer")]
    recognizers: Vec<RecognizerDefinition>,
}

impl PatternLibrary {
    /// Load a pattern library from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).with_context(|| {
            format!(
                "Failed to read pattern library: {}",
                path.as_ref().display()
            )
        })?;

        Self::from_toml(&content)
            .with_context(|| format!("Invalid pattern library: {}", path.as_ref().display()))
    }

    /// Parse a pattern library from TOML content
    pub fn from_toml(content: &str) -> Result<Self> {
        let library: PatternLibrary = toml::from_str(content)?;
        Ok(library)
    }

    /// The embedded default library
    pub fn default_library() -> Result<Self> {
        Self::from_toml(DEFAULT_LIBRARY)
    }

    /// Recognizer definitions in declaration order
    pub fn definitions(&self) -> &[RecognizerDefinition] {
        &self.recognizers
    }

    /// Append the definitions of another library
    pub fn extend(&mut self, other: PatternLibrary) {
        self.recognizers.extend(other.recognizers);
    }

    /// Compile every definition into a recognizer
    ///
    /// Fails on the first invalid entity, language, regex or score so that a
    /// broken library never starts serving.
    pub fn build(&self, enhancer: ContextEnhancer) -> Result<Vec<PatternRecognizer>> {
        self.recognizers
            .iter()
            .map(|def| Self::build_one(def, enhancer))
            .collect()
    }

    fn build_one(def: &RecognizerDefinition, enhancer: ContextEnhancer) -> Result<PatternRecognizer> {
        let invalid = |reason: String| VeilError::InvalidPattern {
            name: def.name.clone(),
            reason,
        };

        let entity = EntityType::new(def.entity.as_str()).map_err(invalid)?;
        let language = def
            .language
            .as_deref()
            .map(LanguageCode::new)
            .transpose()
            .map_err(invalid)?;

        if def.patterns.is_empty() {
            return Err(invalid("recognizer declares no patterns".to_string()));
        }

        let patterns = def
            .patterns
            .iter()
            .map(|p| Pattern::new(format!("{}.{}", def.name, p.name), &p.regex, p.score))
            .collect::<Result<Vec<_>>>()?;

        let mut recognizer = PatternRecognizer::new(def.name.as_str(), entity, language, patterns);
        if let Some(validator) = def.validator {
            recognizer = recognizer.with_validator(validator);
        }
        if !def.context.is_empty() {
            recognizer = recognizer.with_context(def.context.clone(), enhancer);
        }

        Ok(recognizer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anonymization::recognizer::Recognizer;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn build_default() -> Vec<PatternRecognizer> {
        PatternLibrary::default_library()
            .unwrap()
            .build(ContextEnhancer::default())
            .unwrap()
    }

    fn find<'a>(recognizers: &'a [PatternRecognizer], name: &str) -> &'a PatternRecognizer {
        recognizers
            .iter()
            .find(|r| r.name() == name)
            .unwrap_or_else(|| panic!("missing recognizer {name}"))
    }

    #[test]
    fn test_load_default_library() {
        let recognizers = build_default();
        assert!(!recognizers.is_empty());

        let el = LanguageCode::new("el").unwrap();
        assert!(recognizers.iter().any(|r| r.supports_language(&el)));
    }

    #[test]
    fn test_email_pattern() {
        let recognizers = build_default();
        let email = find(&recognizers, "email_en");

        let spans = email.detect_sync("mail me at john.doe@example.com today").unwrap();
        assert_eq!(spans.len(), 1);
        assert!(email.detect_sync("not-an-email").unwrap().is_empty());
    }

    #[test]
    fn test_ip_pattern_rejects_invalid_address() {
        let recognizers = build_default();
        let ip = find(&recognizers, "ip_en");

        let text = "server 192.168.1.1 and 12:30:45";
        let spans = ip.detect_sync(text).unwrap();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text(text), Some("192.168.1.1"));
        assert_eq!(spans[0].score, 1.0);
    }

    #[test]
    fn test_iban_pattern() {
        let recognizers = build_default();
        let iban = find(&recognizers, "iban_el");

        let text = "IBAN: GR16 0110 1250 0000 0001 2300 695";
        let spans = iban.detect_sync(text).unwrap();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text(text), Some("GR16 0110 1250 0000 0001 2300 695"));
    }

    #[test]
    fn test_credit_card_pattern() {
        let recognizers = build_default();
        let card = find(&recognizers, "credit_card_en");

        let text = "card 4111-1111-1111-1111 and 4111-1111-1111-1112";
        let spans = card.detect_sync(text).unwrap();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text(text), Some("4111-1111-1111-1111"));
    }

    #[test]
    fn test_phones_pattern() {
        let recognizers = build_default();
        let phones = find(&recognizers, "phones_el");

        let text = "Καλέστε στο +306912345678 ή 00306912345678";
        let spans = phones.detect_sync(text).unwrap();
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].score, 0.9);
    }

    #[test]
    fn test_invalid_regex_in_library() {
        let toml = r#"
            [[recognizer]]
            name = "broken"
            entity = "X"
            [[recognizer.patterns]]
            name = "bad"
            regex = "(unclosed"
            score = 0.5
        "#;
        let library = PatternLibrary::from_toml(toml).unwrap();
        let err = library.build(ContextEnhancer::default()).unwrap_err();
        assert!(matches!(err, VeilError::InvalidPattern { .. }));
    }

    #[test]
    fn test_recognizer_without_patterns_rejected() {
        let toml = r#"
            [[recognizer]]
            name = "empty"
            entity = "X"
            patterns = []
        "#;
        let library = PatternLibrary::from_toml(toml).unwrap();
        assert!(library.build(ContextEnhancer::default()).is_err());
    }

    #[test]
    fn test_from_file_and_extend() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [[recognizer]]
            name = "ticket"
            entity = "TICKET_ID"
            [[recognizer.patterns]]
            name = "ticket"
            regex = 'TCK-\d{{6}}'
            score = 0.7
            "#
        )
        .unwrap();

        let mut library = PatternLibrary::default_library().unwrap();
        let before = library.definitions().len();
        library.extend(PatternLibrary::from_file(file.path()).unwrap());
        assert_eq!(library.definitions().len(), before + 1);

        let recognizers = library.build(ContextEnhancer::default()).unwrap();
        let ticket = find(&recognizers, "ticket");
        assert!(ticket.supported_language().is_none());
        assert_eq!(ticket.detect_sync("see TCK-123456").unwrap().len(), 1);
    }

    #[test]
    fn test_missing_file() {
        assert!(PatternLibrary::from_file("/nonexistent/library.toml").is_err());
    }
}
