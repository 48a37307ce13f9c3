//! Regex-based PII recognizer

use super::{context::ContextEnhancer, validators::Validator, Recognizer};
use crate::anonymization::models::Span;
use crate::domain::{EntityType, LanguageCode, RecognizerError, Result, VeilError};
use async_trait::async_trait;
use fancy_regex::Regex;

/// One compiled pattern with its fixed score
#[derive(Debug, Clone)]
pub struct Pattern {
    /// Pattern name, used in diagnostics
    pub name: String,
    /// Compiled regex (lookaround allowed)
    pub regex: Regex,
    /// Score assigned to every match
    pub score: f64,
}

impl Pattern {
    /// Compile a pattern, rejecting bad regexes and scores outside [0, 1]
    pub fn new(name: impl Into<String>, regex: &str, score: f64) -> Result<Self> {
        let name = name.into();
        if !(0.0..=1.0).contains(&score) {
            return Err(VeilError::InvalidPattern {
                name,
                reason: format!("score {score} is outside [0.0, 1.0]"),
            });
        }
        let regex = Regex::new(regex).map_err(|e| VeilError::InvalidPattern {
            name: name.clone(),
            reason: e.to_string(),
        })?;
        Ok(Self { name, regex, score })
    }
}

/// Regex-based recognizer for a single entity type
pub struct PatternRecognizer {
    name: String,
    entities: Vec<EntityType>,
    language: Option<LanguageCode>,
    patterns: Vec<Pattern>,
    validator: Option<Validator>,
    context: Vec<String>,
    enhancer: ContextEnhancer,
}

impl PatternRecognizer {
    /// Create a new pattern recognizer
    pub fn new(
        name: impl Into<String>,
        entity: EntityType,
        language: Option<LanguageCode>,
        patterns: Vec<Pattern>,
    ) -> Self {
        Self {
            name: name.into(),
            entities: vec![entity],
            language,
            patterns,
            validator: None,
            context: Vec::new(),
            enhancer: ContextEnhancer::default(),
        }
    }

    /// Validate every match; valid matches score 1.0, invalid ones are dropped
    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Context words that raise the score when found before a match
    pub fn with_context(mut self, words: Vec<String>, enhancer: ContextEnhancer) -> Self {
        self.context = words.into_iter().map(|w| w.to_lowercase()).collect();
        self.enhancer = enhancer;
        self
    }

    /// The single entity type this recognizer emits
    pub fn entity(&self) -> &EntityType {
        &self.entities[0]
    }

    /// Compiled patterns
    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    /// Run every pattern over `text`
    pub fn detect_sync(&self, text: &str) -> std::result::Result<Vec<Span>, RecognizerError> {
        let mut spans = Vec::new();

        for pattern in &self.patterns {
            for found in pattern.regex.find_iter(text) {
                let matched = found.map_err(|e| RecognizerError::PatternFailed {
                    pattern: pattern.name.clone(),
                    message: e.to_string(),
                })?;
                if matched.start() == matched.end() {
                    continue;
                }

                let mut score = pattern.score;
                if let Some(validator) = self.validator {
                    if !validator.validate(matched.as_str()) {
                        continue;
                    }
                    score = 1.0;
                }
                score = self
                    .enhancer
                    .enhance(text, matched.start(), score, &self.context);

                spans.push(Span::new(
                    self.entity().clone(),
                    matched.start(),
                    matched.end(),
                    score,
                    self.name.as_str(),
                ));
            }
        }

        Ok(spans)
    }
}

#[async_trait]
impl Recognizer for PatternRecognizer {
    fn name(&self) -> &str {
        &self.name
    }

    fn supported_language(&self) -> Option<&LanguageCode> {
        self.language.as_ref()
    }

    fn supported_entities(&self) -> &[EntityType] {
        &self.entities
    }

    async fn detect(
        &self,
        text: &str,
        _language: &LanguageCode,
    ) -> std::result::Result<Vec<Span>, RecognizerError> {
        self.detect_sync(text)
    }
}

impl std::fmt::Debug for PatternRecognizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatternRecognizer")
            .field("name", &self.name)
            .field("entity", self.entity())
            .field("language", &self.language)
            .field("patterns", &self.patterns.len())
            .field("validator", &self.validator)
            .finish()
    }
}
