//! Span data models

use crate::domain::{EntityType, LanguageCode};
use serde::{Deserialize, Serialize};

/// One detected occurrence of an entity type in the source text
///
/// Offsets are half-open UTF-8 byte offsets into the text the recognizer was
/// given, always on character boundaries once the analyzer has accepted the
/// span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    /// Entity type (PERSON, EMAIL_ADDRESS, ...)
    pub entity_type: EntityType,
    /// Start byte offset (inclusive)
    pub start: usize,
    /// End byte offset (exclusive)
    pub end: usize,
    /// Confidence score (0.0 - 1.0)
    pub score: f64,
    /// Name of the recognizer that produced the span
    pub source: String,
    /// Registry index of the producing recognizer, used for tie-breaking
    #[serde(skip)]
    pub registration_order: usize,
}

impl Span {
    /// Create a new span
    pub fn new(
        entity_type: EntityType,
        start: usize,
        end: usize,
        score: f64,
        source: impl Into<String>,
    ) -> Self {
        Self {
            entity_type,
            start,
            end,
            score,
            source: source.into(),
            registration_order: 0,
        }
    }

    /// Set the registration order of the producing recognizer
    pub fn with_registration_order(mut self, order: usize) -> Self {
        self.registration_order = order;
        self
    }

    /// Length of the span in bytes
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Whether the span covers no bytes
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Whether two spans share at least one byte
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// The covered substring, if the offsets are valid for `text`
    pub fn text<'a>(&self, text: &'a str) -> Option<&'a str> {
        text.get(self.start..self.end)
    }
}

/// A span as reported to clients
///
/// Offsets are character (code point) offsets so that clients in any language
/// can slice the returned text directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportedSpan {
    pub entity_type: EntityType,
    pub start: usize,
    pub end: usize,
    pub score: f64,
}

/// Detection preset selecting the operator table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatorPreset {
    /// Replace PII with redaction markers (HIDDEN_EMAIL, ANONYMOUS, ...)
    #[default]
    Redact,
    /// Replace PII with plausible dummy values
    Synthetic,
}

impl OperatorPreset {
    /// Preset name as used in configuration files
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Redact => "redact",
            Self::Synthetic => "synthetic",
        }
    }
}

impl std::fmt::Display for OperatorPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One anonymization request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnonymizeRequest {
    /// Language of the text
    pub language: LanguageCode,
    /// Raw text
    pub text: String,
    /// Entity filter; `None` selects the configured default entity set
    #[serde(default)]
    pub entities: Option<Vec<EntityType>>,
    /// Operator preset
    #[serde(default)]
    pub preset: OperatorPreset,
    /// Whether to return the span report
    #[serde(default)]
    pub return_spans: bool,
}

impl AnonymizeRequest {
    /// Create a request with the default entity set and the redact preset
    pub fn new(language: LanguageCode, text: impl Into<String>) -> Self {
        Self {
            language,
            text: text.into(),
            entities: None,
            preset: OperatorPreset::Redact,
            return_spans: false,
        }
    }

    /// Restrict detection to the given entity types
    pub fn with_entities(mut self, entities: Vec<EntityType>) -> Self {
        self.entities = Some(entities);
        self
    }

    /// Select the operator preset
    pub fn with_preset(mut self, preset: OperatorPreset) -> Self {
        self.preset = preset;
        self
    }

    /// Ask for the span report in the output
    pub fn with_spans(mut self) -> Self {
        self.return_spans = true;
        self
    }
}

/// Result of an anonymization request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnonymizedText {
    /// Rewritten text
    pub output_text: String,
    /// Spans in output-text character coordinates, when requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spans: Option<Vec<ReportedSpan>>,
}

/// Result of a detection-only request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Language analyzed
    pub language: LanguageCode,
    /// Resolved spans in input-text character coordinates
    pub spans: Vec<ReportedSpan>,
    /// Recognizer that produced each resolved span, in the same order
    pub sources: Vec<String>,
    /// Number of spans before conflict resolution
    pub raw_span_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(entity: &str, start: usize, end: usize) -> Span {
        Span::new(EntityType::new(entity).unwrap(), start, end, 0.5, "test")
    }

    #[test]
    fn test_overlap() {
        assert!(span("PERSON", 0, 5).overlaps(&span("LOCATION", 3, 8)));
        assert!(!span("PERSON", 0, 5).overlaps(&span("LOCATION", 5, 8)));
        assert!(span("PERSON", 2, 3).overlaps(&span("LOCATION", 0, 8)));
    }

    #[test]
    fn test_span_text() {
        let s = span("PERSON", 0, 5);
        assert_eq!(s.text("Alice lives"), Some("Alice"));
        assert_eq!(span("PERSON", 0, 50).text("short"), None);
        assert_eq!(s.len(), 5);
        assert!(!s.is_empty());
    }

    #[test]
    fn test_registration_order_not_serialized() {
        let s = span("PERSON", 0, 5).with_registration_order(7);
        let json = serde_json::to_value(&s).unwrap();
        assert!(json.get("registration_order").is_none());
        assert_eq!(json["entity_type"], "PERSON");
    }

    #[test]
    fn test_request_builder() {
        let request = AnonymizeRequest::new(LanguageCode::new("en").unwrap(), "text")
            .with_preset(OperatorPreset::Synthetic)
            .with_spans();
        assert_eq!(request.preset, OperatorPreset::Synthetic);
        assert!(request.return_spans);
        assert!(request.entities.is_none());
    }

    #[test]
    fn test_output_omits_missing_spans() {
        let out = AnonymizedText {
            output_text: "x".to_string(),
            spans: None,
        };
        let json = serde_json::to_value(&out).unwrap();
        assert!(json.get("spans").is_none());
    }
}
