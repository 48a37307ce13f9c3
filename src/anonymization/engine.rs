//! Main anonymization engine
//!
//! This module provides the [`AnonymizationEngine`] that runs the request
//! pipeline: detection, conflict resolution, rewriting and audit logging.
//!
//! # Architecture
//!
//! The engine is built once and shared. It owns:
//! - **Registry**: pattern recognizers from the pattern library, plus one
//!   model-backed recognizer per configured model language
//! - **Operator tables**: the `redact` and `synthetic` presets with overrides
//! - **Audit Logger**: records redactions with hashed values
//!
//! # Examples
//!
//! ```no_run
//! use veil::anonymization::{AnonymizationEngine, config::AnonymizationConfig};
//! use veil::anonymization::models::AnonymizeRequest;
//! use veil::domain::LanguageCode;
//!
//! # async fn example() -> veil::domain::Result<()> {
//! let engine = AnonymizationEngine::new(AnonymizationConfig::default())?;
//!
//! let request = AnonymizeRequest::new(
//!     LanguageCode::new("en").unwrap(),
//!     "Mail john.doe@example.com from 192.168.1.1",
//! );
//! let result = engine.anonymize(request).await?;
//! assert_eq!(result.output_text, "Mail HIDDEN_EMAIL from 192.16*****");
//! # Ok(())
//! # }
//! ```

use crate::anonymization::{
    analyzer::Analyzer,
    audit::{AuditLogEntry, AuditLogger},
    config::AnonymizationConfig,
    models::{AnalysisResult, AnonymizeRequest, AnonymizedText, OperatorPreset, ReportedSpan, Span},
    offset::OffsetMap,
    operators::OperatorTable,
    recognizer::{ContextEnhancer, HttpEntityModel, ModelRecognizer, PatternLibrary},
    registry::RecognizerRegistry,
    resolver::resolve,
    rewriter::rewrite,
};
use crate::domain::{EntityType, LanguageCode, Result, VeilError};
use futures::future::join_all;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;

/// Main anonymization engine
///
/// # Thread Safety
///
/// All state is immutable after construction; share the engine with `Arc`.
/// Each request uses its own random number generator.
pub struct AnonymizationEngine {
    analyzer: Analyzer,
    redact: OperatorTable,
    synthetic: OperatorTable,
    default_entities: Vec<EntityType>,
    default_language: LanguageCode,
    languages: BTreeSet<LanguageCode>,
    audit_logger: AuditLogger,
}

impl AnonymizationEngine {
    /// Create a new anonymization engine
    ///
    /// Builds the recognizer registry from the pattern library (embedded
    /// defaults plus an optional user file) and the optional model endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration validation fails
    /// - The pattern library cannot be loaded or contains invalid patterns
    /// - Two recognizers share a name
    /// - Audit logger initialization fails
    pub fn new(config: AnonymizationConfig) -> Result<Self> {
        let registry = Self::build_registry(&config)?;
        Self::with_registry(config, registry)
    }

    /// Create an engine over an already populated registry
    pub fn with_registry(config: AnonymizationConfig, registry: RecognizerRegistry) -> Result<Self> {
        config
            .validate()
            .map_err(|e| VeilError::Configuration(format!("{e:#}")))?;

        if registry.is_empty() {
            return Err(VeilError::Configuration(
                "No recognizers registered".to_string(),
            ));
        }

        let redact = OperatorTable::from_config(OperatorPreset::Redact, &config.operators)?;
        let synthetic = OperatorTable::from_config(OperatorPreset::Synthetic, &config.operators)?;

        let default_entities = config
            .analyzer
            .entity_types()
            .map_err(|e| VeilError::Configuration(e.to_string()))?;
        let default_language = config
            .analyzer
            .language()
            .map_err(|e| VeilError::Configuration(e.to_string()))?;

        let audit_logger = AuditLogger::from_config(&config.audit)
            .map_err(|e| VeilError::Configuration(format!("{e:#}")))?;

        let languages = registry.supported_languages();
        tracing::info!(
            recognizers = registry.len(),
            languages = ?languages.iter().map(|l| l.as_str()).collect::<Vec<_>>(),
            "Anonymization engine ready"
        );

        Ok(Self {
            analyzer: Analyzer::new(Arc::new(registry), &config.analyzer),
            redact,
            synthetic,
            default_entities,
            default_language,
            languages,
            audit_logger,
        })
    }

    fn build_registry(config: &AnonymizationConfig) -> Result<RecognizerRegistry> {
        let mut library = if config.patterns.include_defaults {
            PatternLibrary::default_library()?
        } else {
            PatternLibrary::default()
        };

        if let Some(ref path) = config.patterns.library {
            let user = PatternLibrary::from_file(path)
                .map_err(|e| VeilError::Configuration(format!("{e:#}")))?;
            library.extend(user);
        }

        let enhancer: ContextEnhancer = config.analyzer.context;
        let mut registry = RecognizerRegistry::new();
        for recognizer in library.build(enhancer)? {
            registry.register(Arc::new(recognizer))?;
        }

        if let Some(ref model_config) = config.model {
            let model = Arc::new(HttpEntityModel::new(
                model_config.endpoint.as_str(),
                model_config.timeout(),
            )?);
            let languages = model_config
                .language_codes()
                .map_err(|e| VeilError::Configuration(e.to_string()))?;

            for language in languages {
                let mut recognizer = ModelRecognizer::new(
                    format!("model_{language}"),
                    language,
                    model.clone(),
                )
                .with_default_score(model_config.default_score);
                for label in &model_config.ignored_labels {
                    recognizer = recognizer.ignore_label(label.as_str());
                }
                registry.register(Arc::new(recognizer))?;
            }
        }

        Ok(registry)
    }

    /// Detect and resolve spans without rewriting
    ///
    /// Spans are reported in character offsets of the request text.
    pub async fn analyze(&self, request: &AnonymizeRequest) -> Result<AnalysisResult> {
        let entities = self.requested_entities(request);
        self.ensure_language(&request.language)?;

        let (raw_count, spans) = self.detect(request, &entities).await?;
        let reported = report_spans(&request.text, &spans)?;

        Ok(AnalysisResult {
            language: request.language.clone(),
            sources: spans.iter().map(|s| s.source.clone()).collect(),
            spans: reported,
            raw_span_count: raw_count,
        })
    }

    /// Anonymize one request
    ///
    /// Uses a freshly seeded random number generator for generated values.
    pub async fn anonymize(&self, request: AnonymizeRequest) -> Result<AnonymizedText> {
        let mut rng = StdRng::from_entropy();
        self.anonymize_with_rng(request, &mut rng).await
    }

    /// Anonymize one request with a caller-supplied random number generator
    ///
    /// # Errors
    ///
    /// Fails closed: no output text is produced when an entity type lacks an
    /// operator rule, the language is unsupported, or a recognizer fails.
    pub async fn anonymize_with_rng<R: RngCore + Send>(
        &self,
        request: AnonymizeRequest,
        rng: &mut R,
    ) -> Result<AnonymizedText> {
        let start = Instant::now();
        let table = self.operator_table(request.preset);
        let entities = self.requested_entities(&request);

        table.ensure_covers(&entities)?;
        self.ensure_language(&request.language)?;

        let (_, spans) = self.detect(&request, &entities).await?;
        let rewritten = rewrite(&request.text, &spans, table, rng)?;

        let processing_time_ms = start.elapsed().as_millis() as u64;
        tracing::info!(
            language = %request.language,
            preset = %request.preset,
            redactions = spans.len(),
            processing_time_ms = processing_time_ms,
            "Text anonymized"
        );

        if self.audit_logger.is_enabled() {
            let entry = AuditLogEntry::new(
                &request.text,
                &spans,
                table,
                &request.language,
                request.preset,
                processing_time_ms,
            );
            self.audit_logger
                .log_redaction(&entry)
                .map_err(|e| VeilError::Io(format!("{e:#}")))?;
        }

        let spans = if request.return_spans {
            Some(report_spans(&rewritten.text, &rewritten.spans)?)
        } else {
            None
        };

        Ok(AnonymizedText {
            output_text: rewritten.text,
            spans,
        })
    }

    /// Anonymize a batch of requests concurrently
    ///
    /// Each request succeeds or fails on its own; a failed request yields its
    /// error, never its original text.
    pub async fn anonymize_batch(
        &self,
        requests: Vec<AnonymizeRequest>,
    ) -> Vec<Result<AnonymizedText>> {
        let results = join_all(requests.into_iter().map(|r| self.anonymize(r))).await;

        let failed = results.iter().filter(|r| r.is_err()).count();
        if failed > 0 {
            tracing::warn!(
                total = results.len(),
                failed = failed,
                "Some requests in batch failed"
            );
        }

        results
    }

    /// Operator table for a preset
    pub fn operator_table(&self, preset: OperatorPreset) -> &OperatorTable {
        match preset {
            OperatorPreset::Redact => &self.redact,
            OperatorPreset::Synthetic => &self.synthetic,
        }
    }

    /// Languages with at least one recognizer
    pub fn supported_languages(&self) -> &BTreeSet<LanguageCode> {
        &self.languages
    }

    /// Entity types detectable for a language
    pub fn supported_entities(&self, language: &LanguageCode) -> BTreeSet<EntityType> {
        self.analyzer.registry().supported_entities(language)
    }

    /// Names of registered recognizers, in registration order
    pub fn recognizer_names(&self) -> Vec<&str> {
        self.analyzer.registry().names()
    }

    /// Language used when none is given
    pub fn default_language(&self) -> &LanguageCode {
        &self.default_language
    }

    /// Entity set used when a request names none
    pub fn default_entities(&self) -> &[EntityType] {
        &self.default_entities
    }

    fn requested_entities(&self, request: &AnonymizeRequest) -> Vec<EntityType> {
        request
            .entities
            .clone()
            .unwrap_or_else(|| self.default_entities.clone())
    }

    fn ensure_language(&self, language: &LanguageCode) -> Result<()> {
        if self.languages.contains(language) {
            Ok(())
        } else {
            Err(VeilError::UnsupportedLanguage(language.to_string()))
        }
    }

    /// Raw span count and resolved spans in input byte offsets
    async fn detect(
        &self,
        request: &AnonymizeRequest,
        entities: &[EntityType],
    ) -> Result<(usize, Vec<Span>)> {
        let raw = self
            .analyzer
            .analyze(&request.text, &request.language, entities)
            .await?;
        let raw_count = raw.len();
        let resolved = resolve(raw);

        tracing::debug!(
            language = %request.language,
            raw_spans = raw_count,
            resolved_spans = resolved.len(),
            "Spans resolved"
        );

        Ok((raw_count, resolved))
    }
}

impl std::fmt::Debug for AnonymizationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnonymizationEngine")
            .field("analyzer", &self.analyzer)
            .field("languages", &self.languages)
            .field("default_language", &self.default_language)
            .finish()
    }
}

/// Convert byte-offset spans of `text` to character-offset reports
fn report_spans(text: &str, spans: &[Span]) -> Result<Vec<ReportedSpan>> {
    let offsets = OffsetMap::new(text);
    spans
        .iter()
        .map(|span| {
            let (start, end) = offsets.bytes_to_chars(span.start, span.end).ok_or_else(|| {
                VeilError::Validation(format!(
                    "span {}..{} is not on character boundaries",
                    span.start, span.end
                ))
            })?;
            Ok(ReportedSpan {
                entity_type: span.entity_type.clone(),
                start,
                end,
                score: span.score,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lang(code: &str) -> LanguageCode {
        LanguageCode::new(code).unwrap()
    }

    fn engine() -> AnonymizationEngine {
        AnonymizationEngine::new(AnonymizationConfig::default()).unwrap()
    }

    #[test]
    fn test_engine_creation() {
        let engine = engine();
        assert!(engine.supported_languages().contains(&lang("en")));
        assert!(engine.supported_languages().contains(&lang("el")));
        assert_eq!(engine.default_language().as_str(), "en");
    }

    #[tokio::test]
    async fn test_anonymize_redact() {
        let engine = engine();
        let request = AnonymizeRequest::new(lang("en"), "Mail john.doe@example.com from 192.168.1.1");
        let result = engine.anonymize(request).await.unwrap();
        assert_eq!(result.output_text, "Mail HIDDEN_EMAIL from 192.16*****");
        assert!(result.spans.is_none());
    }

    #[tokio::test]
    async fn test_unsupported_language() {
        let engine = engine();
        let request = AnonymizeRequest::new(lang("fr"), "Bonjour");
        let err = engine.anonymize(request).await.unwrap_err();
        assert!(matches!(err, VeilError::UnsupportedLanguage(ref l) if l == "fr"));
    }

    #[tokio::test]
    async fn test_missing_rule_fails_before_detection() {
        let engine = engine();
        let request = AnonymizeRequest::new(lang("en"), "nothing to see")
            .with_entities(vec![EntityType::new("PASSPORT").unwrap()]);
        let err = engine.anonymize(request).await.unwrap_err();
        assert!(matches!(err, VeilError::MissingOperatorRule { .. }));
    }

    #[tokio::test]
    async fn test_analyze_reports_char_offsets() {
        let engine = engine();
        let text = "Το μειλ μου είναι maria@example.gr";
        let request = AnonymizeRequest::new(lang("el"), text);
        let result = engine.analyze(&request).await.unwrap();

        assert_eq!(result.spans.len(), 1);
        let span = &result.spans[0];
        let found: String = text.chars().skip(span.start).take(span.end - span.start).collect();
        assert_eq!(found, "maria@example.gr");
        assert_eq!(result.sources, vec!["email_el".to_string()]);
    }
}
