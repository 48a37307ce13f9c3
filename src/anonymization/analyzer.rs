//! Analyzer: runs recognizers and collects raw spans

use super::config::AnalyzerConfig;
use super::models::Span;
use super::registry::RecognizerRegistry;
use crate::domain::{EntityType, LanguageCode, RecognizerError, Result, VeilError};
use futures::future::join_all;
use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;

/// Runs every applicable recognizer over a text
#[derive(Debug, Clone)]
pub struct Analyzer {
    registry: Arc<RecognizerRegistry>,
    append_terminator: bool,
    terminator: String,
    score_threshold: f64,
    recognizer_timeout: Duration,
}

impl Analyzer {
    /// Create an analyzer over a shared registry
    pub fn new(registry: Arc<RecognizerRegistry>, config: &AnalyzerConfig) -> Self {
        Self {
            registry,
            append_terminator: config.append_terminator,
            terminator: config.terminator.clone(),
            score_threshold: config.score_threshold,
            recognizer_timeout: config.recognizer_timeout(),
        }
    }

    /// The registry this analyzer draws recognizers from
    pub fn registry(&self) -> &RecognizerRegistry {
        &self.registry
    }

    /// Detect raw spans in `text`
    ///
    /// Returns spans in registration order of their recognizers, restricted to
    /// `entities` and clamped to `text`. Fails with `RecognizerUnavailable` if
    /// any applicable recognizer errors or exceeds the timeout; no spans are
    /// returned in that case.
    pub async fn analyze(
        &self,
        text: &str,
        language: &LanguageCode,
        entities: &[EntityType],
    ) -> Result<Vec<Span>> {
        let recognizers = self.registry.applicable(language, entities);
        if recognizers.is_empty() || text.is_empty() {
            return Ok(Vec::new());
        }

        let detection_text = self.detection_text(text);
        let timeout_ms = self.recognizer_timeout.as_millis() as u64;

        let runs = recognizers.iter().map(|(_, recognizer)| {
            let detection_text = detection_text.as_ref();
            async move {
                match tokio::time::timeout(
                    self.recognizer_timeout,
                    recognizer.detect(detection_text, language),
                )
                .await
                {
                    Ok(result) => result,
                    Err(_) => Err(RecognizerError::Timeout(timeout_ms)),
                }
            }
        });
        let results = join_all(runs).await;

        let mut raw = Vec::new();
        for ((order, recognizer), result) in recognizers.iter().zip(results) {
            let spans = result.map_err(|e| {
                tracing::error!(
                    recognizer = %recognizer.name(),
                    language = %language,
                    error = %e,
                    "Recognizer failed; aborting request"
                );
                VeilError::recognizer_unavailable(recognizer.name(), e)
            })?;

            raw.extend(
                spans
                    .into_iter()
                    .filter(|span| entities.contains(&span.entity_type))
                    .filter(|span| is_well_formed(span, &detection_text, recognizer.name()))
                    .filter_map(|span| clamp(span, text.len()))
                    .filter(|span| span.score >= self.score_threshold)
                    .map(|span| span.with_registration_order(*order)),
            );
        }

        tracing::debug!(
            language = %language,
            recognizers = recognizers.len(),
            spans = raw.len(),
            "Analysis complete"
        );

        Ok(raw)
    }

    /// Text handed to recognizers
    fn detection_text<'a>(&self, text: &'a str) -> Cow<'a, str> {
        if self.append_terminator && !text.ends_with(self.terminator.as_str()) {
            Cow::Owned(format!("{text}{}", self.terminator))
        } else {
            Cow::Borrowed(text)
        }
    }
}

/// Offsets in bounds, on char boundaries, non-empty, score in [0, 1]
fn is_well_formed(span: &Span, text: &str, recognizer: &str) -> bool {
    let valid = span.start < span.end
        && span.end <= text.len()
        && text.is_char_boundary(span.start)
        && text.is_char_boundary(span.end)
        && (0.0..=1.0).contains(&span.score);

    if !valid {
        tracing::warn!(
            recognizer = %recognizer,
            entity_type = %span.entity_type,
            start = span.start,
            end = span.end,
            score = span.score,
            "Discarding malformed span"
        );
    }
    valid
}

/// Drop spans starting at or past `len`; truncate spans ending past it
fn clamp(mut span: Span, len: usize) -> Option<Span> {
    if span.start >= len {
        return None;
    }
    span.end = span.end.min(len);
    Some(span)
}
