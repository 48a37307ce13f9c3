//! Context-word score enhancement
//!
//! A pattern match with low intrinsic confidence (a bare 10-digit number, a
//! generic phone format) becomes much more likely to be PII when a word such
//! as "phone" or "τηλέφωνο" appears just before it.

use serde::{Deserialize, Serialize};

/// Settings for context-word score enhancement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextEnhancer {
    /// Number of words before the span to inspect
    pub window_words: usize,
    /// Amount added to the score when a context word is found
    pub similarity_factor: f64,
    /// Floor for the score when a context word is found
    pub min_score_with_context: f64,
}

impl Default for ContextEnhancer {
    fn default() -> Self {
        Self {
            window_words: 5,
            similarity_factor: 0.35,
            min_score_with_context: 0.4,
        }
    }
}

impl ContextEnhancer {
    /// Return the enhanced score for a span starting at byte `start`
    ///
    /// `context` must hold lower-cased words. A word in the window matches
    /// when it starts with a context word, so inflected forms match their stem.
    pub fn enhance(&self, text: &str, start: usize, score: f64, context: &[String]) -> f64 {
        if context.is_empty() || self.window_words == 0 || score >= 1.0 {
            return score;
        }

        let Some(prefix) = text.get(..start) else {
            return score;
        };

        let found = preceding_words(prefix, self.window_words)
            .iter()
            .any(|word| context.iter().any(|ctx| word.starts_with(ctx.as_str())));

        if found {
            (score + self.similarity_factor)
                .max(self.min_score_with_context)
                .min(1.0)
        } else {
            score
        }
    }
}

/// Up to `limit` lower-cased words immediately before the end of `prefix`
fn preceding_words(prefix: &str, limit: usize) -> Vec<String> {
    prefix
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .rev()
        .take(limit)
        .map(str::to_lowercase)
        .collect()
}
