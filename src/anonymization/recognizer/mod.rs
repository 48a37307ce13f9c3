//! PII recognizers
//!
//! Provides the trait-based recognizer interface and its two families of
//! implementations:
//! - [`pattern::PatternRecognizer`]: regex patterns with fixed scores, optional
//!   checksum validation and context words
//! - [`model::ModelRecognizer`]: delegates to an external NLP model
//!
//! Recognizers hold no mutable state; one instance serves every request.

pub mod context;
pub mod model;
pub mod pattern;
pub mod patterns;
pub mod validators;

use crate::anonymization::models::Span;
use crate::domain::{EntityType, LanguageCode, RecognizerError};
use async_trait::async_trait;

pub use context::ContextEnhancer;
pub use model::{EntityModel, HttpEntityModel, ModelEntity, ModelRecognizer};
pub use pattern::{Pattern, PatternRecognizer};
pub use patterns::PatternLibrary;
pub use validators::Validator;

/// Trait for PII recognizer implementations
#[async_trait]
pub trait Recognizer: Send + Sync {
    /// Unique name, reported as the span source
    fn name(&self) -> &str;

    /// Language this recognizer runs for; `None` means every language
    fn supported_language(&self) -> Option<&LanguageCode>;

    /// Entity types this recognizer can emit
    fn supported_entities(&self) -> &[EntityType];

    /// Detect spans in `text`
    ///
    /// Offsets in the returned spans are byte offsets into `text`. A
    /// recognizer either returns all of its spans or an error, never a
    /// partial list.
    async fn detect(&self, text: &str, language: &LanguageCode)
        -> Result<Vec<Span>, RecognizerError>;

    /// Whether this recognizer runs for `language`
    fn supports_language(&self, language: &LanguageCode) -> bool {
        self.supported_language()
            .map_or(true, |supported| supported == language)
    }
}
