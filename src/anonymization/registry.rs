//! Recognizer registry

use super::recognizer::Recognizer;
use crate::domain::{EntityType, LanguageCode, Result, VeilError};
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

/// Ordered collection of recognizers
///
/// Registration order is kept: it decides the order in which raw spans are
/// concatenated and breaks ties during conflict resolution.
#[derive(Default, Clone)]
pub struct RecognizerRegistry {
    recognizers: Vec<Arc<dyn Recognizer>>,
    names: HashSet<String>,
}

impl RecognizerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a recognizer
    ///
    /// Fails when a recognizer with the same name is already registered.
    pub fn register(&mut self, recognizer: Arc<dyn Recognizer>) -> Result<()> {
        let name = recognizer.name().to_string();
        if !self.names.insert(name.clone()) {
            return Err(VeilError::Configuration(format!(
                "Duplicate recognizer name '{name}'"
            )));
        }

        tracing::debug!(
            recognizer = %name,
            language = recognizer.supported_language().map(|l| l.as_str()).unwrap_or("*"),
            order = self.recognizers.len(),
            "Registered recognizer"
        );
        self.recognizers.push(recognizer);
        Ok(())
    }

    /// Recognizers that run for `language` and emit at least one entity in
    /// `entities`, paired with their registration index
    pub fn applicable(
        &self,
        language: &LanguageCode,
        entities: &[EntityType],
    ) -> Vec<(usize, Arc<dyn Recognizer>)> {
        self.recognizers
            .iter()
            .enumerate()
            .filter(|(_, r)| r.supports_language(language))
            .filter(|(_, r)| r.supported_entities().iter().any(|e| entities.contains(e)))
            .map(|(i, r)| (i, Arc::clone(r)))
            .collect()
    }

    /// Entity types detectable for `language`
    pub fn supported_entities(&self, language: &LanguageCode) -> BTreeSet<EntityType> {
        self.recognizers
            .iter()
            .filter(|r| r.supports_language(language))
            .flat_map(|r| r.supported_entities().iter().cloned())
            .collect()
    }

    /// Languages with at least one language-specific recognizer
    pub fn supported_languages(&self) -> BTreeSet<LanguageCode> {
        self.recognizers
            .iter()
            .filter_map(|r| r.supported_language().cloned())
            .collect()
    }

    /// Names in registration order
    pub fn names(&self) -> Vec<&str> {
        self.recognizers.iter().map(|r| r.name()).collect()
    }

    /// Number of registered recognizers
    pub fn len(&self) -> usize {
        self.recognizers.len()
    }

    /// Whether no recognizer is registered
    pub fn is_empty(&self) -> bool {
        self.recognizers.is_empty()
    }
}

impl std::fmt::Debug for RecognizerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecognizerRegistry")
            .field("recognizers", &self.names())
            .finish()
    }
}
