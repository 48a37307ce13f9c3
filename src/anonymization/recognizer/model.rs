//! Model-backed recognizer
//!
//! PERSON, LOCATION and DATE_TIME have no useful regular form; they come from
//! an external named-entity model. [`EntityModel`] is the seam to that model,
//! [`HttpEntityModel`] talks to one over JSON/HTTP, and [`ModelRecognizer`]
//! adapts its labels and character offsets to [`Span`]s.

use super::Recognizer;
use crate::anonymization::models::Span;
use crate::anonymization::offset::OffsetMap;
use crate::domain::{EntityType, LanguageCode, RecognizerError, Result, VeilError};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

/// Score used when the model does not report one
pub const DEFAULT_MODEL_SCORE: f64 = 0.85;

/// One entity predicted by a model
///
/// Offsets are half-open character (code point) offsets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelEntity {
    /// Model label (PERSON, GPE, LOC, ...)
    pub label: String,
    /// Start character offset
    pub start: usize,
    /// End character offset (exclusive)
    pub end: usize,
    /// Model confidence, if reported
    #[serde(default)]
    pub score: Option<f64>,
}

/// Named-entity model consumed as a black box
#[async_trait]
pub trait EntityModel: Send + Sync {
    /// Model name, used in diagnostics
    fn name(&self) -> &str;

    /// Predict entities in `text`
    async fn predict(
        &self,
        text: &str,
        language: &LanguageCode,
    ) -> std::result::Result<Vec<ModelEntity>, RecognizerError>;
}

#[derive(Debug, Serialize)]
struct PredictRequest<'a> {
    text: &'a str,
    language: &'a str,
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    entities: Vec<ModelEntity>,
}

/// JSON-over-HTTP entity model
///
/// Sends `POST {endpoint}` with `{"text", "language"}` and expects
/// `{"entities": [{"label", "start", "end", "score"}]}` back.
pub struct HttpEntityModel {
    endpoint: String,
    client: Client,
    timeout: Duration,
}

impl HttpEntityModel {
    /// Create a client for `endpoint`
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let endpoint = endpoint.into();
        url::Url::parse(&endpoint).map_err(|e| {
            VeilError::Configuration(format!("Invalid model endpoint '{endpoint}': {e}"))
        })?;

        let client = ClientBuilder::new()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| VeilError::Configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            endpoint,
            client,
            timeout,
        })
    }

    /// Model endpoint URL
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl EntityModel for HttpEntityModel {
    fn name(&self) -> &str {
        &self.endpoint
    }

    async fn predict(
        &self,
        text: &str,
        language: &LanguageCode,
    ) -> std::result::Result<Vec<ModelEntity>, RecognizerError> {
        let body = PredictRequest {
            text,
            language: language.as_str(),
        };

        let resp = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RecognizerError::Timeout(self.timeout.as_millis() as u64)
                } else {
                    RecognizerError::ConnectionFailed(e.to_string())
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(if status.is_server_error() {
                RecognizerError::ServerError {
                    status: status.as_u16(),
                    message,
                }
            } else {
                RecognizerError::ClientError {
                    status: status.as_u16(),
                    message,
                }
            });
        }

        let parsed: PredictResponse = resp
            .json()
            .await
            .map_err(|e| RecognizerError::InvalidResponse(e.to_string()))?;

        tracing::debug!(
            endpoint = %self.endpoint,
            entities = parsed.entities.len(),
            "Model prediction received"
        );

        Ok(parsed.entities)
    }
}

/// Recognizer adapting an [`EntityModel`] to the recognizer interface
pub struct ModelRecognizer {
    name: String,
    language: LanguageCode,
    model: Arc<dyn EntityModel>,
    labels: HashMap<String, EntityType>,
    ignored: HashSet<String>,
    entities: Vec<EntityType>,
    default_score: f64,
}

impl ModelRecognizer {
    /// Create a recognizer with the standard label mapping
    ///
    /// PERSON/PER map to PERSON, GPE/LOC/FAC to LOCATION and DATE/TIME to
    /// DATE_TIME. NORP is ignored.
    pub fn new(name: impl Into<String>, language: LanguageCode, model: Arc<dyn EntityModel>) -> Self {
        let mut recognizer = Self {
            name: name.into(),
            language,
            model,
            labels: HashMap::new(),
            ignored: HashSet::new(),
            entities: Vec::new(),
            default_score: DEFAULT_MODEL_SCORE,
        };

        for (label, entity) in [
            ("PERSON", "PERSON"),
            ("PER", "PERSON"),
            ("GPE", "LOCATION"),
            ("LOC", "LOCATION"),
            ("FAC", "LOCATION"),
            ("DATE", "DATE_TIME"),
            ("TIME", "DATE_TIME"),
        ] {
            if let Ok(entity) = EntityType::new(entity) {
                recognizer = recognizer.with_label(label, entity);
            }
        }
        recognizer.ignored.insert("NORP".to_string());
        recognizer
    }

    /// Map a model label to an entity type
    pub fn with_label(mut self, label: impl Into<String>, entity: EntityType) -> Self {
        let label = label.into().to_uppercase();
        self.ignored.remove(&label);
        if !self.entities.contains(&entity) {
            self.entities.push(entity.clone());
        }
        self.labels.insert(label, entity);
        self
    }

    /// Drop spans carrying this model label
    pub fn ignore_label(mut self, label: impl Into<String>) -> Self {
        let label = label.into().to_uppercase();
        self.labels.remove(&label);
        self.ignored.insert(label);
        self.entities = self.labels.values().fold(Vec::new(), |mut acc, e| {
            if !acc.contains(e) {
                acc.push(e.clone());
            }
            acc
        });
        self.entities.sort();
        self
    }

    /// Score used when the model reports none
    pub fn with_default_score(mut self, score: f64) -> Self {
        self.default_score = score.clamp(0.0, 1.0);
        self
    }

    fn to_span(&self, entity: &ModelEntity, offsets: &OffsetMap) -> Option<Span> {
        let label = entity.label.to_uppercase();
        if self.ignored.contains(&label) {
            return None;
        }
        let Some(entity_type) = self.labels.get(&label) else {
            tracing::debug!(
                recognizer = %self.name,
                label = %entity.label,
                "Skipping unmapped model label"
            );
            return None;
        };

        let Some((start, end)) = offsets.chars_to_bytes(entity.start, entity.end) else {
            tracing::warn!(
                recognizer = %self.name,
                start = entity.start,
                end = entity.end,
                "Model returned offsets outside the text"
            );
            return None;
        };

        Some(Span::new(
            entity_type.clone(),
            start,
            end,
            entity.score.unwrap_or(self.default_score),
            self.name.as_str(),
        ))
    }
}

#[async_trait]
impl Recognizer for ModelRecognizer {
    fn name(&self) -> &str {
        &self.name
    }

    fn supported_language(&self) -> Option<&LanguageCode> {
        Some(&self.language)
    }

    fn supported_entities(&self) -> &[EntityType] {
        &self.entities
    }

    async fn detect(
        &self,
        text: &str,
        language: &LanguageCode,
    ) -> std::result::Result<Vec<Span>, RecognizerError> {
        let predicted = self.model.predict(text, language).await?;
        let offsets = OffsetMap::new(text);

        Ok(predicted
            .iter()
            .filter_map(|entity| self.to_span(entity, &offsets))
            .collect())
    }
}
