//! Domain error types
//!
//! This module defines the error hierarchy for Veil.
//! All errors are domain-specific and don't expose third-party types.

use thiserror::Error;

/// Main Veil error type
///
/// This is the primary error type used throughout the library. Operator and
/// availability errors abort the request: no partial output is ever returned
/// alongside them.
#[derive(Debug, Error)]
pub enum VeilError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A pattern in a recognizer library failed to compile or is inconsistent
    #[error("Invalid pattern '{name}': {reason}")]
    InvalidPattern { name: String, reason: String },

    /// No operator rule is configured for an entity type in scope
    #[error("No operator rule configured for entity type '{entity_type}'")]
    MissingOperatorRule { entity_type: String },

    /// A recognizer failed or timed out; detection would be incomplete
    #[error("Recognizer '{recognizer}' unavailable: {source}")]
    RecognizerUnavailable {
        recognizer: String,
        #[source]
        source: RecognizerError,
    },

    /// The request language has no registered recognizers
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

impl VeilError {
    /// Builds a `RecognizerUnavailable` error for the named recognizer
    pub fn recognizer_unavailable(recognizer: impl Into<String>, source: RecognizerError) -> Self {
        Self::RecognizerUnavailable {
            recognizer: recognizer.into(),
            source,
        }
    }

    /// Whether this error was caused by configuration rather than input or I/O
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::Configuration(_) | Self::InvalidPattern { .. } | Self::MissingOperatorRule { .. }
        )
    }
}

/// Recognizer-level failures
///
/// Errors raised while a single recognizer runs. The analyzer wraps them in
/// [`VeilError::RecognizerUnavailable`] together with the recognizer name.
#[derive(Debug, Error)]
pub enum RecognizerError {
    /// The recognizer did not answer within the per-request budget
    #[error("timed out after {0} ms")]
    Timeout(u64),

    /// Failed to reach an out-of-process model
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The model answered with something we cannot interpret
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Server error (5xx)
    #[error("server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    /// Client error (4xx)
    #[error("client error: {status} - {message}")]
    ClientError { status: u16, message: String },

    /// Regex engine failure while scanning (e.g. backtrack limit)
    #[error("pattern '{pattern}' failed: {message}")]
    PatternFailed { pattern: String, message: String },
}

// Conversion from std::io::Error
impl From<std::io::Error> for VeilError {
    fn from(err: std::io::Error) -> Self {
        VeilError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for VeilError {
    fn from(err: serde_json::Error) -> Self {
        VeilError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for VeilError {
    fn from(err: toml::de::Error) -> Self {
        VeilError::Configuration(format!("TOML parse error: {err}"))
    }
}
