//! Audit logger for redaction requests

use crate::anonymization::config::AuditConfig;
use crate::anonymization::models::{OperatorPreset, Span};
use crate::anonymization::operators::OperatorTable;
use crate::domain::LanguageCode;
use anyhow::{Context, Result};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use uuid::Uuid;

/// Audit log entry for one request
#[derive(Debug, Serialize)]
pub struct AuditLogEntry {
    timestamp: String,
    request_id: String,
    language: String,
    preset: String,
    redactions_count: usize,
    processing_time_ms: u64,
    redactions: Vec<AuditRedaction>,
}

/// One redaction (with hashed original)
#[derive(Debug, Serialize)]
struct AuditRedaction {
    entity_type: String,
    recognizer: String,
    operator: String,
    start: usize,
    end: usize,
    score: f64,
    /// SHA-256 hash of original value (never log plaintext PII)
    value_hash: String,
}

impl AuditLogEntry {
    /// Build an entry from the input text and its resolved spans
    pub fn new(
        text: &str,
        spans: &[Span],
        table: &OperatorTable,
        language: &LanguageCode,
        preset: OperatorPreset,
        processing_time_ms: u64,
    ) -> Self {
        let redactions: Vec<AuditRedaction> = spans
            .iter()
            .map(|span| AuditRedaction {
                entity_type: span.entity_type.to_string(),
                recognizer: span.source.clone(),
                operator: table
                    .get(&span.entity_type)
                    .map(|rule| rule.kind())
                    .unwrap_or("none")
                    .to_string(),
                start: span.start,
                end: span.end,
                score: span.score,
                value_hash: hash_pii_value(span.text(text).unwrap_or_default()),
            })
            .collect();

        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            request_id: Uuid::new_v4().to_string(),
            language: language.to_string(),
            preset: preset.to_string(),
            redactions_count: redactions.len(),
            processing_time_ms,
            redactions,
        }
    }
}

/// Hash a PII value using SHA-256
fn hash_pii_value(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    let result = hasher.finalize();
    format!("{result:x}")
}

/// Append-only audit logger
#[derive(Debug, Clone)]
pub struct AuditLogger {
    log_path: PathBuf,
    json_format: bool,
    enabled: bool,
}

impl AuditLogger {
    /// Create a new audit logger
    pub fn new(log_path: PathBuf, json_format: bool, enabled: bool) -> Result<Self> {
        if enabled {
            if let Some(parent) = log_path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).with_context(|| {
                        format!("Failed to create audit log directory: {}", parent.display())
                    })?;
                }
            }
        }

        Ok(Self {
            log_path,
            json_format,
            enabled,
        })
    }

    /// Create a logger from configuration
    pub fn from_config(config: &AuditConfig) -> Result<Self> {
        Self::new(config.log_path.clone(), config.json_format, config.enabled)
    }

    /// Whether entries are written
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Append an entry
    pub fn log_redaction(&self, entry: &AuditLogEntry) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        let line = if self.json_format {
            serde_json::to_string(entry).context("Failed to serialize audit entry")?
        } else {
            let types: Vec<&str> = entry
                .redactions
                .iter()
                .map(|r| r.entity_type.as_str())
                .collect();
            format!(
                "[{}] Request: {} | Language: {} | Preset: {} | Redactions: {} [{}] | Time: {}ms",
                entry.timestamp,
                entry.request_id,
                entry.language,
                entry.preset,
                entry.redactions_count,
                types.join(", "),
                entry.processing_time_ms
            )
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .with_context(|| format!("Failed to open audit log: {}", self.log_path.display()))?;

        // Concurrent requests share the file: each entry is a single write
        file.write_all(format!("{line}\n").as_bytes())
            .context("Failed to write audit entry")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EntityType;
    use tempfile::tempdir;

    fn sample_entry(text: &str) -> AuditLogEntry {
        let start = text.find("test@example.com").unwrap();
        let spans = vec![Span::new(
            EntityType::new("EMAIL_ADDRESS").unwrap(),
            start,
            start + "test@example.com".len(),
            0.5,
            "email_en",
        )];
        AuditLogEntry::new(
            text,
            &spans,
            &OperatorTable::preset(OperatorPreset::Redact),
            &LanguageCode::new("en").unwrap(),
            OperatorPreset::Redact,
            3,
        )
    }

    #[test]
    fn test_audit_logger_creation() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("nested").join("audit.log");

        let logger = AuditLogger::new(log_path.clone(), true, true).unwrap();
        assert!(logger.is_enabled());
        assert!(log_path.parent().unwrap().exists());
    }

    #[test]
    fn test_hash_pii_value() {
        let hash1 = hash_pii_value("test@example.com");
        let hash2 = hash_pii_value("test@example.com");
        let hash3 = hash_pii_value("different@example.com");

        assert_eq!(hash1, hash2);
        assert_ne!(hash1, hash3);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_json_entry_has_no_plaintext() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("audit.log");
        let logger = AuditLogger::new(log_path.clone(), true, true).unwrap();

        logger
            .log_redaction(&sample_entry("write to test@example.com now"))
            .unwrap();

        let content = std::fs::read_to_string(&log_path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(content.trim()).unwrap();
        assert_eq!(parsed["redactions_count"], 1);
        assert_eq!(parsed["redactions"][0]["operator"], "replace");
        assert!(!content.contains("test@example.com"));
    }

    #[test]
    fn test_plain_format() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("audit.log");
        let logger = AuditLogger::new(log_path.clone(), false, true).unwrap();

        logger
            .log_redaction(&sample_entry("mail test@example.com"))
            .unwrap();
        logger
            .log_redaction(&sample_entry("again test@example.com"))
            .unwrap();

        let content = std::fs::read_to_string(&log_path).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(content.contains("Redactions: 1 [EMAIL_ADDRESS]"));
        assert!(!content.contains("test@example.com"));
    }

    #[test]
    fn test_disabled_logger_writes_nothing() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("audit.log");
        let logger = AuditLogger::new(log_path.clone(), true, false).unwrap();

        logger.log_redaction(&sample_entry("x test@example.com")).unwrap();
        assert!(!log_path.exists());
    }
}
