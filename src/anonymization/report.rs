//! Detection reporting
//!
//! Summarizes detection-only runs (`veil analyze`): span counts per entity
//! type and per recognizer, how many texts contained PII, and failures.
//! Reports never contain the detected values themselves.

use crate::anonymization::models::AnalysisResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Aggregated statistics over analyzed texts
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Total texts analyzed
    pub total_texts: usize,

    /// Resolved spans across all texts
    pub total_spans: usize,

    /// Spans before conflict resolution
    pub raw_spans: usize,

    /// Resolved spans by entity type
    pub spans_by_entity: BTreeMap<String, usize>,

    /// Resolved spans by producing recognizer
    pub spans_by_recognizer: BTreeMap<String, usize>,

    /// Texts that failed analysis
    pub warnings: Vec<String>,

    /// Processing statistics
    pub stats: ProcessingStats,
}

/// Processing statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessingStats {
    /// Average processing time per text (ms)
    pub avg_processing_time_ms: u64,

    /// Total processing time (ms)
    pub total_processing_time_ms: u64,

    /// Texts with at least one span
    pub texts_with_pii: usize,

    /// Texts without spans
    pub texts_without_pii: usize,
}

impl AnalysisReport {
    /// Create a new empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the result of one analyzed text
    pub fn add_result(&mut self, result: &AnalysisResult, processing_time_ms: u64) {
        self.total_texts += 1;
        self.stats.total_processing_time_ms += processing_time_ms;
        self.raw_spans += result.raw_span_count;

        if result.spans.is_empty() {
            self.stats.texts_without_pii += 1;
        } else {
            self.stats.texts_with_pii += 1;
            self.total_spans += result.spans.len();

            for span in &result.spans {
                *self
                    .spans_by_entity
                    .entry(span.entity_type.to_string())
                    .or_insert(0) += 1;
            }
            for source in &result.sources {
                *self.spans_by_recognizer.entry(source.clone()).or_insert(0) += 1;
            }
        }

        self.stats.avg_processing_time_ms =
            self.stats.total_processing_time_ms / self.total_texts as u64;
    }

    /// Record a text that could not be analyzed
    pub fn add_warning(&mut self, warning: String) {
        self.total_texts += 1;
        self.warnings.push(warning);
    }

    /// Format report for console output
    pub fn format_console(&self) -> String {
        let mut output = String::new();

        output.push('\n');
        output.push_str("═══════════════════════════════════════════════════════════════\n");
        output.push_str("                    PII DETECTION REPORT                       \n");
        output.push_str("═══════════════════════════════════════════════════════════════\n");
        output.push('\n');

        output.push_str("📊 SUMMARY\n");
        output.push_str("───────────────────────────────────────────────────────────────\n");
        output.push_str(&format!("  Texts Analyzed:          {}\n", self.total_texts));
        output.push_str(&format!(
            "  Texts with PII:          {}\n",
            self.stats.texts_with_pii
        ));
        output.push_str(&format!(
            "  Texts without PII:       {}\n",
            self.stats.texts_without_pii
        ));
        output.push_str(&format!("  Spans Detected:          {}\n", self.total_spans));
        output.push_str(&format!("  Spans Before Resolution: {}\n", self.raw_spans));
        output.push_str(&format!(
            "  Avg Processing Time:     {} ms\n",
            self.stats.avg_processing_time_ms
        ));
        output.push('\n');

        if !self.spans_by_entity.is_empty() {
            output.push_str("🔍 SPANS BY ENTITY TYPE\n");
            output.push_str("───────────────────────────────────────────────────────────────\n");
            push_counts(&mut output, &self.spans_by_entity);
            output.push('\n');
        }

        if !self.spans_by_recognizer.is_empty() {
            output.push_str("🧩 SPANS BY RECOGNIZER\n");
            output.push_str("───────────────────────────────────────────────────────────────\n");
            push_counts(&mut output, &self.spans_by_recognizer);
            output.push('\n');
        }

        if !self.warnings.is_empty() {
            output.push_str("⚠️  WARNINGS\n");
            output.push_str("───────────────────────────────────────────────────────────────\n");
            for warning in &self.warnings {
                output.push_str(&format!("  • {warning}\n"));
            }
            output.push('\n');
        }

        output.push_str("═══════════════════════════════════════════════════════════════\n");
        output
    }

    /// Format report as JSON
    pub fn format_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write report to file
    pub fn write_to_file(&self, path: &std::path::Path) -> std::io::Result<()> {
        let json = self.format_json().map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }
}

/// Count table sorted by count descending
fn push_counts(output: &mut String, counts: &BTreeMap<String, usize>) {
    let mut rows: Vec<_> = counts.iter().collect();
    rows.sort_by(|a, b| b.1.cmp(a.1));
    for (name, count) in rows {
        output.push_str(&format!("  {name:30} {count:>5}\n"));
    }
}
