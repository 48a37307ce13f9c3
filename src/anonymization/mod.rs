//! Anonymization module for Veil
//!
//! This module detects PII spans in free text and rewrites the text under a
//! per-entity-type operator table.
//!
//! # Architecture
//!
//! The pipeline consists of:
//! - **Recognizers**: pattern-based (regex, checksum validation, context
//!   words) and model-based (external named-entity model)
//! - **Analyzer**: runs applicable recognizers concurrently and collects raw spans
//! - **Resolver**: merges raw spans into a sorted, non-overlapping set
//! - **Rewriter**: applies operator rules right to left, tracking offsets
//! - **Audit**: structured logging with hashed PII values
//!
//! # Usage
//!
//! ```rust,ignore
//! use veil::anonymization::{AnonymizationEngine, config::AnonymizationConfig};
//!
//! let engine = AnonymizationEngine::new(AnonymizationConfig::default())?;
//! let result = engine.anonymize(request).await?;
//! ```

pub mod analyzer;
pub mod audit;
pub mod config;
pub mod engine;
pub mod models;
pub mod offset;
pub mod operators;
pub mod recognizer;
pub mod registry;
pub mod report;
pub mod resolver;
pub mod rewriter;

// Re-export main types
pub use config::AnonymizationConfig;
pub use engine::AnonymizationEngine;
pub use models::{AnalysisResult, AnonymizeRequest, AnonymizedText, OperatorPreset, Span};
pub use report::AnalysisReport;
