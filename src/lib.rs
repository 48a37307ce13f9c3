// Veil - Multilingual PII Detection and Redaction
// Copyright (c) 2025 Veil Contributors
// Licensed under the MIT License

//! # Veil - Multilingual PII Detection and Redaction
//!
//! Veil finds personally identifiable information in free text (English and
//! Greek out of the box) and rewrites the text so that the PII is hidden,
//! masked or replaced with plausible dummy values.
//!
//! ## Overview
//!
//! This library provides:
//! - **Detection** with regex recognizers (checksum validation, context words)
//!   and an optional external named-entity model
//! - **Resolution** of overlapping detections into one non-overlapping set
//! - **Rewriting** under per-entity-type operator rules with exact offsets
//! - **Auditing** of every request with hashed values
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`anonymization`] - Recognizers, analyzer, resolver, operators, rewriter
//! - [`domain`] - Core domain types and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging and observability
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use veil::anonymization::{AnonymizationEngine, AnonymizeRequest, OperatorPreset};
//! use veil::config::load_config;
//! use veil::domain::LanguageCode;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("veil.toml")?;
//!     let engine = AnonymizationEngine::new(config.anonymization)?;
//!
//!     let request = AnonymizeRequest::new(
//!         LanguageCode::new("el")?,
//!         "Στείλε στο maria@example.gr",
//!     )
//!     .with_preset(OperatorPreset::Synthetic);
//!
//!     let result = engine.anonymize(request).await?;
//!     println!("{}", result.output_text);
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! The library returns [`domain::VeilError`]. A request either succeeds
//! completely or fails without output: a missing operator rule or an
//! unavailable recognizer never yields partially redacted text.
//!
//! ```rust,no_run
//! use veil::domain::VeilError;
//!
//! fn describe(err: &VeilError) -> &'static str {
//!     match err {
//!         VeilError::MissingOperatorRule { .. } => "configure an operator rule",
//!         VeilError::RecognizerUnavailable { .. } => "retry later",
//!         _ => "see the error message",
//!     }
//! }
//! ```
//!
//! ## Logging
//!
//! Veil uses structured logging with the `tracing` crate. Events carry entity
//! types, counts and offsets, never the detected values.

pub mod anonymization;
pub mod cli;
pub mod config;
pub mod domain;
pub mod logging;
