//! Audit logging module
//!
//! Provides an append-only record of redactions. Original values are stored
//! only as SHA-256 hashes.

pub mod logger;

pub use logger::{AuditLogEntry, AuditLogger};
