//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Console logs on stderr
//! - JSON-formatted file logs with rotation
//! - `RUST_LOG` filtering
//!
//! Log events never carry detected PII values; only entity types, counts,
//! offsets and recognizer names.
//!
//! # Example
//!
//! ```no_run
//! use veil::logging::init_logging;
//! use veil::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

// Re-export commonly used items
pub use structured::{init_logging, LoggingGuard};

/// Log the completion of a batch of texts
///
/// # Example
///
/// ```no_run
/// use veil::log_batch_complete;
/// use std::time::Duration;
///
/// log_batch_complete!(42, 2, Duration::from_millis(350));
/// ```
#[macro_export]
macro_rules! log_batch_complete {
    ($succeeded:expr, $failed:expr, $duration:expr) => {
        tracing::info!(
            succeeded = $succeeded,
            failed = $failed,
            duration_ms = $duration.as_millis() as u64,
            "Batch completed"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use veil::log_error_with_context;
/// use veil::domain::VeilError;
///
/// let error = VeilError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}
