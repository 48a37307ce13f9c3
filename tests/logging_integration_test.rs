//! Integration tests for logging functionality

use tempfile::TempDir;
use veil::config::LoggingConfig;
use veil::logging::init_logging;

#[test]
fn test_logging_config_default() {
    let config = LoggingConfig::default();
    assert!(!config.local_enabled);
    assert_eq!(config.local_path, "./logs");
    assert_eq!(config.local_rotation, "daily");
}

#[test]
fn test_invalid_level_rejected_before_init() {
    let config = LoggingConfig::default();
    assert!(init_logging("verbose", &config).is_err());
}

#[test]
fn test_invalid_rotation_rejected_before_init() {
    let temp_dir = TempDir::new().unwrap();
    let config = LoggingConfig {
        local_enabled: true,
        local_path: temp_dir.path().to_string_lossy().to_string(),
        local_rotation: "weekly".to_string(),
    };
    assert!(init_logging("info", &config).is_err());
}

// The global subscriber can only be installed once per test binary, so file
// logging is exercised by a single test.
#[test]
fn test_file_logging_creates_directory() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("logs");

    let config = LoggingConfig {
        local_enabled: true,
        local_path: log_path.to_string_lossy().to_string(),
        local_rotation: "never".to_string(),
    };
    assert!(!log_path.exists());

    let guard = init_logging("debug", &config).unwrap();
    tracing::info!(target: "veil::engine", spans = 2, "redaction finished");
    drop(guard);

    assert!(log_path.is_dir());
    let log_file = log_path.join("veil.log");
    assert!(log_file.exists());

    let content = std::fs::read_to_string(log_file).unwrap();
    assert!(content.contains("redaction finished"));
}
