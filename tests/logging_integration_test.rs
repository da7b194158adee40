//! Integration tests for logging functionality
//!
//! The global subscriber can only be installed once per process, so everything that needs
//! it lives in a single test.

use geoindex::config::LoggingConfig;
use geoindex::logging::init_logging;
use geoindex::{log_batch_flush, log_error_with_context};
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_logging_config_default() {
    let config = LoggingConfig::default();
    assert!(!config.local_enabled);
    assert_eq!(config.local_path, "./logs");
    assert_eq!(config.local_rotation, "daily");
}

#[test]
fn test_invalid_level_rejected_before_install() {
    let config = LoggingConfig::default();
    assert!(init_logging("loud", &config).is_err());
}

#[test]
fn test_file_logging_writes_json() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("logs");

    let config = LoggingConfig {
        local_enabled: true,
        local_path: log_path.to_string_lossy().to_string(),
        local_rotation: "never".to_string(),
    };

    // Events from this test crate are outside the default `geoindex=` filter.
    std::env::set_var("RUST_LOG", "debug");
    let guard = init_logging("debug", &config).unwrap();
    assert!(guard.has_file_output());
    assert!(log_path.exists());

    log_batch_flush!(1_u64, 3_usize, 512_usize, "close");
    log_error_with_context!(
        geoindex::domain::IndexerError::Io("disk full".to_string()),
        "writing"
    );
    tracing::info!(run_id = "test", "Indexing run finished");

    drop(guard);
    std::thread::sleep(Duration::from_millis(50));

    let contents = std::fs::read_to_string(log_path.join("geoindex.log")).unwrap();
    let lines: Vec<serde_json::Value> = contents
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert!(lines
        .iter()
        .any(|l| l["fields"]["message"] == "Flushing batch" && l["fields"]["trigger"] == "close"));
    assert!(lines
        .iter()
        .any(|l| l["fields"]["message"] == "Indexing run finished"));
}
