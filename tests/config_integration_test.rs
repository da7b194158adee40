//! Integration tests for configuration loading and validation
//!
//! Tests that touch environment variables hold `ENV_MUTEX` so they do not interfere with
//! each other.

use geoindex::config::{load_config, GeoindexConfig, SourceMode};
use secrecy::ExposeSecret;
use std::io::Write;
use std::sync::Mutex;
use tempfile::NamedTempFile;

static ENV_MUTEX: Mutex<()> = Mutex::new(());

fn cleanup_env_vars() {
    for var in [
        "GEOINDEX_APPLICATION_LOG_LEVEL",
        "GEOINDEX_APPLICATION_DRY_RUN",
        "GEOINDEX_BACKEND_ENDPOINT",
        "GEOINDEX_BACKEND_INDEX",
        "GEOINDEX_SOURCE_MODE",
        "GEOINDEX_SOURCE_PATHS",
        "GEOINDEX_INDEXING_WORKERS",
        "GEOINDEX_INDEXING_INCLUDE_ALTERNATES",
        "GEOINDEX_INDEXING_PIPELINE_STAGES",
        "GEOINDEX_RETRY_MAX_ATTEMPTS",
        "TEST_ES_PASSWORD",
    ] {
        std::env::remove_var(var);
    }
}

fn password(config: &GeoindexConfig) -> String {
    let secret = config.backend.password.as_ref().unwrap().expose_secret();
    AsRef::<str>::as_ref(secret).to_string()
}

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_complete_config() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_config(
        r#"
[application]
log_level = "debug"
dry_run = true

[backend]
endpoint = "https://search.example.com:9200"
index = "spelunker"
username = "indexer"
password = "hunter2"
timeout_seconds = 120
create_index = false

[source]
mode = "directory"
paths = ["/data/features", "/data/more-features"]

[indexing]
workers = 6
max_batch_count = 250
max_batch_bytes = 1048576
flush_interval_seconds = 5
include_alternates = true
pipeline_stages = ["spelunker-v1"]

[retry]
max_attempts = 3
base_delay_ms = 100
max_delay_ms = 1000
retry_on_status = [429, 503]

[logging]
local_enabled = true
local_path = "/var/log/geoindex"
local_rotation = "hourly"
"#,
    );

    let config = load_config(file.path()).unwrap();

    assert_eq!(config.application.log_level, "debug");
    assert!(config.application.dry_run);
    assert_eq!(config.backend.endpoint, "https://search.example.com:9200");
    assert_eq!(config.backend.index, "spelunker");
    assert_eq!(config.backend.username.as_deref(), Some("indexer"));
    assert_eq!(password(&config), "hunter2");
    assert_eq!(config.backend.timeout_seconds, 120);
    assert!(!config.backend.create_index);
    assert_eq!(config.source.mode, SourceMode::Directory);
    assert_eq!(config.source.paths.len(), 2);
    assert_eq!(config.indexing.workers, 6);
    assert_eq!(config.indexing.max_batch_count, 250);
    assert_eq!(config.indexing.max_batch_bytes, 1_048_576);
    assert_eq!(config.indexing.flush_interval_seconds, 5);
    assert!(config.indexing.include_alternates);
    assert_eq!(config.indexing.pipeline_stages, vec!["spelunker-v1"]);
    assert_eq!(config.retry.max_attempts, 3);
    assert_eq!(config.retry.retry_on_status, vec![429, 503]);
    assert!(config.logging.local_enabled);
    assert_eq!(config.logging.local_rotation, "hourly");
}

#[test]
fn test_load_minimal_config_with_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_config("[backend]\nindex = \"millsfield\"\n");
    let config = load_config(file.path()).unwrap();

    assert_eq!(config.application.log_level, "info");
    assert!(!config.application.dry_run);
    assert_eq!(config.backend.endpoint, "http://localhost:9200");
    assert!(config.backend.password.is_none());
    assert!(config.backend.create_index);
    assert_eq!(config.source.mode, SourceMode::Repo);
    assert_eq!(config.indexing.max_batch_count, 1000);
    assert_eq!(config.indexing.max_batch_bytes, 5_000_000);
    assert_eq!(config.indexing.flush_interval_seconds, 30);
    assert_eq!(config.indexing.id_field, "properties.wof:id");
    assert_eq!(config.indexing.alt_label_field, "properties.src:alt_label");
    assert!(config.indexing.pipeline_stages.is_empty());
    assert_eq!(config.retry.max_attempts, 5);
    assert_eq!(config.retry.retry_on_status, vec![429, 502, 503, 504]);
}

#[test]
fn test_env_var_substitution() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var("TEST_ES_PASSWORD", "from-env");

    let file = write_config(
        "[backend]\n# password = \"${UNSET_IN_A_COMMENT}\"\nusername = \"elastic\"\npassword = \"${TEST_ES_PASSWORD}\"\n",
    );
    let config = load_config(file.path()).unwrap();

    assert_eq!(password(&config), "from-env");
    cleanup_env_vars();
}

#[test]
fn test_missing_substitution_variable_fails() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_config("[backend]\npassword = \"${TEST_ES_PASSWORD}\"\n");
    let err = load_config(file.path()).unwrap_err();
    assert!(err.to_string().contains("TEST_ES_PASSWORD"));
}

#[test]
fn test_env_var_overrides() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var("GEOINDEX_BACKEND_INDEX", "override");
    std::env::set_var("GEOINDEX_SOURCE_MODE", "directory");
    std::env::set_var("GEOINDEX_SOURCE_PATHS", "/a, /b");
    std::env::set_var("GEOINDEX_INDEXING_WORKERS", "3");
    std::env::set_var("GEOINDEX_INDEXING_INCLUDE_ALTERNATES", "true");
    std::env::set_var(
        "GEOINDEX_INDEXING_PIPELINE_STAGES",
        "append-name-stats,append-placetype-details",
    );

    let file = write_config("[backend]\nindex = \"millsfield\"\n");
    let config = load_config(file.path());
    cleanup_env_vars();
    let config = config.unwrap();

    assert_eq!(config.backend.index, "override");
    assert_eq!(config.source.mode, SourceMode::Directory);
    assert_eq!(config.source.paths, vec!["/a", "/b"]);
    assert_eq!(config.indexing.workers, 3);
    assert!(config.indexing.include_alternates);
    assert_eq!(
        config.indexing.pipeline_stages,
        vec!["append-name-stats", "append-placetype-details"]
    );
}

#[test]
fn test_invalid_env_override_fails() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var("GEOINDEX_INDEXING_WORKERS", "many");

    let file = write_config("");
    let result = load_config(file.path());
    cleanup_env_vars();

    assert!(result.is_err());
}

#[test]
fn test_invalid_config_validation() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    for contents in [
        "[indexing]\nworkers = 0\n",
        "[indexing]\nmax_batch_bytes = 0\n",
        "[indexing]\npipeline_stages = [\"extract-properties\", \"append-name-stats\"]\n",
        "[indexing]\npipeline_stages = [\"spelunker-v1\", \"spelunker-v1\"]\n",
        "[indexing]\npipeline_stages = [\"reverse-geocode\"]\n",
        "[indexing]\nid_field = \"\"\n",
        "[retry]\nbase_delay_ms = 5000\nmax_delay_ms = 100\n",
        "[logging]\nlocal_rotation = \"weekly\"\n",
        "[source]\nmode = \"s3\"\n",
    ] {
        let file = write_config(contents);
        assert!(
            load_config(file.path()).is_err(),
            "expected an error for:\n{contents}"
        );
    }
}

#[test]
fn test_missing_file() {
    let err = load_config("/nonexistent/geoindex.toml").unwrap_err();
    assert!(err.to_string().contains("not found"));
}
