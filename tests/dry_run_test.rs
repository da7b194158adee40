//! Integration tests for dry-run mode
//!
//! Dry-run runs prepare and batch every document but never contact the backend; each
//! prepared document is reported as a noop.

mod common;

use common::{alt_feature, feature, test_config, write_feature};
use geoindex::adapters::backend::create_index_client;
use geoindex::adapters::source::FilesystemSource;
use geoindex::config::SourceMode;
use geoindex::core::index::IndexCoordinator;
use tempfile::TempDir;
use tokio::sync::watch;

#[tokio::test]
async fn test_dry_run_reports_noop_without_backend() {
    let dir = TempDir::new().unwrap();
    for id in 1..=5 {
        write_feature(dir.path(), &format!("{id}/{id}.geojson"), &feature(id));
    }
    write_feature(dir.path(), "1/1-alt-osm.geojson", &alt_feature(1, "osm"));
    std::fs::write(dir.path().join("broken.geojson"), b"not json").unwrap();

    let mut config = test_config(2, 2);
    config.application.dry_run = true;
    // Nothing listens here; any request would fail the run.
    config.backend.endpoint = "http://127.0.0.1:9".to_string();

    let client = create_index_client(&config).unwrap();
    let (_tx, rx) = watch::channel(false);
    let coordinator = IndexCoordinator::new(config, client, rx).unwrap();
    let source = FilesystemSource::new(vec![dir.path().to_path_buf()], SourceMode::Directory);

    let report = coordinator.run(&source).await.unwrap();

    assert_eq!(report.seen, 7);
    assert_eq!(report.noop, 5);
    assert_eq!(report.indexed, 5);
    assert_eq!(report.created, 0);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.failed, 1);
    assert_eq!(report.batches, 3);
    assert_eq!(report.retries, 0);
}

#[tokio::test]
async fn test_dry_run_still_validates_pipeline() {
    let mut config = test_config(1, 10);
    config.application.dry_run = true;
    config.indexing.pipeline_stages = vec!["spelunker-v1".into(), "append-name-stats".into()];

    let client = create_index_client(&config).unwrap();
    let (_tx, rx) = watch::channel(false);
    assert!(IndexCoordinator::new(config, client, rx).is_err());
}
