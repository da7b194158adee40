//! Integration tests for graceful shutdown
//!
//! These tests verify that:
//! - A shutdown signal stops the run from pulling further records
//! - Documents already accepted are flushed before the run returns
//! - The report is marked as cancelled

mod common;

use common::{feature, record, test_config, MockIndexClient};
use futures::stream::{self, BoxStream, StreamExt};
use geoindex::adapters::source::RecordSource;
use geoindex::core::index::IndexCoordinator;
use geoindex::domain::{Record, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Yields its records, then never ends
struct EndlessSource {
    records: Vec<Record>,
}

impl RecordSource for EndlessSource {
    fn records(&self) -> BoxStream<'_, Result<Record>> {
        stream::iter(self.records.iter().cloned().map(Ok))
            .chain(stream::pending())
            .boxed()
    }
}

#[tokio::test]
async fn test_shutdown_flushes_and_reports_cancelled() {
    let client = Arc::new(MockIndexClient::new());
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Large bounds so nothing is flushed until shutdown.
    let coordinator =
        IndexCoordinator::new(test_config(2, 1000), client.clone(), shutdown_rx).unwrap();
    let source = EndlessSource {
        records: vec![record("1.geojson", &feature(1)), record("2.geojson", &feature(2))],
    };

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        shutdown_tx.send(true).unwrap();
        // Keep the sender alive until the run has observed the signal.
        tokio::time::sleep(Duration::from_secs(5)).await;
    });

    let report = tokio::time::timeout(Duration::from_secs(5), coordinator.run(&source))
        .await
        .expect("run did not stop on shutdown")
        .unwrap();

    assert!(report.cancelled);
    assert_eq!(report.seen, 2);
    assert_eq!(report.indexed, 2);
    assert_eq!(client.batches().len(), 1);
}

#[tokio::test]
async fn test_signal_before_start_reads_nothing() {
    let client = Arc::new(MockIndexClient::new());
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    shutdown_tx.send(true).unwrap();

    let coordinator = IndexCoordinator::new(test_config(1, 10), client.clone(), shutdown_rx).unwrap();
    let report = coordinator
        .run(&vec![record("1.geojson", &feature(1))])
        .await
        .unwrap();

    assert!(report.cancelled);
    assert_eq!(report.seen, 0);
    assert!(client.batches().is_empty());
}

#[tokio::test]
async fn test_dropped_sender_does_not_cancel() {
    let client = Arc::new(MockIndexClient::new());
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    drop(shutdown_tx);

    let coordinator = IndexCoordinator::new(test_config(1, 10), client, shutdown_rx).unwrap();
    let report = coordinator
        .run(&vec![record("1.geojson", &feature(1))])
        .await
        .unwrap();

    assert!(!report.cancelled);
    assert_eq!(report.indexed, 1);
}

#[tokio::test]
async fn test_signal_after_source_drained_is_not_a_cancellation() {
    let client = Arc::new(MockIndexClient::with_delay(Duration::from_millis(500)));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let coordinator = IndexCoordinator::new(test_config(1, 10), client.clone(), shutdown_rx).unwrap();

    // The source is exhausted at once; the signal lands while the final flush is in flight.
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        shutdown_tx.send(true).unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;
    });

    let report = coordinator
        .run(&vec![record("1.geojson", &feature(1))])
        .await
        .unwrap();

    assert!(!report.cancelled);
    assert_eq!(report.indexed, 1);
    assert_eq!(client.batches(), vec![vec!["1".to_string()]]);
}
