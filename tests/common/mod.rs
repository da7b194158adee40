//! Shared fixtures for integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use geoindex::adapters::backend::{IndexClient, ItemResult, ItemStatus};
use geoindex::config::GeoindexConfig;
use geoindex::domain::{BackendError, Batch, Record};
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet, VecDeque};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// In-memory index client that records what it was sent
#[derive(Default)]
pub struct MockIndexClient {
    batches: Mutex<Vec<Vec<String>>>,
    bodies: Mutex<HashMap<String, Value>>,
    request_failures: Mutex<VecDeque<BackendError>>,
    rejected: HashSet<String>,
    requests: AtomicUsize,
    ensured: AtomicUsize,
    delay: Option<Duration>,
}

impl MockIndexClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails the next requests with these errors, in order
    pub fn with_request_failures(failures: Vec<BackendError>) -> Self {
        Self {
            request_failures: Mutex::new(failures.into()),
            ..Default::default()
        }
    }

    /// Rejects these ids at item level with a 400
    pub fn with_rejected(ids: &[&str]) -> Self {
        Self {
            rejected: ids.iter().map(|id| id.to_string()).collect(),
            ..Default::default()
        }
    }

    /// Takes `delay` to answer every bulk request
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Default::default()
        }
    }

    /// Batches in the order they were first submitted
    pub fn batches(&self) -> Vec<Vec<String>> {
        self.batches.lock().unwrap().clone()
    }

    pub fn body(&self, id: &str) -> Option<Value> {
        self.bodies.lock().unwrap().get(id).cloned()
    }

    pub fn indexed_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.bodies.lock().unwrap().keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn ensured(&self) -> usize {
        self.ensured.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IndexClient for MockIndexClient {
    async fn ensure_index(&self) -> Result<(), BackendError> {
        self.ensured.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn submit(&self, batch: &Batch) -> Result<Vec<ItemResult>, BackendError> {
        self.requests.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(err) = self.request_failures.lock().unwrap().pop_front() {
            return Err(err);
        }

        self.batches
            .lock()
            .unwrap()
            .push(batch.ids().into_iter().map(String::from).collect());

        let mut bodies = self.bodies.lock().unwrap();
        Ok(batch
            .items()
            .iter()
            .map(|item| {
                let status = if self.rejected.contains(item.id.as_str()) {
                    ItemStatus::Failed {
                        status: 400,
                        reason: "mapper_parsing_exception".to_string(),
                    }
                } else {
                    bodies.insert(
                        item.id.to_string(),
                        serde_json::from_slice(&item.body).unwrap(),
                    );
                    ItemStatus::Created
                };
                ItemResult::new(item.id.clone(), status)
            })
            .collect())
    }
}

/// A minimal Who's On First feature
pub fn feature(id: i64) -> Value {
    json!({
        "type": "Feature",
        "id": id,
        "properties": {
            "wof:id": id,
            "wof:name": format!("place {id}"),
            "wof:placetype": "locality",
        },
        "geometry": {"type": "Point", "coordinates": [-73.5, 45.5]}
    })
}

pub fn alt_feature(id: i64, label: &str) -> Value {
    let mut value = feature(id);
    value["properties"]["src:alt_label"] = json!(label);
    value
}

pub fn record(path: &str, value: &Value) -> Record {
    Record::new(path, serde_json::to_vec(value).unwrap())
}

/// Writes `value` to `root/relative`, creating parent directories
pub fn write_feature(root: &Path, relative: &str, value: &Value) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, serde_json::to_vec_pretty(value).unwrap()).unwrap();
}

/// Configuration for fast, deterministic test runs
pub fn test_config(workers: usize, max_batch_count: usize) -> GeoindexConfig {
    let mut config = GeoindexConfig::default();
    config.indexing.workers = workers;
    config.indexing.max_batch_count = max_batch_count;
    config.retry.base_delay_ms = 1;
    config.retry.max_delay_ms = 5;
    config
}
