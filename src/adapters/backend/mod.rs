//! Search backend abstraction
//!
//! [`IndexClient`] is the seam between the submission engine and the search backend. A client
//! sends one batch per call and reports what the backend did with each item; it never retries.
//! Retry and failure classification belong to [`crate::core::index::submit`].

pub mod dry_run;
pub mod elasticsearch;

pub use dry_run::DryRunClient;
pub use elasticsearch::ElasticsearchClient;

use crate::config::GeoindexConfig;
use crate::domain::{Batch, BackendError, DocumentId, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// What the backend did with one item of a bulk request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemStatus {
    Created,
    Updated,
    /// Accepted, but the stored document did not change
    Noop,
    /// Rejected by the backend
    Failed { status: u16, reason: String },
}

/// Per-item result of a bulk request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemResult {
    pub id: DocumentId,
    pub status: ItemStatus,
}

impl ItemResult {
    pub fn new(id: DocumentId, status: ItemStatus) -> Self {
        Self { id, status }
    }
}

/// Client for an Elasticsearch-compatible bulk API
#[async_trait]
pub trait IndexClient: Send + Sync {
    /// Creates the target index; an index that already exists is not an error
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be reached or refuses to create the index.
    async fn ensure_index(&self) -> std::result::Result<(), BackendError>;

    /// Submits one batch and returns the per-item results in any order
    ///
    /// # Errors
    ///
    /// Returns an error if the request as a whole failed: connection problems, timeouts,
    /// a non-success HTTP status or an unreadable response body.
    async fn submit(&self, batch: &Batch) -> std::result::Result<Vec<ItemResult>, BackendError>;
}

/// Creates the index client selected by the configuration
///
/// Dry-run mode gets a [`DryRunClient`]; otherwise an [`ElasticsearchClient`] for the
/// configured endpoint.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built.
pub fn create_index_client(config: &GeoindexConfig) -> Result<Arc<dyn IndexClient>> {
    if config.application.dry_run {
        tracing::info!("Dry run: documents will be prepared but not submitted");
        return Ok(Arc::new(DryRunClient::new()));
    }

    tracing::info!(
        endpoint = %config.backend.endpoint,
        index = %config.backend.index,
        "Creating Elasticsearch client"
    );
    let client = ElasticsearchClient::new(&config.backend)?;
    Ok(Arc::new(client))
}
