//! Index client that submits nothing

use super::{IndexClient, ItemResult, ItemStatus};
use crate::domain::{BackendError, Batch};
use async_trait::async_trait;

/// Reports every item as [`ItemStatus::Noop`] without contacting a backend
#[derive(Debug, Clone, Default)]
pub struct DryRunClient;

impl DryRunClient {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl IndexClient for DryRunClient {
    async fn ensure_index(&self) -> Result<(), BackendError> {
        tracing::debug!("Dry run: skipping index creation");
        Ok(())
    }

    async fn submit(&self, batch: &Batch) -> Result<Vec<ItemResult>, BackendError> {
        tracing::debug!(
            sequence = batch.sequence(),
            items = batch.len(),
            bytes = batch.bytes(),
            "Dry run: skipping bulk request"
        );

        Ok(batch
            .items()
            .iter()
            .map(|item| ItemResult::new(item.id.clone(), ItemStatus::Noop))
            .collect())
    }
}
