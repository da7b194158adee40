//! Index coordinator - main orchestrator for an indexing run
//!
//! Wires a record source, the preparer, the batch accumulator and the submission engine
//! together. Records are prepared by up to `workers` concurrent tasks (the CPU-bound part on
//! the blocking pool); prepared documents are handed to the accumulator, whose in-flight limit
//! pushes back on the workers when the backend is slower than the source.

use crate::adapters::backend::IndexClient;
use crate::adapters::source::RecordSource;
use crate::config::GeoindexConfig;
use crate::core::identifier::{IdentifierResolver, ResolverConfig};
use crate::core::index::batch::{BatchAccumulator, BatchLimits};
use crate::core::index::prepare::{Prepared, Preparer};
use crate::core::index::stats::{RunReport, StatsAggregator};
use crate::core::index::submit::{RetryPolicy, SubmissionEngine};
use crate::core::transform::Pipeline;
use crate::domain::{IndexerError, Record, Result};
use crate::log_error_with_context;
use futures::future;
use futures::StreamExt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;

/// Index coordinator
pub struct IndexCoordinator {
    config: GeoindexConfig,
    client: Arc<dyn IndexClient>,
    preparer: Arc<Preparer>,
    retry: RetryPolicy,
    limits: BatchLimits,
    shutdown: watch::Receiver<bool>,
}

impl IndexCoordinator {
    /// Create a new index coordinator
    ///
    /// # Errors
    ///
    /// Returns [`IndexerError::Configuration`] if the configuration is invalid, which includes
    /// an incompatible pipeline stage selection. Nothing has been read at that point.
    pub fn new(
        config: GeoindexConfig,
        client: Arc<dyn IndexClient>,
        shutdown: watch::Receiver<bool>,
    ) -> Result<Self> {
        config.validate().map_err(IndexerError::Configuration)?;

        let pipeline = Pipeline::from_names(&config.indexing.pipeline_stages)?;
        let resolver = IdentifierResolver::new(ResolverConfig::from_indexing(&config.indexing)?);
        let retry = RetryPolicy::from_config(&config.retry);
        let limits = BatchLimits::from_indexing(&config.indexing);

        Ok(Self {
            preparer: Arc::new(Preparer::new(resolver, pipeline)),
            config,
            client,
            retry,
            limits,
            shutdown,
        })
    }

    /// Runs the pipeline over every record of `source`
    ///
    /// Per-document failures are counted in the report and never end the run. A shutdown
    /// signal stops pulling records, lets in-flight work finish and returns a report with
    /// `cancelled` set.
    ///
    /// # Errors
    ///
    /// Returns an error if the index cannot be created or the source fails fatally. Batches
    /// already accepted are still flushed before the error is returned.
    pub async fn run(&self, source: &dyn RecordSource) -> Result<RunReport> {
        if self.config.backend.create_index {
            self.client.ensure_index().await?;
        }

        let workers = self.config.indexing.workers.max(1);
        let stats = Arc::new(StatsAggregator::new());
        let engine = Arc::new(SubmissionEngine::new(
            Arc::clone(&self.client),
            self.retry.clone(),
        ));
        let accumulator = BatchAccumulator::new(self.limits, workers, engine, Arc::clone(&stats));

        tracing::info!(
            run_id = %stats.run_id(),
            index = %self.config.backend.index,
            workers = workers,
            stages = ?self.preparer.pipeline().stages(),
            include_alternates = self.config.indexing.include_alternates,
            dry_run = self.config.application.dry_run,
            "Starting indexing run"
        );

        // The first fatal error ends the stream. Records already pulled are still prepared
        // and handed to the accumulator, so no accepted document is dropped.
        let fatal: Mutex<Option<IndexerError>> = Mutex::new(None);
        let interrupted = AtomicBool::new(false);
        let stop = async {
            shutdown_requested(self.shutdown.clone()).await;
            interrupted.store(true, Ordering::SeqCst);
        };

        let (accumulator_ref, stats_ref, fatal_ref) = (&accumulator, &stats, &fatal);
        source
            .records()
            .take_until(stop)
            .scan((), |_, item| {
                let next = match item {
                    Ok(record) if lock_fatal(&fatal).is_none() => Some(record),
                    Ok(_) => None,
                    Err(e) => {
                        tracing::error!(
                            error = %e,
                            "Record source failed, flushing accepted documents"
                        );
                        lock_fatal(&fatal).get_or_insert(e);
                        None
                    }
                };
                future::ready(next)
            })
            .for_each_concurrent(workers, |record| async move {
                if let Err(e) = self.process_record(record, accumulator_ref, stats_ref).await {
                    log_error_with_context!(&e, "Record processing failed");
                    lock_fatal(fatal_ref).get_or_insert(e);
                }
            })
            .await;

        let closed = accumulator.close().await;

        // Only a signal that cut the source short cancels the run.
        let cancelled = interrupted.load(Ordering::SeqCst);
        if cancelled {
            tracing::warn!("Indexing run interrupted by shutdown signal");
        }

        let report = stats.snapshot(cancelled);
        report.log_summary();

        let fatal = fatal.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(e) = fatal {
            return Err(e);
        }
        closed?;
        Ok(report)
    }

    async fn process_record(
        &self,
        record: Record,
        accumulator: &BatchAccumulator,
        stats: &StatsAggregator,
    ) -> Result<()> {
        stats.record_seen();

        let source = record.path.clone();
        let preparer = Arc::clone(&self.preparer);
        let prepared = tokio::task::spawn_blocking(move || preparer.prepare(record))
            .await
            .map_err(|e| IndexerError::Other(format!("Preparation task failed: {e}")))?;

        match prepared {
            Prepared::Document(document) => {
                tracing::trace!(id = %document.id, source = %source, "Prepared document");
                accumulator.add(document.into()).await
            }
            Prepared::Skipped { alt_label } => {
                stats.record_skipped();
                tracing::debug!(
                    source = %source,
                    alt_label = %alt_label,
                    "Skipping alternate geometry"
                );
                Ok(())
            }
            Prepared::Failed(e) => {
                stats.record_failed();
                tracing::warn!(source = %source, error = %e, "Failed to prepare document");
                Ok(())
            }
        }
    }
}

fn lock_fatal(slot: &Mutex<Option<IndexerError>>) -> MutexGuard<'_, Option<IndexerError>> {
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Resolves once the shutdown flag is set
///
/// A dropped sender means nobody can request shutdown any more, so this never resolves.
async fn shutdown_requested(mut shutdown: watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow_and_update() {
            return;
        }
        if shutdown.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
