//! Batch accumulation and flush policy
//!
//! [`BatchAccumulator`] collects [`BatchItem`]s into the open batch and flushes it when the
//! first of these happens:
//!
//! - the batch holds `max_count` items
//! - the batch holds `max_bytes` of bodies (an item that would push a non-empty batch past
//!   the bound flushes the batch first)
//! - `flush_interval` has passed since the last flush (background timer)
//!
//! A flush swaps the open batch out under the lock and hands it to a submission task. At most
//! `max_in_flight` submissions run at once; `add` waits for a free slot when a flush is due
//! and none is available, which is how backpressure reaches the record workers.

use crate::config::IndexingConfig;
use crate::core::index::stats::StatsAggregator;
use crate::core::index::submit::{BatchOutcome, Outcome, SubmissionEngine};
use crate::domain::{Batch, BatchItem, IndexerError, Result};
use crate::log_batch_flush;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Flush bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchLimits {
    pub max_count: usize,
    pub max_bytes: usize,
    pub flush_interval: Duration,
}

impl BatchLimits {
    pub fn from_indexing(config: &IndexingConfig) -> Self {
        Self {
            max_count: config.max_batch_count.max(1),
            max_bytes: config.max_batch_bytes.max(1),
            flush_interval: Duration::from_secs(config.flush_interval_seconds.max(1)),
        }
    }
}

/// What caused a flush
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushTrigger {
    Count,
    Bytes,
    Interval,
    Close,
}

impl FlushTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlushTrigger::Count => "count",
            FlushTrigger::Bytes => "bytes",
            FlushTrigger::Interval => "interval",
            FlushTrigger::Close => "close",
        }
    }
}

struct OpenBatch {
    batch: Batch,
    next_sequence: u64,
    last_flush: Instant,
    closed: bool,
}

impl OpenBatch {
    /// Swaps out the open batch and restarts the interval
    fn take(&mut self) -> Batch {
        let next = Batch::new(self.next_sequence);
        self.next_sequence += 1;
        self.last_flush = Instant::now();
        std::mem::replace(&mut self.batch, next)
    }
}

struct Shared {
    limits: BatchLimits,
    open: Mutex<OpenBatch>,
    in_flight: Arc<Semaphore>,
    engine: Arc<SubmissionEngine>,
    stats: Arc<StatsAggregator>,
}

impl Shared {
    fn lock_open(&self) -> MutexGuard<'_, OpenBatch> {
        // No code path panics while holding the lock, but recover rather than cascade.
        self.open.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Waits for a submission slot, then submits `batch` on its own task
    async fn dispatch(self: &Arc<Self>, batch: Batch, trigger: FlushTrigger) -> Result<()> {
        let permit = self
            .in_flight
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| IndexerError::Shutdown("submission slots closed".to_string()))?;

        log_batch_flush!(batch.sequence(), batch.len(), batch.bytes(), trigger.as_str());

        let shared = Arc::clone(self);
        tokio::spawn(async move {
            let outcome = shared.engine.submit(&batch).await;
            shared.record(outcome);
            drop(permit);
        });

        Ok(())
    }

    fn record(&self, outcome: BatchOutcome) {
        self.stats.record_batch(outcome.attempts);

        for item in &outcome.items {
            self.stats.record_outcome(&item.outcome);

            if let Outcome::Failure(detail) = &item.outcome {
                tracing::warn!(
                    id = %item.id,
                    source = %item.source,
                    status = ?detail.status,
                    reason = %detail.reason,
                    "Document failed to index"
                );
            }
        }
    }
}

/// Collects items into bounded batches and submits them
pub struct BatchAccumulator {
    shared: Arc<Shared>,
    max_in_flight: u32,
    close_tx: watch::Sender<bool>,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl BatchAccumulator {
    /// Creates an accumulator and starts its flush timer
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(
        limits: BatchLimits,
        max_in_flight: usize,
        engine: Arc<SubmissionEngine>,
        stats: Arc<StatsAggregator>,
    ) -> Self {
        let max_in_flight = u32::try_from(max_in_flight.max(1)).unwrap_or(u32::MAX);

        let shared = Arc::new(Shared {
            limits,
            open: Mutex::new(OpenBatch {
                batch: Batch::new(1),
                next_sequence: 2,
                last_flush: Instant::now(),
                closed: false,
            }),
            in_flight: Arc::new(Semaphore::new(max_in_flight as usize)),
            engine,
            stats,
        });

        let (close_tx, close_rx) = watch::channel(false);
        let timer = tokio::spawn(run_timer(Arc::clone(&shared), close_rx));

        Self {
            shared,
            max_in_flight,
            close_tx,
            timer: Mutex::new(Some(timer)),
        }
    }

    /// Item count and byte size of the open batch
    pub fn pending(&self) -> (usize, usize) {
        let open = self.shared.lock_open();
        (open.batch.len(), open.batch.bytes())
    }

    /// Appends an item to the open batch, flushing as the bounds require
    ///
    /// # Errors
    ///
    /// Returns [`IndexerError::Shutdown`] if the accumulator has been closed.
    pub async fn add(&self, item: BatchItem) -> Result<()> {
        let limits = self.shared.limits;

        let ready = {
            let mut open = self.shared.lock_open();
            if open.closed {
                return Err(IndexerError::Shutdown(format!(
                    "cannot add {} after the accumulator was closed",
                    item.id
                )));
            }

            let mut ready = Vec::with_capacity(2);
            if !open.batch.is_empty() && open.batch.bytes() + item.size() > limits.max_bytes {
                ready.push((open.take(), FlushTrigger::Bytes));
            }

            open.batch.push(item);

            if open.batch.len() >= limits.max_count {
                ready.push((open.take(), FlushTrigger::Count));
            } else if open.batch.bytes() >= limits.max_bytes {
                ready.push((open.take(), FlushTrigger::Bytes));
            }

            ready
        };

        for (batch, trigger) in ready {
            self.shared.dispatch(batch, trigger).await?;
        }

        Ok(())
    }

    /// Stops the timer, flushes the open batch and waits for every submission to finish
    ///
    /// Call after the last `add` has returned. Closing twice is harmless.
    pub async fn close(&self) -> Result<()> {
        let remaining = {
            let mut open = self.shared.lock_open();
            if open.closed {
                None
            } else {
                open.closed = true;
                (!open.batch.is_empty()).then(|| open.take())
            }
        };

        let _ = self.close_tx.send(true);
        let timer = self
            .timer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(handle) = timer {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "Flush timer task failed");
            }
        }

        if let Some(batch) = remaining {
            self.shared.dispatch(batch, FlushTrigger::Close).await?;
        }

        let _all = self
            .shared
            .in_flight
            .acquire_many(self.max_in_flight)
            .await
            .map_err(|_| IndexerError::Shutdown("submission slots closed".to_string()))?;

        tracing::debug!("All batch submissions finished");
        Ok(())
    }
}

async fn run_timer(shared: Arc<Shared>, mut close_rx: watch::Receiver<bool>) {
    let interval = shared.limits.flush_interval;

    loop {
        let deadline = shared.lock_open().last_flush + interval;

        tokio::select! {
            _ = tokio::time::sleep_until(deadline) => {
                let due = {
                    let mut open = shared.lock_open();
                    if open.closed {
                        break;
                    }
                    if Instant::now() < open.last_flush + interval {
                        // A count or byte flush moved the deadline.
                        None
                    } else if open.batch.is_empty() {
                        open.last_flush = Instant::now();
                        None
                    } else {
                        Some(open.take())
                    }
                };

                if let Some(batch) = due {
                    if shared.dispatch(batch, FlushTrigger::Interval).await.is_err() {
                        break;
                    }
                }
            }
            _ = close_rx.changed() => break,
        }
    }
}
