//! Run statistics
//!
//! [`StatsAggregator`] counts outcomes from many tasks at once using atomics. At the end of a
//! run [`StatsAggregator::snapshot`] freezes the counters into a [`RunReport`], which is the
//! only state handed back to callers.

use crate::core::index::submit::{Outcome, SuccessKind};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Concurrent outcome counters for one run
#[derive(Debug)]
pub struct StatsAggregator {
    run_id: Uuid,
    started_at: DateTime<Utc>,
    seen: AtomicU64,
    skipped: AtomicU64,
    created: AtomicU64,
    updated: AtomicU64,
    noop: AtomicU64,
    failed: AtomicU64,
    batches: AtomicU64,
    requests: AtomicU64,
    retries: AtomicU64,
}

impl StatsAggregator {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            seen: AtomicU64::new(0),
            skipped: AtomicU64::new(0),
            created: AtomicU64::new(0),
            updated: AtomicU64::new(0),
            noop: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            batches: AtomicU64::new(0),
            requests: AtomicU64::new(0),
            retries: AtomicU64::new(0),
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// A record entered the pipeline
    pub fn record_seen(&self) {
        self.seen.fetch_add(1, Ordering::Relaxed);
    }

    /// A record was excluded by the alternate geometry policy
    pub fn record_skipped(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// A record failed before it reached a batch
    pub fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Terminal outcome of a submitted item
    pub fn record_outcome(&self, outcome: &Outcome) {
        let counter = match outcome {
            Outcome::Success(SuccessKind::Created) => &self.created,
            Outcome::Success(SuccessKind::Updated) => &self.updated,
            Outcome::Success(SuccessKind::Noop) => &self.noop,
            Outcome::Failure(_) => &self.failed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// A batch finished submission after `attempts` requests
    pub fn record_batch(&self, attempts: u32) {
        self.batches.fetch_add(1, Ordering::Relaxed);
        self.requests.fetch_add(u64::from(attempts), Ordering::Relaxed);
        self.retries
            .fetch_add(u64::from(attempts.saturating_sub(1)), Ordering::Relaxed);
    }

    /// Freezes the counters into a report
    pub fn snapshot(&self, cancelled: bool) -> RunReport {
        let load = |counter: &AtomicU64| counter.load(Ordering::Acquire);

        let created = load(&self.created);
        let updated = load(&self.updated);
        let noop = load(&self.noop);
        let finished_at = Utc::now();
        let duration_ms = (finished_at - self.started_at).num_milliseconds().max(0) as u64;

        RunReport {
            run_id: self.run_id.to_string(),
            started_at: self.started_at,
            finished_at,
            duration_ms,
            seen: load(&self.seen),
            skipped: load(&self.skipped),
            indexed: created + updated + noop,
            created,
            updated,
            noop,
            failed: load(&self.failed),
            batches: load(&self.batches),
            requests: load(&self.requests),
            retries: load(&self.retries),
            cancelled,
        }
    }
}

impl Default for StatsAggregator {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable summary of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration_ms: u64,

    /// Records that entered the pipeline
    pub seen: u64,
    /// Alternate geometries excluded by policy
    pub skipped: u64,
    /// Items the backend accepted (`created + updated + noop`)
    pub indexed: u64,
    pub created: u64,
    pub updated: u64,
    pub noop: u64,
    pub failed: u64,

    /// Batches submitted
    pub batches: u64,
    /// Bulk requests sent, including retries
    pub requests: u64,
    pub retries: u64,

    /// The run stopped early on a shutdown signal
    pub cancelled: bool,
}

impl RunReport {
    /// True when no record failed
    pub fn is_successful(&self) -> bool {
        self.failed == 0
    }

    /// Records with a terminal outcome
    pub fn accounted(&self) -> u64 {
        self.skipped + self.indexed + self.failed
    }

    pub fn log_summary(&self) {
        tracing::info!(
            run_id = %self.run_id,
            seen = self.seen,
            skipped = self.skipped,
            indexed = self.indexed,
            created = self.created,
            updated = self.updated,
            noop = self.noop,
            failed = self.failed,
            batches = self.batches,
            requests = self.requests,
            retries = self.retries,
            duration_ms = self.duration_ms,
            cancelled = self.cancelled,
            "Indexing run finished"
        );

        if self.failed > 0 {
            tracing::warn!(failed = self.failed, "Indexing run finished with failures");
        }
    }
}
