//! Batch submission with retry
//!
//! The [`SubmissionEngine`] sends a batch through an [`IndexClient`] and turns whatever
//! happens into one [`ItemOutcome`] per item. Transient failures (configured HTTP statuses,
//! connection errors, timeouts) are retried with exponential backoff and jitter. Permanent
//! failures and exhausted retries fail every item of the batch. Nothing here returns an
//! error: submission problems are outcomes, not reasons to stop the run.

use crate::adapters::backend::{IndexClient, ItemResult, ItemStatus};
use crate::config::RetryConfig;
use crate::domain::{BackendError, Batch, DocumentId};
use crate::log_retry_attempt;
use rand::Rng;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

const BACKOFF_MULTIPLIER: f64 = 2.0;
const BACKOFF_JITTER: f64 = 0.5;

/// Kind of successful write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuccessKind {
    Created,
    Updated,
    Noop,
}

/// Why an item was not indexed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureDetail {
    /// HTTP status, when the backend gave one
    pub status: Option<u16>,
    pub reason: String,
}

impl FailureDetail {
    pub fn new(status: Option<u16>, reason: impl Into<String>) -> Self {
        Self {
            status,
            reason: reason.into(),
        }
    }
}

/// Terminal outcome of one submitted item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success(SuccessKind),
    Failure(FailureDetail),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }
}

impl From<ItemStatus> for Outcome {
    fn from(status: ItemStatus) -> Self {
        match status {
            ItemStatus::Created => Outcome::Success(SuccessKind::Created),
            ItemStatus::Updated => Outcome::Success(SuccessKind::Updated),
            ItemStatus::Noop => Outcome::Success(SuccessKind::Noop),
            ItemStatus::Failed { status, reason } => {
                Outcome::Failure(FailureDetail::new(Some(status), reason))
            }
        }
    }
}

/// Outcome of one item, with the source path for failure reports
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemOutcome {
    pub id: DocumentId,
    pub source: String,
    pub outcome: Outcome,
}

/// Outcome of a whole batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    pub sequence: u64,
    /// Requests sent for this batch, including the first
    pub attempts: u32,
    pub items: Vec<ItemOutcome>,
}

impl BatchOutcome {
    pub fn failed(&self) -> usize {
        self.items.iter().filter(|i| !i.outcome.is_success()).count()
    }
}

/// Retry and backoff settings
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts per batch, including the first
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub retry_on_status: Vec<u16>,
}

impl RetryPolicy {
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_attempts: u32::try_from(config.max_attempts).unwrap_or(u32::MAX).max(1),
            base_delay: Duration::from_millis(config.base_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
            retry_on_status: config.retry_on_status.clone(),
        }
    }

    /// Whether `err` is worth another attempt
    pub fn is_transient(&self, err: &BackendError) -> bool {
        match err {
            BackendError::ConnectionFailed(_) | BackendError::Timeout(_) => true,
            BackendError::Status { status, .. } => self.retry_on_status.contains(status),
            BackendError::InvalidResponse(_) => false,
        }
    }

    /// Delay before retry number `retry` (1 for the first retry)
    ///
    /// `base * 2^(retry-1)`, randomized by ±50% and capped at `max_delay`.
    pub fn delay(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(32) as i32;
        let backoff = self.base_delay.as_secs_f64() * BACKOFF_MULTIPLIER.powi(exponent);
        let capped = backoff.min(self.max_delay.as_secs_f64());

        let factor = rand::thread_rng().gen_range((1.0 - BACKOFF_JITTER)..=(1.0 + BACKOFF_JITTER));
        Duration::from_secs_f64(capped * factor).min(self.max_delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

/// Sends batches and classifies the results
pub struct SubmissionEngine {
    client: Arc<dyn IndexClient>,
    policy: RetryPolicy,
}

impl SubmissionEngine {
    pub fn new(client: Arc<dyn IndexClient>, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    /// Submits `batch`, retrying transient failures
    ///
    /// Backoff state is local to the call, so every batch starts from the base delay.
    pub async fn submit(&self, batch: &Batch) -> BatchOutcome {
        let max_attempts = self.policy.max_attempts;
        let mut attempt = 0;

        loop {
            attempt += 1;

            match self.client.submit(batch).await {
                Ok(results) => {
                    return BatchOutcome {
                        sequence: batch.sequence(),
                        attempts: attempt,
                        items: match_results(batch, results),
                    };
                }
                Err(e) if self.policy.is_transient(&e) && attempt < max_attempts => {
                    let delay = self.policy.delay(attempt);
                    log_retry_attempt!(batch.sequence(), attempt, max_attempts, delay, &e);
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    let reason = if self.policy.is_transient(&e) {
                        format!("giving up after {attempt} attempts: {e}")
                    } else {
                        e.to_string()
                    };

                    tracing::error!(
                        sequence = batch.sequence(),
                        items = batch.len(),
                        attempts = attempt,
                        error = %e,
                        "Bulk request failed; failing every item in the batch"
                    );

                    let detail = FailureDetail::new(e.status(), reason);
                    return BatchOutcome {
                        sequence: batch.sequence(),
                        attempts: attempt,
                        items: fail_all(batch, &detail),
                    };
                }
            }
        }
    }
}

fn fail_all(batch: &Batch, detail: &FailureDetail) -> Vec<ItemOutcome> {
    batch
        .items()
        .iter()
        .map(|item| ItemOutcome {
            id: item.id.clone(),
            source: item.source.clone(),
            outcome: Outcome::Failure(detail.clone()),
        })
        .collect()
}

// Pairs response items with batch items by id; ids may repeat within a batch.
fn match_results(batch: &Batch, results: Vec<ItemResult>) -> Vec<ItemOutcome> {
    let mut by_id: HashMap<DocumentId, VecDeque<ItemStatus>> = HashMap::new();
    for result in results {
        by_id.entry(result.id).or_default().push_back(result.status);
    }

    batch
        .items()
        .iter()
        .map(|item| {
            let outcome = by_id
                .get_mut(&item.id)
                .and_then(VecDeque::pop_front)
                .map(Outcome::from)
                .unwrap_or_else(|| {
                    Outcome::Failure(FailureDetail::new(None, "missing from bulk response"))
                });

            ItemOutcome {
                id: item.id.clone(),
                source: item.source.clone(),
                outcome,
            }
        })
        .collect()
}
