//! Batch indexing
//!
//! - [`coordinator`] - drives a run from a record source to a [`RunReport`]
//! - [`prepare`] - parses a record, resolves its id and runs the transform pipeline
//! - [`batch`] - bounded batch accumulation with count, byte and interval flushes
//! - [`submit`] - bulk submission with retry and per-item outcomes
//! - [`stats`] - concurrent run counters

pub mod batch;
pub mod coordinator;
pub mod prepare;
pub mod stats;
pub mod submit;

pub use batch::{BatchAccumulator, BatchLimits, FlushTrigger};
pub use coordinator::IndexCoordinator;
pub use prepare::{Prepared, Preparer};
pub use stats::{RunReport, StatsAggregator};
pub use submit::{
    BatchOutcome, FailureDetail, ItemOutcome, Outcome, RetryPolicy, SubmissionEngine, SuccessKind,
};
