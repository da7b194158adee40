//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Console output filtered by level or `RUST_LOG`
//! - JSON-formatted log files with rotation
//! - Macros for the events every run emits
//!
//! # Example
//!
//! ```no_run
//! use geoindex::logging::init_logging;
//! use geoindex::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log a batch being handed to the submission engine
///
/// # Example
///
/// ```no_run
/// use geoindex::log_batch_flush;
///
/// log_batch_flush!(7, 1000, 4_812_339, "count");
/// ```
#[macro_export]
macro_rules! log_batch_flush {
    ($sequence:expr, $items:expr, $bytes:expr, $trigger:expr) => {
        tracing::debug!(
            batch = $sequence,
            items = $items,
            bytes = $bytes,
            trigger = $trigger,
            "Flushing batch"
        );
    };
}

/// Log a retry attempt for a batch submission
///
/// # Example
///
/// ```no_run
/// use geoindex::log_retry_attempt;
/// use std::time::Duration;
///
/// log_retry_attempt!(3, 2, 5, Duration::from_millis(800), "HTTP 503");
/// ```
#[macro_export]
macro_rules! log_retry_attempt {
    ($sequence:expr, $attempt:expr, $max_attempts:expr, $delay:expr, $reason:expr) => {
        tracing::warn!(
            batch = $sequence,
            attempt = $attempt,
            max_attempts = $max_attempts,
            delay_ms = $delay.as_millis() as u64,
            reason = %$reason,
            "Retrying batch submission"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use geoindex::log_error_with_context;
/// use geoindex::domain::IndexerError;
///
/// let error = IndexerError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    #[test]
    fn test_macros_expand() {
        // Without a subscriber these are no-ops; this checks the expansions type-check.
        log_batch_flush!(1_u64, 2_usize, 128_usize, "close");
        log_retry_attempt!(1_u64, 1_u32, 5_u32, Duration::from_millis(500), "timeout");
        log_error_with_context!(
            crate::domain::IndexerError::Other("boom".to_string()),
            "test"
        );
    }
}
