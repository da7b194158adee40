//! Error context extension trait
//!
//! Works like `anyhow::Context` but keeps [`IndexerError`] as the error type, so library code
//! can attach the record path or config file to an error without losing the error class the
//! binary maps to an exit code.
//!
//! # Examples
//!
//! ```rust
//! use geoindex::domain::Result;
//! use geoindex::domain::context::ResultExt;
//!
//! fn read_feature(path: &str) -> Result<Vec<u8>> {
//!     std::fs::read(path).with_context(|| format!("Failed to read {path}"))
//! }
//! ```

use crate::domain::errors::IndexerError;
use crate::domain::result::Result;

/// Extension trait for adding context to `Result` types
pub trait ResultExt<T> {
    /// Add context to an error
    fn context<C>(self, context: C) -> Result<T>
    where
        C: std::fmt::Display + Send + Sync + 'static;

    /// Add context computed only when an error occurs
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: std::fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<IndexerError>,
{
    fn context<C>(self, context: C) -> Result<T>
    where
        C: std::fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|e| wrap(e.into(), context))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: std::fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|e| wrap(e.into(), f()))
    }
}

// Configuration and I/O errors keep their variant; exit codes depend on it.
fn wrap(base: IndexerError, context: impl std::fmt::Display) -> IndexerError {
    match base {
        IndexerError::Configuration(msg) => IndexerError::Configuration(format!("{context}: {msg}")),
        IndexerError::Io(msg) => IndexerError::Io(format!("{context}: {msg}")),
        IndexerError::Source(msg) => IndexerError::Source(format!("{context}: {msg}")),
        other => IndexerError::Other(format!("{context}: {other}")),
    }
}
