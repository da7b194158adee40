//! Domain error types
//!
//! This module defines the error hierarchy for geoindex. Run-level errors halt the run,
//! document-level errors are recorded per record, and backend errors are classified by
//! the submission engine into transient or permanent failures.
//! None of these expose third-party types.

use thiserror::Error;

/// Main geoindex error type
///
/// Only configuration errors, fatal I/O errors and shutdown halt a run. Everything else is
/// recovered into run statistics.
#[derive(Debug, Error)]
pub enum IndexerError {
    /// Invalid or incompatible configuration, including pipeline stage selection
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A record could not be read from its source
    #[error("I/O error: {0}")]
    Io(String),

    /// Record source failures other than plain I/O
    #[error("Source error: {0}")]
    Source(String),

    /// Search backend errors surfaced outside of batch submission
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Per-document errors when surfaced directly
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The batch accumulator was used after it was closed
    #[error("Shutdown error: {0}")]
    Shutdown(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Per-document business errors
///
/// These never abort a run. The coordinator records them as a failed outcome together with
/// the record's source path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    /// The configured identifier field is absent or not numeric
    #[error("missing or non-numeric identifier at {0}")]
    MissingIdentifier(String),

    /// A stage expected a parent object or field that is not there
    #[error("missing {0} property")]
    MissingField(String),

    /// The record body is not valid JSON
    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    /// A transform stage failed for another reason
    #[error("stage {stage} failed: {message}")]
    Stage { stage: String, message: String },
}

/// Search backend errors
///
/// Returned by [`crate::adapters::backend::IndexClient`] implementations. Whether an error
/// is retried is decided by the submission engine, not by the client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// Could not reach the backend
    #[error("Failed to connect to search backend: {0}")]
    ConnectionFailed(String),

    /// The request timed out
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// The backend answered with a non-success status
    #[error("Backend returned status {status}: {message}")]
    Status { status: u16, message: String },

    /// The backend answered with a body we could not interpret
    #[error("Invalid response from backend: {0}")]
    InvalidResponse(String),
}

impl BackendError {
    /// HTTP status carried by this error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            BackendError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<std::io::Error> for IndexerError {
    fn from(err: std::io::Error) -> Self {
        IndexerError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for IndexerError {
    fn from(err: serde_json::Error) -> Self {
        IndexerError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for IndexerError {
    fn from(err: toml::de::Error) -> Self {
        IndexerError::Configuration(format!("TOML parse error: {err}"))
    }
}
