//! Domain models and types for geoindex.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Records** ([`Record`]) as read from a source, [`PreparedDocument`]s ready for a batch,
//!   and the [`Batch`]es they are submitted in
//! - **Documents** ([`Document`]) with typed field access through [`FieldPath`]
//! - **Identifiers** ([`DocumentId`]) used as the backend's natural key
//! - **Error types** ([`IndexerError`], [`DocumentError`], [`BackendError`])
//! - **Result type alias** ([`Result`]) and [`context::ResultExt`] for attaching context
//!
//! # Error Handling
//!
//! Fallible run-level operations return [`Result<T, IndexerError>`]. Per-record problems are
//! [`DocumentError`]s and never abort a run:
//!
//! ```rust
//! use geoindex::domain::{Document, DocumentError};
//!
//! let result = Document::from_slice(b"not json");
//! assert!(matches!(result, Err(DocumentError::InvalidJson(_))));
//! ```

pub mod batch;
pub mod context;
pub mod document;
pub mod errors;
pub mod ids;
pub mod record;
pub mod result;

// Re-export commonly used types for convenience
pub use batch::{Batch, BatchItem};
pub use document::{schema, Document, FieldPath};
pub use errors::{BackendError, DocumentError, IndexerError};
pub use ids::DocumentId;
pub use record::{PreparedDocument, Record};
pub use result::Result;
