//! Extract-properties stage

use crate::domain::{Document, DocumentError};

/// Replaces the document with its `properties` object
///
/// # Errors
///
/// Returns [`DocumentError::MissingField`] if the document has no `properties` member.
pub fn extract_properties(document: Document) -> Result<Document, DocumentError> {
    document.into_properties()
}
