//! Document identifier newtype
//!
//! The resolved document id is the backend's natural key. Re-submitting a record with the same
//! id overwrites the previous document, which is what makes retries and replays safe.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Search backend document identifier
///
/// Either the decimal form of a numeric feature id (`"101736545"`) or, for alternate
/// geometries, the id followed by the alternate label (`"101736545-quattroshapes"`).
///
/// # Examples
///
/// ```
/// use geoindex::domain::ids::DocumentId;
///
/// let id = DocumentId::variant(42, "b");
/// assert_eq!(id.as_str(), "42-b");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocumentId(String);

impl DocumentId {
    /// Id for a primary (non-alternate) record
    pub fn primary(feature_id: i64) -> Self {
        Self(feature_id.to_string())
    }

    /// Id for an alternate geometry record; the label is used verbatim
    pub fn variant(feature_id: i64, alt_label: &str) -> Self {
        Self(format!("{feature_id}-{alt_label}"))
    }

    /// Creates a DocumentId from an already-formatted string
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Document ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DocumentId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for DocumentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_id() {
        assert_eq!(DocumentId::primary(101736545).as_str(), "101736545");
        assert_eq!(DocumentId::primary(-1).as_str(), "-1");
    }

    #[test]
    fn test_variant_id_keeps_label_verbatim() {
        let id = DocumentId::variant(85632705, "uscensus-display-terrestrial-zoom-10");
        assert_eq!(id.as_str(), "85632705-uscensus-display-terrestrial-zoom-10");
        assert_eq!(DocumentId::variant(1, "Mixed Case").as_str(), "1-Mixed Case");
    }

    #[test]
    fn test_document_id_empty() {
        assert!(DocumentId::new("").is_err());
        assert!(DocumentId::new("   ").is_err());
        assert!(DocumentId::from_str("42").is_ok());
    }

    #[test]
    fn test_document_id_display() {
        let id = DocumentId::variant(42, "b");
        assert_eq!(format!("{id}"), "42-b");
    }
}
