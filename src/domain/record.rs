//! Records read from a source and documents prepared for indexing

use crate::domain::ids::DocumentId;

/// One raw input unit as produced by a record source
///
/// The path is an opaque identity string used in logs and failure reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub path: String,
    pub body: Vec<u8>,
}

impl Record {
    pub fn new(path: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            body: body.into(),
        }
    }
}

/// A record that passed identifier resolution and the transform pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedDocument {
    /// Resolved backend key
    pub id: DocumentId,

    /// Compact JSON body
    pub body: Vec<u8>,

    /// Whether this is an alternate geometry
    pub is_variant: bool,

    /// Source path of the record it was prepared from
    pub source: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_new() {
        let record = Record::new("data/101/736/545/101736545.geojson", b"{}".to_vec());
        assert_eq!(record.path, "data/101/736/545/101736545.geojson");
        assert_eq!(record.body, b"{}");
    }
}
