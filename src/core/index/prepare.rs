//! Record preparation: parse, resolve the id, run the transform pipeline, re-encode

use crate::core::identifier::{IdentifierResolver, Resolution};
use crate::core::transform::Pipeline;
use crate::domain::{Document, DocumentError, PreparedDocument, Record};

/// Result of preparing one record
#[derive(Debug, Clone, PartialEq)]
pub enum Prepared {
    Document(PreparedDocument),
    /// Alternate geometry excluded by policy
    Skipped { alt_label: String },
    Failed(DocumentError),
}

/// Turns raw records into documents ready for a batch
///
/// Preparation is pure CPU work and holds no shared state, so one `Preparer` can be cloned into
/// as many blocking tasks as needed.
#[derive(Debug, Clone)]
pub struct Preparer {
    resolver: IdentifierResolver,
    pipeline: Pipeline,
}

impl Preparer {
    pub fn new(resolver: IdentifierResolver, pipeline: Pipeline) -> Self {
        Self { resolver, pipeline }
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn prepare(&self, record: Record) -> Prepared {
        match self.try_prepare(&record) {
            Ok(prepared) => prepared,
            Err(e) => Prepared::Failed(e),
        }
    }

    fn try_prepare(&self, record: &Record) -> Result<Prepared, DocumentError> {
        let document = Document::from_slice(&record.body)?;

        let (id, is_variant) = match self.resolver.resolve(&document)? {
            Resolution::Index { id, is_variant } => (id, is_variant),
            Resolution::Skip { alt_label } => return Ok(Prepared::Skipped { alt_label }),
        };

        let body = self.pipeline.apply(document)?.to_vec()?;

        Ok(Prepared::Document(PreparedDocument {
            id,
            body,
            is_variant,
            source: record.path.clone(),
        }))
    }
}
