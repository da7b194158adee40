//! Batches of prepared documents
//!
//! A [`Batch`] is mutable only while it is the accumulator's open batch. Once it is swapped
//! out for submission it is shared read-only with the index client.

use crate::domain::ids::DocumentId;
use crate::domain::record::PreparedDocument;

/// One document queued for submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchItem {
    pub id: DocumentId,
    pub body: Vec<u8>,
    /// Source path, carried for failure reports
    pub source: String,
}

impl BatchItem {
    pub fn new(id: DocumentId, body: Vec<u8>, source: impl Into<String>) -> Self {
        Self {
            id,
            body,
            source: source.into(),
        }
    }

    /// Size counted against the batch byte bound
    pub fn size(&self) -> usize {
        self.body.len()
    }
}

impl From<PreparedDocument> for BatchItem {
    fn from(doc: PreparedDocument) -> Self {
        Self {
            id: doc.id,
            body: doc.body,
            source: doc.source,
        }
    }
}

/// Ordered group of items submitted in one bulk request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Batch {
    sequence: u64,
    items: Vec<BatchItem>,
    bytes: usize,
}

impl Batch {
    pub fn new(sequence: u64) -> Self {
        Self {
            sequence,
            items: Vec::new(),
            bytes: 0,
        }
    }

    /// Builds a batch from items, mostly for tests and one-off submissions
    pub fn from_items(sequence: u64, items: Vec<BatchItem>) -> Self {
        let bytes = items.iter().map(BatchItem::size).sum();
        Self {
            sequence,
            items,
            bytes,
        }
    }

    /// Monotonic number assigned by the accumulator
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn push(&mut self, item: BatchItem) {
        self.bytes += item.size();
        self.items.push(item);
    }

    pub fn items(&self) -> &[BatchItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of the item body sizes
    pub fn bytes(&self) -> usize {
        self.bytes
    }

    pub fn ids(&self) -> Vec<&str> {
        self.items.iter().map(|item| item.id.as_str()).collect()
    }
}
