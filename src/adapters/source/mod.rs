//! Record sources
//!
//! A [`RecordSource`] produces the raw records the coordinator indexes. An `Err` item in the
//! stream is a fatal I/O error that ends the run; problems with a record's contents are found
//! later, during preparation, and never travel through the source.

pub mod filesystem;

pub use filesystem::FilesystemSource;

use crate::domain::{Record, Result};
use futures::stream::BoxStream;

/// Stream of raw records
pub trait RecordSource: Send + Sync {
    /// Starts reading records
    fn records(&self) -> BoxStream<'_, Result<Record>>;
}

impl RecordSource for Vec<Record> {
    fn records(&self) -> BoxStream<'_, Result<Record>> {
        use futures::StreamExt;

        futures::stream::iter(self.iter().cloned().map(Ok)).boxed()
    }
}
