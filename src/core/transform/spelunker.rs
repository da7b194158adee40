//! Composite stages producing documents for the spelunker

use super::{concordances, names, placetypes, properties};
use crate::domain::{Document, DocumentError};

/// Name stats, concordance stats and placetype details, in that order
pub fn append_spelunker_v1(document: Document) -> Result<Document, DocumentError> {
    let document = names::append_name_stats(document)?;
    let document = concordances::append_concordance_stats(document)?;
    placetypes::append_placetype_details(document)
}

/// Reduces the feature to its properties, then runs [`append_spelunker_v1`] on them
pub fn prepare_spelunker_v1(document: Document) -> Result<Document, DocumentError> {
    append_spelunker_v1(properties::extract_properties(document)?)
}
