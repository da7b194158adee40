//! Name translation statistics
//!
//! Who's On First stores names as `name:<lang>_x_<qualifier>` arrays, e.g.
//! `name:fra_x_preferred`. This stage counts them per qualifier and records which languages
//! have names.

use crate::domain::{schema, Document, DocumentError};
use serde_json::{json, Value};
use std::collections::BTreeSet;

const QUALIFIER_PREFERRED: &str = "prefered";
const QUALIFIER_VARIANT: &str = "variant";
const QUALIFIER_COLLOQUIAL: &str = "colloquial";

#[derive(Debug, Default, PartialEq, Eq)]
struct NameStats {
    translations: BTreeSet<String>,
    languages: BTreeSet<String>,
    total: usize,
    preferred: usize,
    variant: usize,
    colloquial: usize,
}

impl NameStats {
    fn collect(document: &Document) -> Self {
        let mut stats = NameStats::default();

        let Some(root) = document.stats_root() else {
            return stats;
        };

        for (key, value) in root {
            let Some(suffix) = key.strip_prefix(schema::NAME_PREFIX) else {
                continue;
            };

            let mut parts = suffix.split(schema::NAME_QUALIFIER_SEPARATOR);
            let (Some(lang), Some(qualifier)) = (parts.next(), parts.next()) else {
                continue;
            };

            let Value::Array(names) = value else {
                continue;
            };

            stats.translations.insert(suffix.to_string());
            stats.translations.insert(lang.to_string());
            stats.languages.insert(lang.to_string());

            let count = names.len();
            stats.total += count;

            match qualifier {
                QUALIFIER_PREFERRED => stats.preferred += count,
                QUALIFIER_VARIANT => stats.variant += count,
                QUALIFIER_COLLOQUIAL => stats.colloquial += count,
                _ => {}
            }
        }

        stats
    }
}

/// Appends `translations` and the `counts:names_*` fields
pub fn append_name_stats(mut document: Document) -> Result<Document, DocumentError> {
    let stats = NameStats::collect(&document);

    document.set_stat(schema::TRANSLATIONS, json!(stats.translations))?;
    document.set_stat(schema::COUNTS_NAMES_TOTAL, json!(stats.total))?;
    document.set_stat(schema::COUNTS_NAMES_PREFERED, json!(stats.preferred))?;
    document.set_stat(schema::COUNTS_NAMES_VARIANT, json!(stats.variant))?;
    document.set_stat(schema::COUNTS_NAMES_COLLOQUIAL, json!(stats.colloquial))?;
    document.set_stat(schema::COUNTS_NAMES_LANGUAGES, json!(stats.languages.len()))?;

    Ok(document)
}
