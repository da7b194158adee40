//! Identifier resolution
//!
//! Derives the backend document key from a parsed record and applies the alternate geometry
//! policy. Resolution is a pure function of the document and [`ResolverConfig`].

use crate::config::IndexingConfig;
use crate::domain::{DocumentError, DocumentId, Document, FieldPath, IndexerError, Result};
use serde_json::Value;

/// Identifier resolver settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    pub id_field: FieldPath,
    pub alt_label_field: FieldPath,
    pub include_alternates: bool,
}

impl ResolverConfig {
    /// Builds resolver settings from the `[indexing]` section
    pub fn from_indexing(config: &IndexingConfig) -> Result<Self> {
        let id_field = FieldPath::parse(&config.id_field)
            .map_err(|e| IndexerError::Configuration(format!("indexing.id_field: {e}")))?;
        let alt_label_field = FieldPath::parse(&config.alt_label_field)
            .map_err(|e| IndexerError::Configuration(format!("indexing.alt_label_field: {e}")))?;

        Ok(Self {
            id_field,
            alt_label_field,
            include_alternates: config.include_alternates,
        })
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        use crate::domain::schema;

        Self {
            id_field: FieldPath::from_segments(&[schema::PROPERTIES, schema::WOF_ID]),
            alt_label_field: FieldPath::from_segments(&[schema::PROPERTIES, schema::ALT_LABEL]),
            include_alternates: false,
        }
    }
}

/// What to do with a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Index under `id`
    Index { id: DocumentId, is_variant: bool },
    /// Alternate geometry excluded by policy; not a failure
    Skip { alt_label: String },
}

/// Resolves document ids from record contents
#[derive(Debug, Clone, Default)]
pub struct IdentifierResolver {
    config: ResolverConfig,
}

impl IdentifierResolver {
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    /// Resolves the id of `document`
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::MissingIdentifier`] if the id field is absent or not an
    /// integral number.
    ///
    /// # Examples
    ///
    /// ```
    /// use geoindex::core::identifier::{IdentifierResolver, Resolution, ResolverConfig};
    /// use geoindex::domain::Document;
    /// use serde_json::json;
    ///
    /// let resolver = IdentifierResolver::new(ResolverConfig {
    ///     include_alternates: true,
    ///     ..Default::default()
    /// });
    /// let doc = Document::from_value(json!({
    ///     "properties": {"wof:id": 42, "src:alt_label": "b"}
    /// }));
    ///
    /// match resolver.resolve(&doc).unwrap() {
    ///     Resolution::Index { id, is_variant } => {
    ///         assert_eq!(id.as_str(), "42-b");
    ///         assert!(is_variant);
    ///     }
    ///     Resolution::Skip { .. } => unreachable!(),
    /// }
    /// ```
    pub fn resolve(&self, document: &Document) -> std::result::Result<Resolution, DocumentError> {
        let feature_id = document
            .get(&self.config.id_field)
            .and_then(numeric_id)
            .ok_or_else(|| DocumentError::MissingIdentifier(self.config.id_field.to_string()))?;

        let alt_label = match document.get(&self.config.alt_label_field) {
            None | Some(Value::Null) => None,
            Some(Value::String(label)) => Some(label.clone()),
            Some(other) => Some(other.to_string()),
        };

        let resolution = match alt_label {
            None => Resolution::Index {
                id: DocumentId::primary(feature_id),
                is_variant: false,
            },
            Some(alt_label) if !self.config.include_alternates => Resolution::Skip { alt_label },
            Some(alt_label) => Resolution::Index {
                id: DocumentId::variant(feature_id, &alt_label),
                is_variant: true,
            },
        };

        Ok(resolution)
    }
}

// Integers, or floats without a fractional part that fit in an i64.
fn numeric_id(value: &Value) -> Option<i64> {
    let Value::Number(number) = value else {
        return None;
    };

    if let Some(id) = number.as_i64() {
        return Some(id);
    }
    if let Some(id) = number.as_u64() {
        return i64::try_from(id).ok();
    }

    // i64::MAX as f64 rounds up to 2^63, which is already out of range.
    let float = number.as_f64()?;
    if float.fract() == 0.0 && float >= i64::MIN as f64 && float < i64::MAX as f64 {
        Some(float as i64)
    } else {
        None
    }
}
