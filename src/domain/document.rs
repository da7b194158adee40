//! Feature documents and typed field access
//!
//! A [`Document`] is the parsed JSON tree of one GeoJSON feature. Fields are addressed with
//! [`FieldPath`] values built from the key constants in [`schema`] rather than ad hoc string
//! concatenation.

use crate::domain::errors::DocumentError;
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Key names of the Who's On First feature schema used by the indexer
pub mod schema {
    /// GeoJSON properties object
    pub const PROPERTIES: &str = "properties";

    pub const WOF_ID: &str = "wof:id";
    pub const ALT_LABEL: &str = "src:alt_label";

    pub const WOF_PLACETYPE: &str = "wof:placetype";
    pub const WOF_PLACETYPE_ID: &str = "wof:placetype_id";
    pub const WOF_PLACETYPE_NAMES: &str = "wof:placetype_names";

    pub const WOF_CONCORDANCES: &str = "wof:concordances";
    pub const WOF_CONCORDANCES_SOURCES: &str = "wof:concordances_sources";
    pub const COUNTS_CONCORDANCES_TOTAL: &str = "counts:concordances_total";

    /// Prefix of `name:<lang>_x_<qualifier>` keys
    pub const NAME_PREFIX: &str = "name:";
    /// Separator between language and qualifier in name keys
    pub const NAME_QUALIFIER_SEPARATOR: &str = "_x_";
    pub const TRANSLATIONS: &str = "translations";
    pub const COUNTS_NAMES_TOTAL: &str = "counts:names_total";
    pub const COUNTS_NAMES_PREFERED: &str = "counts:names_prefered";
    pub const COUNTS_NAMES_VARIANT: &str = "counts:names_variant";
    pub const COUNTS_NAMES_COLLOQUIAL: &str = "counts:names_colloquial";
    pub const COUNTS_NAMES_LANGUAGES: &str = "counts:names_languages";

    /// Default location of the numeric feature id
    pub const DEFAULT_ID_FIELD: &str = "properties.wof:id";
    /// Default location of the alternate geometry label
    pub const DEFAULT_ALT_LABEL_FIELD: &str = "properties.src:alt_label";
}

/// Dotted path into a document, e.g. `properties.wof:id`
///
/// Segments may contain `:` (Who's On First keys do), but not `.`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    /// Parses a dotted path
    ///
    /// # Errors
    ///
    /// Returns an error if the path or any segment is empty.
    pub fn parse(path: &str) -> Result<Self, String> {
        if path.trim().is_empty() {
            return Err("field path cannot be empty".to_string());
        }

        let segments: Vec<String> = path.split('.').map(str::to_string).collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(format!("field path '{path}' contains an empty segment"));
        }

        Ok(Self(segments))
    }

    /// Builds a path from known-good segments
    pub fn from_segments(segments: &[&str]) -> Self {
        Self(segments.iter().map(|s| s.to_string()).collect())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

impl FromStr for FieldPath {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Parsed feature document
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: Value,
}

impl Document {
    /// Parses a document from raw bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self, DocumentError> {
        let root = serde_json::from_slice(bytes)
            .map_err(|e| DocumentError::InvalidJson(e.to_string()))?;
        Ok(Self { root })
    }

    pub fn from_value(root: Value) -> Self {
        Self { root }
    }

    /// Compact JSON encoding of the document
    pub fn to_vec(&self) -> Result<Vec<u8>, DocumentError> {
        serde_json::to_vec(&self.root).map_err(|e| DocumentError::InvalidJson(e.to_string()))
    }

    pub fn as_value(&self) -> &Value {
        &self.root
    }

    pub fn into_value(self) -> Value {
        self.root
    }

    /// Looks up the value at `path`; `None` if any segment is missing or not an object
    pub fn get(&self, path: &FieldPath) -> Option<&Value> {
        path.segments()
            .iter()
            .try_fold(&self.root, |current, segment| current.as_object()?.get(segment))
    }

    /// The `properties` object, if the document has one
    pub fn properties(&self) -> Option<&Map<String, Value>> {
        self.root.get(schema::PROPERTIES)?.as_object()
    }

    /// Object that derived statistics are read from and written to
    ///
    /// This is the `properties` object of a full feature, or the top level of a document that
    /// has already been reduced to its properties.
    pub fn stats_root(&self) -> Option<&Map<String, Value>> {
        self.properties().or_else(|| self.root.as_object())
    }

    /// Writes `value` under `key` in the statistics root, replacing any previous value
    pub fn set_stat(&mut self, key: &str, value: Value) -> Result<(), DocumentError> {
        let has_properties = self.properties().is_some();

        let target = if has_properties {
            self.root
                .get_mut(schema::PROPERTIES)
                .and_then(Value::as_object_mut)
        } else {
            self.root.as_object_mut()
        };

        match target {
            Some(map) => {
                map.insert(key.to_string(), value);
                Ok(())
            }
            None => Err(DocumentError::MissingField(schema::PROPERTIES.to_string())),
        }
    }

    /// Replaces the document with its `properties` object
    pub fn into_properties(self) -> Result<Document, DocumentError> {
        match self.root {
            Value::Object(mut map) => match map.remove(schema::PROPERTIES) {
                Some(props) => Ok(Document::from_value(props)),
                None => Err(DocumentError::MissingField(schema::PROPERTIES.to_string())),
            },
            _ => Err(DocumentError::MissingField(schema::PROPERTIES.to_string())),
        }
    }
}
