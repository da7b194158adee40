//! Placetype details
//!
//! Looks up the feature's `wof:placetype` in the Who's On First placetype table and records
//! its numeric id.

use crate::domain::{schema, Document, DocumentError};
use serde_json::{json, Value};

/// A Who's On First placetype
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placetype {
    pub name: &'static str,
    pub id: i64,
}

const PLACETYPES: &[Placetype] = &[
    Placetype { name: "planet", id: 102312341 },
    Placetype { name: "ocean", id: 404528271 },
    Placetype { name: "marinearea", id: 404528273 },
    Placetype { name: "continent", id: 102312309 },
    Placetype { name: "empire", id: 136057795 },
    Placetype { name: "country", id: 102312307 },
    Placetype { name: "dependency", id: 102312305 },
    Placetype { name: "disputed", id: 102322043 },
    Placetype { name: "macroregion", id: 404221409 },
    Placetype { name: "region", id: 102312299 },
    Placetype { name: "macrocounty", id: 102312313 },
    Placetype { name: "county", id: 102312315 },
    Placetype { name: "localadmin", id: 404221411 },
    Placetype { name: "locality", id: 102312317 },
    Placetype { name: "borough", id: 421205763 },
    Placetype { name: "macrohood", id: 1108906905 },
    Placetype { name: "neighbourhood", id: 102312319 },
    Placetype { name: "microhood", id: 102312321 },
    Placetype { name: "campus", id: 102312331 },
    Placetype { name: "building", id: 102312329 },
    Placetype { name: "address", id: 102312327 },
    Placetype { name: "venue", id: 102312325 },
    Placetype { name: "intersection", id: 1108746739 },
    Placetype { name: "postalcode", id: 102312323 },
    Placetype { name: "timezone", id: 136057793 },
];

/// Looks up a placetype by name
pub fn lookup(name: &str) -> Option<Placetype> {
    PLACETYPES.iter().copied().find(|pt| pt.name == name)
}

/// Appends `wof:placetype_id` and `wof:placetype_names`
///
/// Unknown placetype names leave the document unchanged.
///
/// # Errors
///
/// Returns [`DocumentError::MissingField`] if there is no `wof:placetype` member.
pub fn append_placetype_details(mut document: Document) -> Result<Document, DocumentError> {
    let value = document
        .stats_root()
        .and_then(|root| root.get(schema::WOF_PLACETYPE))
        .ok_or_else(|| DocumentError::MissingField(schema::WOF_PLACETYPE.to_string()))?;

    let Some(placetype) = value.as_str().and_then(lookup) else {
        return Ok(document);
    };

    document.set_stat(schema::WOF_PLACETYPE_ID, Value::from(placetype.id))?;
    document.set_stat(schema::WOF_PLACETYPE_NAMES, json!([placetype.name]))?;

    Ok(document)
}
