//! Concordance statistics

use crate::domain::{schema, Document, DocumentError};
use serde_json::{json, Value};

/// Appends `wof:concordances_sources` (sorted source keys) and `counts:concordances_total`
///
/// # Errors
///
/// Returns [`DocumentError::MissingField`] if there is no `wof:concordances` member, and
/// [`DocumentError::Stage`] if it is not an object.
pub fn append_concordance_stats(mut document: Document) -> Result<Document, DocumentError> {
    let concordances = document
        .stats_root()
        .and_then(|root| root.get(schema::WOF_CONCORDANCES))
        .ok_or_else(|| DocumentError::MissingField(schema::WOF_CONCORDANCES.to_string()))?;

    let Value::Object(concordances) = concordances else {
        return Err(DocumentError::Stage {
            stage: "append-concordance-stats".to_string(),
            message: format!("{} is not an object", schema::WOF_CONCORDANCES),
        });
    };

    // serde_json maps iterate in key order
    let sources: Vec<String> = concordances.keys().cloned().collect();
    let total = sources.len();

    document.set_stat(schema::WOF_CONCORDANCES_SOURCES, json!(sources))?;
    document.set_stat(schema::COUNTS_CONCORDANCES_TOTAL, json!(total))?;

    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_concordance_stats() {
        let doc = Document::from_value(json!({
            "properties": {
                "wof:concordances": {
                    "wd:id": "Q340",
                    "gn:id": 6077243,
                    "qs_pg:id": 268163
                }
            }
        }));

        let out = append_concordance_stats(doc).unwrap().into_value();
        assert_eq!(
            out["properties"]["wof:concordances_sources"],
            json!(["gn:id", "qs_pg:id", "wd:id"])
        );
        assert_eq!(out["properties"]["counts:concordances_total"], json!(3));
    }

    #[test]
    fn test_empty_concordances() {
        let doc = Document::from_value(json!({"properties": {"wof:concordances": {}}}));
        let out = append_concordance_stats(doc).unwrap().into_value();
        assert_eq!(out["properties"]["wof:concordances_sources"], json!([]));
        assert_eq!(out["properties"]["counts:concordances_total"], json!(0));
    }

    #[test]
    fn test_missing_concordances() {
        let doc = Document::from_value(json!({"properties": {"wof:id": 1}}));
        assert_eq!(
            append_concordance_stats(doc),
            Err(DocumentError::MissingField("wof:concordances".to_string()))
        );
    }

    #[test]
    fn test_non_object_concordances() {
        let doc = Document::from_value(json!({"properties": {"wof:concordances": []}}));
        assert!(matches!(
            append_concordance_stats(doc),
            Err(DocumentError::Stage { .. })
        ));
    }

    #[test]
    fn test_idempotent() {
        let doc = Document::from_value(json!({"wof:concordances": {"gn:id": 1}}));
        let once = append_concordance_stats(doc).unwrap();
        let twice = append_concordance_stats(once.clone()).unwrap();
        assert_eq!(once, twice);
    }
}
