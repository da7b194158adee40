//! Document transform pipeline
//!
//! A [`Pipeline`] is an ordered list of [`StageKind`]s, validated once when it is built. Each
//! stage is a pure function from [`Document`] to [`Document`] that either rewrites the body or
//! fails the record. Three classes of stage exist:
//!
//! - **Extract properties only**: replace the body with its `properties` object
//! - **Full document append**: add derived statistics to the full feature
//! - **Properties replace**: extract properties, then add derived statistics to what is left
//!
//! Mixing an extracting stage with an appending stage is rejected at construction, because
//! the appending stage would then see a body shape it was not selected for.

pub mod concordances;
pub mod names;
pub mod placetypes;
pub mod properties;
pub mod spelunker;

use crate::domain::{Document, DocumentError, IndexerError, Result};
use std::fmt;
use std::str::FromStr;

/// A transform stage selectable by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageKind {
    /// `extract-properties`
    ExtractProperties,
    /// `append-name-stats`
    AppendNameStats,
    /// `append-concordance-stats`
    AppendConcordanceStats,
    /// `append-placetype-details`
    AppendPlacetypeDetails,
    /// `append-spelunker-v1`: names, concordances and placetype in that order
    AppendSpelunkerV1,
    /// `spelunker-v1`: extract properties, then `append-spelunker-v1`
    SpelunkerV1,
}

/// How a stage treats the shape of the document body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageClass {
    ExtractPropertiesOnly,
    FullDocumentAppend,
    PropertiesReplace,
}

impl StageKind {
    pub const ALL: [StageKind; 6] = [
        StageKind::ExtractProperties,
        StageKind::AppendNameStats,
        StageKind::AppendConcordanceStats,
        StageKind::AppendPlacetypeDetails,
        StageKind::AppendSpelunkerV1,
        StageKind::SpelunkerV1,
    ];

    /// Configuration name of the stage
    pub fn name(&self) -> &'static str {
        match self {
            StageKind::ExtractProperties => "extract-properties",
            StageKind::AppendNameStats => "append-name-stats",
            StageKind::AppendConcordanceStats => "append-concordance-stats",
            StageKind::AppendPlacetypeDetails => "append-placetype-details",
            StageKind::AppendSpelunkerV1 => "append-spelunker-v1",
            StageKind::SpelunkerV1 => "spelunker-v1",
        }
    }

    pub fn class(&self) -> StageClass {
        match self {
            StageKind::ExtractProperties => StageClass::ExtractPropertiesOnly,
            StageKind::SpelunkerV1 => StageClass::PropertiesReplace,
            StageKind::AppendNameStats
            | StageKind::AppendConcordanceStats
            | StageKind::AppendPlacetypeDetails
            | StageKind::AppendSpelunkerV1 => StageClass::FullDocumentAppend,
        }
    }

    /// Runs this stage against one document
    pub fn apply(&self, document: Document) -> std::result::Result<Document, DocumentError> {
        match self {
            StageKind::ExtractProperties => properties::extract_properties(document),
            StageKind::AppendNameStats => names::append_name_stats(document),
            StageKind::AppendConcordanceStats => concordances::append_concordance_stats(document),
            StageKind::AppendPlacetypeDetails => placetypes::append_placetype_details(document),
            StageKind::AppendSpelunkerV1 => spelunker::append_spelunker_v1(document),
            StageKind::SpelunkerV1 => spelunker::prepare_spelunker_v1(document),
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StageKind {
    type Err = IndexerError;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim().to_lowercase();
        StageKind::ALL
            .into_iter()
            .find(|kind| kind.name() == name)
            .ok_or_else(|| {
                let known: Vec<&str> = StageKind::ALL.iter().map(StageKind::name).collect();
                IndexerError::Configuration(format!(
                    "Unknown pipeline stage '{s}'. Expected one of: {}",
                    known.join(", ")
                ))
            })
    }
}

/// Validated, ordered chain of transform stages
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pipeline {
    stages: Vec<StageKind>,
}

impl Pipeline {
    /// Validates a stage selection
    ///
    /// # Errors
    ///
    /// Returns [`IndexerError::Configuration`] if a stage is listed twice, if
    /// `extract-properties` is combined with an appending stage, or if `spelunker-v1` is
    /// combined with any stage that extracts or appends.
    pub fn new(stages: Vec<StageKind>) -> Result<Self> {
        for (i, stage) in stages.iter().enumerate() {
            if stages[..i].contains(stage) {
                return Err(IndexerError::Configuration(format!(
                    "Pipeline stage '{stage}' is listed more than once"
                )));
            }
        }

        let has = |class: StageClass| stages.iter().any(|s| s.class() == class);
        let extracts = has(StageClass::ExtractPropertiesOnly);
        let appends = has(StageClass::FullDocumentAppend);
        let replaces = has(StageClass::PropertiesReplace);

        if replaces && (extracts || appends) {
            return Err(IndexerError::Configuration(format!(
                "'{}' already extracts properties and appends derived statistics; it cannot be combined with other extract or append stages",
                StageKind::SpelunkerV1
            )));
        }

        if extracts && appends {
            return Err(IndexerError::Configuration(format!(
                "'{}' cannot be combined with stages that append to the full document",
                StageKind::ExtractProperties
            )));
        }

        Ok(Self { stages })
    }

    /// Parses and validates stage names
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self> {
        let stages = names
            .iter()
            .map(|name| name.as_ref().parse())
            .collect::<Result<Vec<StageKind>>>()?;
        Self::new(stages)
    }

    pub fn stages(&self) -> &[StageKind] {
        &self.stages
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Runs every stage in order; the first failing stage abandons the document
    pub fn apply(&self, document: Document) -> std::result::Result<Document, DocumentError> {
        self.stages
            .iter()
            .try_fold(document, |doc, stage| stage.apply(doc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    #[test]
    fn test_stage_names_round_trip() {
        for kind in StageKind::ALL {
            assert_eq!(kind.name().parse::<StageKind>().unwrap(), kind);
        }
        assert!("flatten".parse::<StageKind>().is_err());
    }

    #[test]
    fn test_stage_name_parse_is_lenient_on_case() {
        assert_eq!(
            " Spelunker-V1 ".parse::<StageKind>().unwrap(),
            StageKind::SpelunkerV1
        );
    }

    #[test_case(&["extract-properties"] ; "extract alone")]
    #[test_case(&["append-name-stats", "append-placetype-details"] ; "appends")]
    #[test_case(&["spelunker-v1"] ; "spelunker alone")]
    #[test_case(&[] ; "empty")]
    fn test_valid_selections(names: &[&str]) {
        assert!(Pipeline::from_names(names).is_ok());
    }

    #[test_case(&["extract-properties", "append-name-stats"] ; "extract with append")]
    #[test_case(&["append-spelunker-v1", "extract-properties"] ; "append before extract")]
    #[test_case(&["spelunker-v1", "extract-properties"] ; "spelunker with extract")]
    #[test_case(&["spelunker-v1", "append-concordance-stats"] ; "spelunker with append")]
    #[test_case(&["append-name-stats", "append-name-stats"] ; "duplicate")]
    #[test_case(&["append-names"] ; "unknown")]
    fn test_invalid_selections(names: &[&str]) {
        assert!(matches!(
            Pipeline::from_names(names),
            Err(IndexerError::Configuration(_))
        ));
    }

    #[test]
    fn test_empty_pipeline_is_identity() {
        let doc = Document::from_value(json!({"properties": {"wof:id": 1}}));
        assert_eq!(Pipeline::default().apply(doc.clone()).unwrap(), doc);
    }

    #[test]
    fn test_stages_run_in_order() {
        let pipeline = Pipeline::from_names(&[
            "append-concordance-stats",
            "append-placetype-details",
        ])
        .unwrap();

        let doc = Document::from_value(json!({
            "properties": {
                "wof:placetype": "country",
                "wof:concordances": {"gn:id": 1, "wd:id": "Q30"}
            }
        }));

        let out = pipeline.apply(doc).unwrap().into_value();
        assert_eq!(out["properties"]["counts:concordances_total"], json!(2));
        assert_eq!(out["properties"]["wof:placetype_id"], json!(102312307));
    }

    #[test]
    fn test_stage_failure_abandons_document() {
        let pipeline = Pipeline::from_names(&["append-placetype-details"]).unwrap();
        let doc = Document::from_value(json!({"properties": {}}));
        assert_eq!(
            pipeline.apply(doc),
            Err(DocumentError::MissingField("wof:placetype".to_string()))
        );
    }
}
