//! Field mapping definition.
//!
//! A mapping is the ordered list of source columns to read and the canonical
//! field each one lands in. Order is significant: columns are cleaned in
//! sequence, and the `name` rule reads the `label` computed before it.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::error::{MappingError, MappingResult};
use crate::models::{Rank, TopField};

/// Where a source column lands in the cleaned record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    /// Top-level field of the record.
    Field(TopField),
    /// Rank inside `classification`.
    Classification(Rank),
}

impl Target {
    pub fn canonical_name(&self) -> &'static str {
        match self {
            Target::Field(field) => field.as_str(),
            Target::Classification(rank) => rank.as_str(),
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            Target::Field(_) => FieldKind::TopLevel,
            Target::Classification(_) => FieldKind::Classification,
        }
    }
}

/// Kind tag of a mapped column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    #[default]
    TopLevel,
    Classification,
}

impl FieldKind {
    fn as_str(&self) -> &'static str {
        match self {
            FieldKind::TopLevel => "top_level",
            FieldKind::Classification => "classification",
        }
    }
}

/// One `(source, canonical, kind)` triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ColumnSpec", into = "ColumnSpec")]
pub struct ColumnMapping {
    pub source: String,
    pub target: Target,
}

/// Serialized form of a [`ColumnMapping`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ColumnSpec {
    source: String,
    target: String,
    #[serde(default)]
    kind: FieldKind,
}

impl TryFrom<ColumnSpec> for ColumnMapping {
    type Error = MappingError;

    fn try_from(spec: ColumnSpec) -> Result<Self, Self::Error> {
        let target = match spec.kind {
            FieldKind::TopLevel => TopField::from_name(&spec.target).map(Target::Field),
            FieldKind::Classification => Rank::from_name(&spec.target).map(Target::Classification),
        };

        match target {
            Some(target) => Ok(ColumnMapping {
                source: spec.source,
                target,
            }),
            None => Err(MappingError::UnknownTarget {
                source_column: spec.source,
                target: spec.target,
                kind: spec.kind.as_str(),
            }),
        }
    }
}

impl From<ColumnMapping> for ColumnSpec {
    fn from(column: ColumnMapping) -> Self {
        ColumnSpec {
            kind: column.target.kind(),
            target: column.target.canonical_name().to_string(),
            source: column.source,
        }
    }
}

impl ColumnMapping {
    pub fn field(source: &str, field: TopField) -> Self {
        Self {
            source: source.to_string(),
            target: Target::Field(field),
        }
    }

    pub fn classification(source: &str, rank: Rank) -> Self {
        Self {
            source: source.to_string(),
            target: Target::Classification(rank),
        }
    }
}

/// Immutable, validated field mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "MappingFile", into = "MappingFile")]
pub struct FieldMapping {
    description: String,
    columns: Vec<ColumnMapping>,
}

/// Serialized form of a [`FieldMapping`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct MappingFile {
    #[serde(default = "default_version")]
    version: String,
    #[serde(default)]
    description: String,
    columns: Vec<ColumnMapping>,
}

fn default_version() -> String {
    "1.0".to_string()
}

impl TryFrom<MappingFile> for FieldMapping {
    type Error = MappingError;

    fn try_from(file: MappingFile) -> Result<Self, Self::Error> {
        FieldMapping::new(file.columns).map(|m| m.with_description(file.description))
    }
}

impl From<FieldMapping> for MappingFile {
    fn from(mapping: FieldMapping) -> Self {
        MappingFile {
            version: default_version(),
            description: mapping.description,
            columns: mapping.columns,
        }
    }
}

impl FieldMapping {
    /// Build a mapping from ordered columns, checking its invariants.
    pub fn new(columns: Vec<ColumnMapping>) -> MappingResult<Self> {
        let mut seen = HashSet::new();
        let mut label_seen = false;

        for column in &columns {
            if !seen.insert(column.target) {
                return Err(MappingError::DuplicateTarget(
                    column.target.canonical_name().to_string(),
                ));
            }
            match column.target {
                Target::Field(TopField::Label) => label_seen = true,
                Target::Field(TopField::Name) if !label_seen && has_label(&columns) => {
                    return Err(MappingError::NameBeforeLabel {
                        name_source: column.source.clone(),
                    });
                }
                _ => {}
            }
        }

        Ok(Self {
            description: String::new(),
            columns,
        })
    }

    /// The DBpedia Arachnid export mapping.
    pub fn arachnid() -> Self {
        let columns = vec![
            ColumnMapping::field("rdf-schema#label", TopField::Label),
            ColumnMapping::field("URI", TopField::Uri),
            ColumnMapping::field("rdf-schema#comment", TopField::Description),
            ColumnMapping::field("synonym", TopField::Synonym),
            ColumnMapping::field("name", TopField::Name),
            ColumnMapping::classification("family_label", Rank::Family),
            ColumnMapping::classification("class_label", Rank::Class),
            ColumnMapping::classification("phylum_label", Rank::Phylum),
            ColumnMapping::classification("order_label", Rank::Order),
            ColumnMapping::classification("kingdom_label", Rank::Kingdom),
            ColumnMapping::classification("genus_label", Rank::Genus),
        ];

        Self {
            description: "DBpedia infobox export for the Arachnid class".to_string(),
            columns,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Parse a mapping from JSON string
    pub fn from_json(json: &str) -> MappingResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a mapping from a JSON file
    pub fn from_file(path: &Path) -> MappingResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| MappingError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> MappingResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Free-text note carried by mapping files.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Columns in processing order.
    pub fn columns(&self) -> &[ColumnMapping] {
        &self.columns
    }

    /// Source columns the mapping reads, in processing order.
    pub fn source_columns(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.source.as_str()).collect()
    }

    /// Check that every mapped source column exists in the CSV headers.
    pub fn validate_headers(&self, headers: &[String]) -> Result<(), Vec<String>> {
        let missing: Vec<String> = self
            .source_columns()
            .into_iter()
            .filter(|col| !headers.iter().any(|h| h == col))
            .map(str::to_string)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(missing)
        }
    }
}

impl Default for FieldMapping {
    fn default() -> Self {
        Self::arachnid()
    }
}

fn has_label(columns: &[ColumnMapping]) -> bool {
    columns
        .iter()
        .any(|c| c.target == Target::Field(TopField::Label))
}
