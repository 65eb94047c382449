//! Domain models for the cleaning pipeline.
//!
//! - [`RawRecord`] - one CSV row keyed by header
//! - [`CleanedRecord`] - the nested document produced per row
//! - [`Classification`] - the six taxonomic ranks, always fully keyed
//! - [`TopField`] / [`Rank`] - canonical field names a mapping may target

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// One raw CSV row: source column name to raw cell value.
pub type RawRecord = HashMap<String, String>;

/// Literal cell value the export uses for "no value".
pub const NULL_SENTINEL: &str = "NULL";

// =============================================================================
// Canonical Field Names
// =============================================================================

/// Top-level field of a [`CleanedRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TopField {
    Label,
    Uri,
    Description,
    Name,
    Synonym,
}

impl TopField {
    pub const ALL: [TopField; 5] = [
        TopField::Label,
        TopField::Uri,
        TopField::Description,
        TopField::Name,
        TopField::Synonym,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Label => "label",
            Self::Uri => "uri",
            Self::Description => "description",
            Self::Name => "name",
            Self::Synonym => "synonym",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == name)
    }
}

impl fmt::Display for TopField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Taxonomic rank stored under `classification`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rank {
    Family,
    Class,
    Phylum,
    Order,
    Kingdom,
    Genus,
}

impl Rank {
    pub const ALL: [Rank; 6] = [
        Rank::Family,
        Rank::Class,
        Rank::Phylum,
        Rank::Order,
        Rank::Kingdom,
        Rank::Genus,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Family => "family",
            Self::Class => "class",
            Self::Phylum => "phylum",
            Self::Order => "order",
            Self::Kingdom => "kingdom",
            Self::Genus => "genus",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.as_str() == name)
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Classification
// =============================================================================

/// Taxonomy of a record.
///
/// Every rank is a named field, so a serialized classification always carries
/// all six keys whether or not the source row provided them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub family: Option<String>,
    pub class: Option<String>,
    pub phylum: Option<String>,
    pub order: Option<String>,
    pub kingdom: Option<String>,
    pub genus: Option<String>,
}

impl Classification {
    pub fn get(&self, rank: Rank) -> Option<&str> {
        self.slot(rank).as_deref()
    }

    pub fn set(&mut self, rank: Rank, value: Option<String>) {
        *self.slot_mut(rank) = value;
    }

    /// Iterate ranks in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Rank, Option<&str>)> + '_ {
        Rank::ALL.into_iter().map(move |rank| (rank, self.get(rank)))
    }

    fn slot(&self, rank: Rank) -> &Option<String> {
        match rank {
            Rank::Family => &self.family,
            Rank::Class => &self.class,
            Rank::Phylum => &self.phylum,
            Rank::Order => &self.order,
            Rank::Kingdom => &self.kingdom,
            Rank::Genus => &self.genus,
        }
    }

    fn slot_mut(&mut self, rank: Rank) -> &mut Option<String> {
        match rank {
            Rank::Family => &mut self.family,
            Rank::Class => &mut self.class,
            Rank::Phylum => &mut self.phylum,
            Rank::Order => &mut self.order,
            Rank::Kingdom => &mut self.kingdom,
            Rank::Genus => &mut self.genus,
        }
    }
}

// =============================================================================
// Cleaned Record
// =============================================================================

/// Cleaned, nested document for one export row.
///
/// Field order matches the serialized document:
///
/// ```json
/// {
///   "label": "Argiope",
///   "uri": "http://dbpedia.org/resource/Argiope_(spider)",
///   "description": "The genus Argiope includes ...",
///   "name": "Argiope",
///   "synonym": null,
///   "classification": { "family": "Orb-weaver spider", "class": "Arachnid", ... }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanedRecord {
    pub label: Option<String>,
    pub uri: Option<String>,
    pub description: Option<String>,
    pub name: Option<String>,
    pub synonym: Option<Vec<String>>,
    pub classification: Classification,
}
