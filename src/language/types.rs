//! Types representing taxa and the resources (identification keys) that
//! contain them.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::ops::Deref;

use serde::Serialize;

use crate::catalog::CatalogRecord;

/// Taxonomic ranks, ordered from the highest to the lowest. The derived
/// ordering is what all "above"/"below" comparisons use, so `Rank::Genus <
/// Rank::Species` reads as "genus is above species".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Rank {
    Kingdom,
    Phylum,
    Subphylum,
    Class,
    Subclass,
    Infraclass,
    Superorder,
    Order,
    Suborder,
    Infraorder,
    Superfamily,
    Family,
    Subfamily,
    Tribe,
    Subtribe,
    Genus,
    Subgenus,
    Section,
    Subsection,
    Series,
    Group,
    Subgroup,
    Aggregate,
    Complex,
    Species,
    Subspecies,
    Variety,
    Form,
    Aberration,
    Race,
    Stirps,
}

pub const RANKS: [Rank; 31] = [
    Rank::Kingdom,
    Rank::Phylum,
    Rank::Subphylum,
    Rank::Class,
    Rank::Subclass,
    Rank::Infraclass,
    Rank::Superorder,
    Rank::Order,
    Rank::Suborder,
    Rank::Infraorder,
    Rank::Superfamily,
    Rank::Family,
    Rank::Subfamily,
    Rank::Tribe,
    Rank::Subtribe,
    Rank::Genus,
    Rank::Subgenus,
    Rank::Section,
    Rank::Subsection,
    Rank::Series,
    Rank::Group,
    Rank::Subgroup,
    Rank::Aggregate,
    Rank::Complex,
    Rank::Species,
    Rank::Subspecies,
    Rank::Variety,
    Rank::Form,
    Rank::Aberration,
    Rank::Race,
    Rank::Stirps,
];

/// Ranks that carry their own column in a Darwin Core record.
pub const CLASSIFICATION_RANKS: [Rank; 8] = [
    Rank::Kingdom,
    Rank::Phylum,
    Rank::Class,
    Rank::Order,
    Rank::Family,
    Rank::Subfamily,
    Rank::Genus,
    Rank::Subgenus,
];

impl Rank {
    pub fn parse(name: &str) -> Option<Rank> {
        RANKS
            .iter()
            .copied()
            .find(|rank| rank.as_str() == name)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Rank::Kingdom => "kingdom",
            Rank::Phylum => "phylum",
            Rank::Subphylum => "subphylum",
            Rank::Class => "class",
            Rank::Subclass => "subclass",
            Rank::Infraclass => "infraclass",
            Rank::Superorder => "superorder",
            Rank::Order => "order",
            Rank::Suborder => "suborder",
            Rank::Infraorder => "infraorder",
            Rank::Superfamily => "superfamily",
            Rank::Family => "family",
            Rank::Subfamily => "subfamily",
            Rank::Tribe => "tribe",
            Rank::Subtribe => "subtribe",
            Rank::Genus => "genus",
            Rank::Subgenus => "subgenus",
            Rank::Section => "section",
            Rank::Subsection => "subsection",
            Rank::Series => "series",
            Rank::Group => "group",
            Rank::Subgroup => "subgroup",
            Rank::Aggregate => "aggregate",
            Rank::Complex => "complex",
            Rank::Species => "species",
            Rank::Subspecies => "subspecies",
            Rank::Variety => "variety",
            Rank::Form => "form",
            Rank::Aberration => "aberration",
            Rank::Race => "race",
            Rank::Stirps => "stirps",
        }
    }

    /// The main ranks of the Linnaean hierarchy. The lowest of these in a
    /// resource's levels is the rank every branch has to reach.
    pub fn is_main(&self) -> bool {
        matches!(
            self,
            Rank::Kingdom
                | Rank::Phylum
                | Rank::Class
                | Rank::Order
                | Rank::Family
                | Rank::Genus
                | Rank::Species
        )
    }

    /// Canonical abbreviation written between the specific and the
    /// infraspecific epithet, e.g. "subsp.".
    pub fn label(&self) -> Option<&'static str> {
        match self {
            Rank::Subspecies => Some("subsp."),
            Rank::Variety => Some("var."),
            Rank::Form => Some("f."),
            Rank::Aberration => Some("ab."),
            Rank::Race => Some("r."),
            Rank::Stirps => Some("st."),
            _ => None,
        }
    }

    /// Rank for an abbreviation as it appears in a key, without the trailing
    /// full stop.
    pub fn from_label(label: &str) -> Option<Rank> {
        match label {
            "st" => Some(Rank::Stirps),
            "r" => Some(Rank::Race),
            "ab" => Some(Rank::Aberration),
            "f" => Some(Rank::Form),
            "var" => Some(Rank::Variety),
            "ssp" | "subsp" => Some(Rank::Subspecies),
            _ => None,
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum TaxonomicStatus {
    #[default]
    #[serde(rename = "accepted")]
    Accepted,
    #[serde(rename = "synonym")]
    Synonym,
    #[serde(rename = "heterotypic synonym")]
    HeterotypicSynonym,
    #[serde(rename = "incorrect")]
    Incorrect,
}

impl TaxonomicStatus {
    pub fn from_symbol(symbol: char) -> Option<TaxonomicStatus> {
        match symbol {
            '=' => Some(TaxonomicStatus::Synonym),
            '+' => Some(TaxonomicStatus::HeterotypicSynonym),
            '>' => Some(TaxonomicStatus::Incorrect),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaxonomicStatus::Accepted => "accepted",
            TaxonomicStatus::Synonym => "synonym",
            TaxonomicStatus::HeterotypicSynonym => "heterotypic synonym",
            TaxonomicStatus::Incorrect => "incorrect",
        }
    }

    pub fn is_accepted(&self) -> bool {
        *self == TaxonomicStatus::Accepted
    }
}

impl fmt::Display for TaxonomicStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tag marking sibling taxa that a key does not tell apart (`[1]`, `[2]`,
/// ...) or a taxon that cannot be identified with it at all (`[_]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Cluster {
    Numbered(u32),
    Unidentifiable,
}

pub type TaxonId = String;

/// The decomposed parts of a scientific name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NameParts {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generic_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub infrageneric_epithet: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specific_epithet: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub infraspecific_epithet: Option<String>,
}

/// Names of the ancestors at each of the [`CLASSIFICATION_RANKS`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Classification(BTreeMap<Rank, String>);

impl Classification {
    pub fn get(&self, rank: Rank) -> Option<&str> {
        self.0
            .get(&rank)
            .map(String::as_str)
    }

    /// Set the entry for `rank`; ranks without a Darwin Core column are
    /// ignored.
    pub fn set(&mut self, rank: Rank, name: impl Into<String>) {
        if CLASSIFICATION_RANKS.contains(&rank) {
            self.0
                .insert(rank, name.into());
        }
    }

    pub fn remove(&mut self, rank: Rank) {
        self.0
            .remove(&rank);
    }

    pub fn iter(&self) -> impl Iterator<Item = (Rank, &str)> {
        self.0
            .iter()
            .map(|(rank, name)| (*rank, name.as_str()))
    }
}

/// A taxon while it is being assembled from a line (and possibly amended by
/// a correction on a following line).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkingTaxon {
    #[serde(rename = "scientificNameID", skip_serializing_if = "Option::is_none")]
    pub id: Option<TaxonId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scientific_name: Option<String>,
    #[serde(rename = "scientificNameAuthorship", skip_serializing_if = "Option::is_none")]
    pub authorship: Option<String>,
    #[serde(flatten)]
    pub name: NameParts,
    #[serde(rename = "taxonRank", skip_serializing_if = "Option::is_none")]
    pub rank: Option<Rank>,
    #[serde(rename = "taxonRemarks", skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection_code: Option<String>,
    #[serde(rename = "taxonomicStatus")]
    pub status: TaxonomicStatus,
    #[serde(rename = "acceptedNameUsageID", skip_serializing_if = "Option::is_none")]
    pub accepted_id: Option<TaxonId>,
    #[serde(rename = "acceptedNameUsage", skip_serializing_if = "Option::is_none")]
    pub accepted_name: Option<String>,
    #[serde(rename = "parentNameUsageID", skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<TaxonId>,
    #[serde(rename = "parentNameUsage", skip_serializing_if = "Option::is_none")]
    pub parent_name: Option<String>,
    pub classification: Classification,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub higher_classification: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verbatim_identification: Option<String>,

    // not Darwin Core
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scientific_name_only: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster: Option<Cluster>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub indistinguishable_from: Vec<TaxonId>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub not_identifiable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incorrect: Option<Box<WorkingTaxon>>,
}

impl WorkingTaxon {
    pub fn is_accepted(&self) -> bool {
        self.status
            .is_accepted()
    }
}

/// A finished taxon. Unlike a [`WorkingTaxon`] it always has an identifier,
/// a scientific name and a rank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Taxon(WorkingTaxon);

impl Taxon {
    pub fn id(&self) -> &str {
        self.0
            .id
            .as_deref()
            .unwrap_or_default()
    }

    pub fn scientific_name(&self) -> &str {
        self.0
            .scientific_name
            .as_deref()
            .unwrap_or_default()
    }

    pub fn rank(&self) -> Rank {
        self.0
            .rank
            .unwrap_or(Rank::Species)
    }

    pub fn into_inner(self) -> WorkingTaxon {
        self.0
    }
}

impl TryFrom<WorkingTaxon> for Taxon {
    type Error = WorkingTaxon;

    fn try_from(taxon: WorkingTaxon) -> Result<Self, Self::Error> {
        if taxon.id.is_some() && taxon.scientific_name.is_some() && taxon.rank.is_some() {
            Ok(Taxon(taxon))
        } else {
            Err(taxon)
        }
    }
}

impl Deref for Taxon {
    type Target = WorkingTaxon;

    fn deref(&self) -> &WorkingTaxon {
        &self.0
    }
}

/// Taxa of a resource keyed by identifier, iterated in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaxonMap {
    taxa: Vec<Taxon>,
    index: HashMap<TaxonId, usize>,
}

impl TaxonMap {
    pub fn new() -> TaxonMap {
        TaxonMap::default()
    }

    /// Insert a taxon under its own identifier. An identifier already in the
    /// map is refused and the taxon handed back.
    pub fn insert(&mut self, taxon: Taxon) -> Result<(), Taxon> {
        if self
            .index
            .contains_key(taxon.id())
        {
            return Err(taxon);
        }

        self.index
            .insert(
                taxon
                    .id()
                    .to_string(),
                self.taxa.len(),
            );
        self.taxa
            .push(taxon);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Taxon> {
        self.index
            .get(id)
            .map(|&i| &self.taxa[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index
            .contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.taxa
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.taxa
            .is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Taxon> {
        self.taxa
            .iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.taxa
            .iter()
            .map(Taxon::id)
    }
}

impl<'a> IntoIterator for &'a TaxonMap {
    type Item = &'a Taxon;
    type IntoIter = std::slice::Iter<'a, Taxon>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Serialize for TaxonMap {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.taxa)
    }
}

/// Structural checks a resource header can switch off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Flag {
    #[serde(rename = "missing-leaf-taxa")]
    MissingLeafTaxa,
}

impl Flag {
    pub fn parse(name: &str) -> Option<Flag> {
        match name {
            "missing-leaf-taxa" => Some(Flag::MissingLeafTaxa),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResourceMetadata {
    pub levels: Vec<Rank>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog: Option<CatalogRecord>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub flags: Vec<Flag>,
}

impl ResourceMetadata {
    pub fn has_flag(&self, flag: Flag) -> bool {
        self.flags
            .contains(&flag)
    }
}

/// One identification key within a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resource {
    pub id: String,
    pub file: String,
    pub work_id: String,
    pub index: usize,
    pub metadata: ResourceMetadata,
    pub taxa: TaxonMap,
}

impl Resource {
    pub fn new(work_id: &str, index: usize, metadata: ResourceMetadata) -> Resource {
        Resource {
            id: format!("{}:{}", work_id, index),
            file: format!("{}-{}", work_id, index),
            work_id: work_id.to_string(),
            index,
            metadata,
            taxa: TaxonMap::new(),
        }
    }
}

/// What is known about an earlier revision of a document: its text, and for
/// each resource the numeric suffixes of the identifiers emitted back then,
/// in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    pub text: String,
    pub ids: Vec<Vec<u32>>,
}

impl History {
    pub fn new(text: impl Into<String>, ids: Vec<Vec<u32>>) -> History {
        History {
            text: text.into(),
            ids,
        }
    }

    /// Recover the history from previously emitted resources.
    pub fn from_resources(text: impl Into<String>, resources: &[Resource]) -> History {
        let ids = resources
            .iter()
            .map(|resource| {
                resource
                    .taxa
                    .ids()
                    .filter_map(|id| {
                        id.rsplit(':')
                            .next()
                            .and_then(|n| n.parse().ok())
                    })
                    .collect()
            })
            .collect();

        History {
            text: text.into(),
            ids,
        }
    }
}
