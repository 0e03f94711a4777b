use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::entry::EntryId;

/// Typed directed link between two entries. The closed set below
/// covers the built-in types; `Custom` leaves room for registry-extensible
/// types without requiring a schema migration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationType {
    RelatedTo,
    AppliesTo,
    DependsOn,
    Custom(String),
}

impl RelationType {
    pub fn as_str(&self) -> &str {
        match self {
            RelationType::RelatedTo => "related_to",
            RelationType::AppliesTo => "applies_to",
            RelationType::DependsOn => "depends_on",
            RelationType::Custom(name) => name,
        }
    }
}

/// Direction to walk a relation edge during traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Forward,
    Backward,
    Both,
}

/// A typed, directed, weighted edge between two entries.
/// Self-loops are allowed but ignored by traversal; parallel edges of the
/// same type between the same pair are collapsed by the storage driver at
/// write time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relation {
    pub source_id: EntryId,
    pub target_id: EntryId,
    pub relation_type: RelationType,
    pub properties: BTreeMap<String, String>,
    pub weight: f64,
}

impl Relation {
    pub fn is_self_loop(&self) -> bool {
        self.source_id == self.target_id
    }
}
