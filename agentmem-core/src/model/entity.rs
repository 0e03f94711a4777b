use serde::{Deserialize, Serialize};

use crate::model::entry::EntryId;

/// Structured entity types extracted from entry bodies and query text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    FilePath,
    FunctionName,
    Identifier,
    VersionString,
    Url,
    Other(String),
}

/// One (entity_type, normalized_value) occurrence within a single entry,
/// produced offline from entry bodies and fed into the entity reverse
/// index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityOccurrence {
    pub entity_type: EntityType,
    pub normalized_value: String,
    pub entry_id: EntryId,
    pub count: u32,
}
