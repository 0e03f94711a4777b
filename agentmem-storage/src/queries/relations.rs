//! Relation neighbor lookup plus a write path used by `StorageEngine`
//! seeding helpers — `StorageDriver` itself only exposes the read side,
//! since edges are written by whatever process builds the relation graph,
//! not by the retrieval core.

use std::collections::BTreeMap;

use rusqlite::{params, Connection};

use agentmem_core::errors::{CoreError, CoreResult};
use agentmem_core::model::{Direction, EntryId, Relation, RelationType};

fn storage_err(context: &str, e: impl std::fmt::Display) -> CoreError {
    CoreError::Unavailable(format!("{context}: {e}"))
}

fn relation_type_to_str(t: &RelationType) -> String {
    match t {
        RelationType::RelatedTo => "related_to".to_string(),
        RelationType::AppliesTo => "applies_to".to_string(),
        RelationType::DependsOn => "depends_on".to_string(),
        RelationType::Custom(name) => name.clone(),
    }
}

fn relation_type_from_str(s: &str) -> RelationType {
    match s {
        "related_to" => RelationType::RelatedTo,
        "applies_to" => RelationType::AppliesTo,
        "depends_on" => RelationType::DependsOn,
        other => RelationType::Custom(other.to_string()),
    }
}

/// Inserts an edge, collapsing parallel edges of the same type between the
/// same pair.
pub fn add_relation(conn: &Connection, relation: &Relation) -> CoreResult<()> {
    let properties_json = serde_json::to_string(&relation.properties).map_err(|e| storage_err("add_relation encode", e))?;
    conn.execute(
        "INSERT INTO relations (source_id, target_id, relation_type, properties, weight)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(source_id, target_id, relation_type) DO UPDATE SET properties = excluded.properties, weight = excluded.weight",
        params![
            relation.source_id.as_str(),
            relation.target_id.as_str(),
            relation_type_to_str(&relation.relation_type),
            properties_json,
            relation.weight,
        ],
    )
    .map_err(|e| storage_err("add_relation", e))?;
    Ok(())
}

pub fn relation_neighbors(
    conn: &Connection,
    id: &EntryId,
    relation_type: Option<&RelationType>,
    direction: Direction,
) -> CoreResult<Vec<Relation>> {
    let type_filter = relation_type.map(relation_type_to_str);
    let sql = match (direction, &type_filter) {
        (Direction::Forward, Some(_)) => "SELECT * FROM relations WHERE source_id = ?1 AND relation_type = ?2",
        (Direction::Forward, None) => "SELECT * FROM relations WHERE source_id = ?1",
        (Direction::Backward, Some(_)) => "SELECT * FROM relations WHERE target_id = ?1 AND relation_type = ?2",
        (Direction::Backward, None) => "SELECT * FROM relations WHERE target_id = ?1",
        (Direction::Both, Some(_)) => {
            "SELECT * FROM relations WHERE (source_id = ?1 OR target_id = ?1) AND relation_type = ?2"
        }
        (Direction::Both, None) => "SELECT * FROM relations WHERE source_id = ?1 OR target_id = ?1",
    };
    let mut stmt = conn.prepare(sql).map_err(|e| storage_err("relation_neighbors prepare", e))?;

    let map_row = |row: &rusqlite::Row| -> rusqlite::Result<Relation> {
        let source_id: String = row.get("source_id")?;
        let target_id: String = row.get("target_id")?;
        let relation_type: String = row.get("relation_type")?;
        let properties_json: String = row.get("properties")?;
        let weight: f64 = row.get("weight")?;
        let properties: BTreeMap<String, String> = serde_json::from_str(&properties_json).unwrap_or_default();
        Ok(Relation {
            source_id: EntryId::new(source_id),
            target_id: EntryId::new(target_id),
            relation_type: relation_type_from_str(&relation_type),
            properties,
            weight,
        })
    };

    let rows = match &type_filter {
        Some(t) => stmt.query_map(params![id.as_str(), t], map_row),
        None => stmt.query_map(params![id.as_str()], map_row),
    }
    .map_err(|e| storage_err("relation_neighbors query", e))?
    .collect::<Result<Vec<_>, _>>()
    .map_err(|e| storage_err("relation_neighbors collect", e))?;

    Ok(rows.into_iter().filter(|r| !r.is_self_loop()).collect())
}
