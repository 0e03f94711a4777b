//! Tag bulk-fetch.

use std::collections::{BTreeSet, HashMap};

use rusqlite::{params, Connection};

use agentmem_core::errors::{CoreError, CoreResult};
use agentmem_core::model::EntryId;

fn storage_err(context: &str, e: impl std::fmt::Display) -> CoreError {
    CoreError::Unavailable(format!("{context}: {e}"))
}

/// Loads the tag set for every id in `ids`, one batch query followed by an
/// in-memory group-by rather than one query per entry.
pub fn batch_tags(conn: &Connection, ids: &[EntryId]) -> CoreResult<HashMap<EntryId, BTreeSet<String>>> {
    let mut result: HashMap<EntryId, BTreeSet<String>> = ids.iter().map(|id| (id.clone(), BTreeSet::new())).collect();
    if ids.is_empty() {
        return Ok(result);
    }

    let placeholders = vec!["?"; ids.len()].join(",");
    let sql = format!("SELECT entry_id, tag FROM entry_tags WHERE entry_id IN ({placeholders})");
    let mut stmt = conn.prepare(&sql).map_err(|e| storage_err("batch_tags prepare", e))?;
    let params: Vec<&dyn rusqlite::ToSql> = ids.iter().map(|id| id.as_str() as &dyn rusqlite::ToSql).collect();
    let mut rows = stmt.query(params.as_slice()).map_err(|e| storage_err("batch_tags query", e))?;
    while let Some(row) = rows.next().map_err(|e| storage_err("batch_tags row", e))? {
        let entry_id: String = row.get(0).map_err(|e| storage_err("batch_tags entry_id", e))?;
        let tag: String = row.get(1).map_err(|e| storage_err("batch_tags tag", e))?;
        result.entry(EntryId::new(entry_id)).or_default().insert(tag);
    }
    Ok(result)
}

/// Single-entry convenience wrapper over [`batch_tags`], used by `get`.
pub fn load_tags(conn: &Connection, id: &EntryId) -> CoreResult<BTreeSet<String>> {
    let tags: Vec<String> = conn
        .prepare("SELECT tag FROM entry_tags WHERE entry_id = ?1")
        .map_err(|e| storage_err("load_tags prepare", e))?
        .query_map(params![id.as_str()], |row| row.get(0))
        .map_err(|e| storage_err("load_tags query", e))?
        .collect::<Result<_, _>>()
        .map_err(|e| storage_err("load_tags collect", e))?;
    Ok(tags.into_iter().collect())
}
