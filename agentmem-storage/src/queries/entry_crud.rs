//! Create, update, delete, deactivate, get — one entry at a time, each
//! wrapped in a transaction so the `entries` row, its `entry_tags`, and its
//! `entries_fts` shadow row are all-or-nothing.

use rusqlite::{params, Connection, OptionalExtension};

use agentmem_core::errors::{CoreError, CoreResult};
use agentmem_core::model::{Entry, EntryId};

use crate::convert::{entry_from_row, kind_to_str, scope_to_columns};

fn storage_err(context: &str, e: impl std::fmt::Display) -> CoreError {
    CoreError::Unavailable(format!("{context}: {e}"))
}

fn sync_tags(conn: &Connection, entry: &Entry) -> CoreResult<()> {
    conn.execute("DELETE FROM entry_tags WHERE entry_id = ?1", params![entry.id.as_str()])
        .map_err(|e| storage_err("sync_tags delete", e))?;
    for tag in &entry.tags {
        conn.execute(
            "INSERT INTO entry_tags (entry_id, tag) VALUES (?1, ?2)",
            params![entry.id.as_str(), tag],
        )
        .map_err(|e| storage_err("sync_tags insert", e))?;
    }
    Ok(())
}

fn sync_fts(conn: &Connection, entry: &Entry) -> CoreResult<()> {
    conn.execute("DELETE FROM entries_fts WHERE id = ?1", params![entry.id.as_str()])
        .map_err(|e| storage_err("sync_fts delete", e))?;
    conn.execute(
        "INSERT INTO entries_fts (id, name, title, body) VALUES (?1, ?2, ?3, ?4)",
        params![entry.id.as_str(), entry.name, entry.title, entry.body],
    )
    .map_err(|e| storage_err("sync_fts insert", e))?;
    Ok(())
}

fn insert_row(conn: &Connection, entry: &Entry) -> CoreResult<()> {
    let (scope_type, scope_id) = scope_to_columns(&entry.scope);
    let payload_json = serde_json::to_string(&entry.payload).map_err(|e| storage_err("insert_row payload", e))?;
    conn.execute(
        "INSERT INTO entries (
            id, kind, scope_type, scope_id, name, body, title, priority, confidence,
            active, created_at, updated_at, valid_from, valid_until, payload, version, content_hash
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
        params![
            entry.id.as_str(),
            kind_to_str(entry.kind),
            scope_type,
            scope_id,
            entry.name,
            entry.body,
            entry.title,
            entry.priority.map(|p| p as i64),
            entry.confidence,
            entry.active as i64,
            entry.created_at.to_rfc3339(),
            entry.updated_at.to_rfc3339(),
            entry.valid_from.map(|t| t.to_rfc3339()),
            entry.valid_until.map(|t| t.to_rfc3339()),
            payload_json,
            entry.version,
            entry.content_hash,
        ],
    )
    .map_err(|e| storage_err("insert_row", e))?;
    Ok(())
}

pub fn create(conn: &Connection, entry: &Entry) -> CoreResult<()> {
    entry.validate()?;
    let tx = conn.unchecked_transaction().map_err(|e| storage_err("create begin", e))?;
    let existing: Option<String> = tx
        .query_row("SELECT id FROM entries WHERE id = ?1", params![entry.id.as_str()], |r| r.get(0))
        .optional()
        .map_err(|e| storage_err("create existence check", e))?;
    if existing.is_some() {
        return Err(CoreError::Conflict(format!("entry {} already exists", entry.id)));
    }
    insert_row(&tx, entry)?;
    sync_tags(&tx, entry)?;
    sync_fts(&tx, entry)?;
    tx.commit().map_err(|e| storage_err("create commit", e))?;
    Ok(())
}

pub fn update(conn: &Connection, entry: &Entry) -> CoreResult<()> {
    entry.validate()?;
    let tx = conn.unchecked_transaction().map_err(|e| storage_err("update begin", e))?;
    let (scope_type, scope_id) = scope_to_columns(&entry.scope);
    let payload_json = serde_json::to_string(&entry.payload).map_err(|e| storage_err("update payload", e))?;
    let affected = tx
        .execute(
            "UPDATE entries SET
                kind = ?2, scope_type = ?3, scope_id = ?4, name = ?5, body = ?6, title = ?7,
                priority = ?8, confidence = ?9, active = ?10, created_at = ?11, updated_at = ?12,
                valid_from = ?13, valid_until = ?14, payload = ?15, version = ?16, content_hash = ?17
             WHERE id = ?1",
            params![
                entry.id.as_str(),
                kind_to_str(entry.kind),
                scope_type,
                scope_id,
                entry.name,
                entry.body,
                entry.title,
                entry.priority.map(|p| p as i64),
                entry.confidence,
                entry.active as i64,
                entry.created_at.to_rfc3339(),
                entry.updated_at.to_rfc3339(),
                entry.valid_from.map(|t| t.to_rfc3339()),
                entry.valid_until.map(|t| t.to_rfc3339()),
                payload_json,
                entry.version,
                entry.content_hash,
            ],
        )
        .map_err(|e| storage_err("update", e))?;
    if affected == 0 {
        return Err(CoreError::not_found(format!("entry {} not found", entry.id)));
    }
    sync_tags(&tx, entry)?;
    sync_fts(&tx, entry)?;
    tx.commit().map_err(|e| storage_err("update commit", e))?;
    Ok(())
}

pub fn delete(conn: &Connection, id: &EntryId) -> CoreResult<()> {
    let tx = conn.unchecked_transaction().map_err(|e| storage_err("delete begin", e))?;
    tx.execute("DELETE FROM entries WHERE id = ?1", params![id.as_str()])
        .map_err(|e| storage_err("delete entries", e))?;
    tx.execute("DELETE FROM entry_tags WHERE entry_id = ?1", params![id.as_str()])
        .map_err(|e| storage_err("delete entry_tags", e))?;
    tx.execute("DELETE FROM entries_fts WHERE id = ?1", params![id.as_str()])
        .map_err(|e| storage_err("delete entries_fts", e))?;
    tx.execute(
        "DELETE FROM relations WHERE source_id = ?1 OR target_id = ?1",
        params![id.as_str()],
    )
    .map_err(|e| storage_err("delete relations", e))?;
    tx.commit().map_err(|e| storage_err("delete commit", e))?;
    Ok(())
}

pub fn deactivate(conn: &Connection, id: &EntryId) -> CoreResult<()> {
    let affected = conn
        .execute("UPDATE entries SET active = 0 WHERE id = ?1", params![id.as_str()])
        .map_err(|e| storage_err("deactivate", e))?;
    if affected == 0 {
        return Err(CoreError::not_found(format!("entry {id} not found")));
    }
    Ok(())
}

pub fn get(conn: &Connection, id: &EntryId) -> CoreResult<Option<Entry>> {
    let row: Option<CoreResult<Entry>> = conn
        .query_row("SELECT * FROM entries WHERE id = ?1", params![id.as_str()], |row| {
            Ok(entry_from_row(row))
        })
        .optional()
        .map_err(|e| storage_err("get", e))?;
    let mut entry = match row {
        Some(r) => r.map_err(|e| storage_err("get decode", e))?,
        None => return Ok(None),
    };
    entry.tags = super::tags::load_tags(conn, id)?;
    Ok(Some(entry))
}
