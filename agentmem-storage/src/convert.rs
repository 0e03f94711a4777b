//! `Entry`/`Scope`/`Relation` <-> SQLite row conversions, kept in one place
//! so every query module shares the same column layout.

use chrono::{DateTime, Utc};
use rusqlite::Row;

use agentmem_core::errors::{CoreError, CoreResult};
use agentmem_core::model::{Entry, EntryId, EntryKind, EntryPayload, Scope};

fn storage_err(context: &str, e: impl std::fmt::Display) -> CoreError {
    CoreError::Internal(format!("{context}: {e}"))
}

pub fn kind_to_str(kind: EntryKind) -> &'static str {
    kind.as_str()
}

pub fn kind_from_str(s: &str) -> CoreResult<EntryKind> {
    match s {
        "guideline" => Ok(EntryKind::Guideline),
        "knowledge" => Ok(EntryKind::Knowledge),
        "tool" => Ok(EntryKind::Tool),
        "experience" => Ok(EntryKind::Experience),
        other => Err(CoreError::Internal(format!("unknown entry kind in storage: {other}"))),
    }
}

/// Splits a `Scope` into the `(scope_type, scope_id)` column pair.
pub fn scope_to_columns(scope: &Scope) -> (&'static str, Option<&str>) {
    match scope {
        Scope::Global => ("global", None),
        Scope::Org { id } => ("org", Some(id.as_str())),
        Scope::Project { id } => ("project", Some(id.as_str())),
        Scope::Session { id } => ("session", Some(id.as_str())),
    }
}

pub fn scope_from_columns(scope_type: &str, scope_id: Option<String>) -> CoreResult<Scope> {
    match scope_type {
        "global" => Ok(Scope::Global),
        "org" => Ok(Scope::Org { id: scope_id.ok_or_else(|| storage_err("scope_from_columns", "org scope missing id"))? }),
        "project" => {
            Ok(Scope::Project { id: scope_id.ok_or_else(|| storage_err("scope_from_columns", "project scope missing id"))? })
        }
        "session" => {
            Ok(Scope::Session { id: scope_id.ok_or_else(|| storage_err("scope_from_columns", "session scope missing id"))? })
        }
        other => Err(storage_err("scope_from_columns", format!("unknown scope type {other}"))),
    }
}

fn parse_ts(s: &str) -> CoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| storage_err("parse_ts", e))
}

/// Maps one `entries` row. Tags live in the separate `entry_tags` join
/// table and are not embedded here — callers batch-load and attach them
/// after the row scan completes (sharing one connection across a
/// `query_row`/tag-load pair inside the same closure is avoidable this way).
pub fn entry_from_row(row: &Row) -> CoreResult<Entry> {
    let id: String = row.get("id").map_err(|e| storage_err("entry_from_row id", e))?;
    let kind_str: String = row.get("kind").map_err(|e| storage_err("entry_from_row kind", e))?;
    let scope_type: String = row.get("scope_type").map_err(|e| storage_err("entry_from_row scope_type", e))?;
    let scope_id: Option<String> = row.get("scope_id").map_err(|e| storage_err("entry_from_row scope_id", e))?;
    let name: String = row.get("name").map_err(|e| storage_err("entry_from_row name", e))?;
    let body: String = row.get("body").map_err(|e| storage_err("entry_from_row body", e))?;
    let title: Option<String> = row.get("title").map_err(|e| storage_err("entry_from_row title", e))?;
    let priority: Option<i64> = row.get("priority").map_err(|e| storage_err("entry_from_row priority", e))?;
    let confidence: Option<f64> = row.get("confidence").map_err(|e| storage_err("entry_from_row confidence", e))?;
    let active: i64 = row.get("active").map_err(|e| storage_err("entry_from_row active", e))?;
    let created_at: String = row.get("created_at").map_err(|e| storage_err("entry_from_row created_at", e))?;
    let updated_at: String = row.get("updated_at").map_err(|e| storage_err("entry_from_row updated_at", e))?;
    let valid_from: Option<String> = row.get("valid_from").map_err(|e| storage_err("entry_from_row valid_from", e))?;
    let valid_until: Option<String> = row.get("valid_until").map_err(|e| storage_err("entry_from_row valid_until", e))?;
    let payload_json: String = row.get("payload").map_err(|e| storage_err("entry_from_row payload", e))?;
    let version: i64 = row.get("version").map_err(|e| storage_err("entry_from_row version", e))?;
    let content_hash: String = row.get("content_hash").map_err(|e| storage_err("entry_from_row content_hash", e))?;

    let payload: EntryPayload = serde_json::from_str(&payload_json).map_err(|e| storage_err("entry_from_row payload decode", e))?;

    Ok(Entry {
        id: EntryId::new(id),
        kind: kind_from_str(&kind_str)?,
        scope: scope_from_columns(&scope_type, scope_id)?,
        name,
        body,
        title,
        tags: std::collections::BTreeSet::new(),
        priority: priority.map(|p| p as u8),
        confidence,
        active: active != 0,
        created_at: parse_ts(&created_at)?,
        updated_at: parse_ts(&updated_at)?,
        valid_from: valid_from.map(|s| parse_ts(&s)).transpose()?,
        valid_until: valid_until.map(|s| parse_ts(&s)).transpose()?,
        payload,
        version: version as u32,
        content_hash,
    })
}
