//! Scope parent links, backing the Scope Resolver's chain expansion.
//! `Scope::Global` always exists and has no parent; every other
//! scope must be registered via `StorageEngine::register_scope` (mirroring
//! `agentmem-test-fixtures::FakeStorageDriver::register_scope`) before a
//! query against it resolves, or `scope_exists` reports it unknown.

use rusqlite::{params, Connection, OptionalExtension};

use agentmem_core::errors::{CoreError, CoreResult};
use agentmem_core::model::Scope;

use crate::convert::{scope_from_columns, scope_to_columns};

fn storage_err(context: &str, e: impl std::fmt::Display) -> CoreError {
    CoreError::Unavailable(format!("{context}: {e}"))
}

pub fn register_scope(conn: &Connection, child: &Scope, parent: Option<&Scope>) -> CoreResult<()> {
    let (child_type, child_id) = scope_to_columns(child);
    let (parent_type, parent_id) = match parent {
        Some(p) => {
            let (ty, id) = scope_to_columns(p);
            (Some(ty), id.map(|s| s.to_string()))
        }
        None => (None, None),
    };
    conn.execute(
        "INSERT INTO scope_links (scope_type, scope_id, parent_type, parent_id) VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(scope_type, scope_id) DO UPDATE SET parent_type = excluded.parent_type, parent_id = excluded.parent_id",
        params![child_type, child_id, parent_type, parent_id],
    )
    .map_err(|e| storage_err("register_scope", e))?;
    Ok(())
}

pub fn parent_scope(conn: &Connection, scope: &Scope) -> CoreResult<Option<Scope>> {
    if scope == &Scope::Global {
        return Ok(None);
    }
    let (ty, id) = scope_to_columns(scope);
    let row: Option<(Option<String>, Option<String>)> = conn
        .query_row(
            "SELECT parent_type, parent_id FROM scope_links WHERE scope_type = ?1 AND scope_id IS ?2",
            params![ty, id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()
        .map_err(|e| storage_err("parent_scope", e))?;
    match row {
        Some((Some(parent_type), parent_id)) => scope_from_columns(&parent_type, parent_id).map(Some),
        _ => Ok(None),
    }
}

pub fn scope_exists(conn: &Connection, scope: &Scope) -> CoreResult<bool> {
    if scope == &Scope::Global {
        return Ok(true);
    }
    let (ty, id) = scope_to_columns(scope);
    let found: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM scope_links WHERE scope_type = ?1 AND scope_id IS ?2
             UNION SELECT 1 FROM entries WHERE scope_type = ?1 AND scope_id IS ?2 LIMIT 1",
            params![ty, id],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| storage_err("scope_exists", e))?;
    Ok(found.is_some())
}
