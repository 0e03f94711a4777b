//! list-by-scope-and-kind and fetch-candidates.
//!
//! Scope, kind, candidate-id membership, and active/inactive are pushed
//! down into SQL; the remaining filter predicate (tags, priority,
//! confidence, temporal validity, created/updated windows) is applied in
//! Rust against the narrowed row set, the same predicate
//! `agentmem-test-fixtures::FakeStorageDriver` applies, so both drivers
//! agree on edge cases like "entries lacking temporal fields are
//! always-valid".

use rusqlite::{params_from_iter, Connection};

use agentmem_core::errors::{CoreError, CoreResult};
use agentmem_core::model::{Entry, EntryId, EntryKind, Scope};
use agentmem_core::traits::{FetchOptions, TemporalQuery};

use crate::convert::{entry_from_row, kind_to_str, scope_to_columns};

fn storage_err(context: &str, e: impl std::fmt::Display) -> CoreError {
    CoreError::Unavailable(format!("{context}: {e}"))
}

/// Builds a `(scope_type = ?a AND (scope_id = ?b OR ...)) OR (...)` clause
/// matching any scope in `scopes`, plus bound params in the same order.
fn scope_predicate(scopes: &[Scope]) -> (String, Vec<rusqlite::types::Value>) {
    let mut clauses = Vec::with_capacity(scopes.len());
    let mut params = Vec::new();
    for scope in scopes {
        let (ty, id) = scope_to_columns(scope);
        match id {
            Some(id) => {
                clauses.push("(scope_type = ? AND scope_id = ?)".to_string());
                params.push(rusqlite::types::Value::Text(ty.to_string()));
                params.push(rusqlite::types::Value::Text(id.to_string()));
            }
            None => {
                clauses.push("(scope_type = ? AND scope_id IS NULL)".to_string());
                params.push(rusqlite::types::Value::Text(ty.to_string()));
            }
        }
    }
    if clauses.is_empty() {
        ("0".to_string(), params)
    } else {
        (clauses.join(" OR "), params)
    }
}

fn kind_predicate(kinds: &[EntryKind]) -> (String, Vec<rusqlite::types::Value>) {
    if kinds.is_empty() {
        return ("0".to_string(), Vec::new());
    }
    let placeholders = vec!["?"; kinds.len()].join(",");
    let params = kinds.iter().map(|k| rusqlite::types::Value::Text(kind_to_str(*k).to_string())).collect();
    (format!("kind IN ({placeholders})"), params)
}

pub fn list_ids_by_scope_and_kind(conn: &Connection, scopes: &[Scope], kinds: &[EntryKind]) -> CoreResult<Vec<EntryId>> {
    let (scope_sql, scope_params) = scope_predicate(scopes);
    let (kind_sql, kind_params) = kind_predicate(kinds);
    let sql = format!("SELECT id FROM entries WHERE ({scope_sql}) AND ({kind_sql})");
    let mut stmt = conn.prepare(&sql).map_err(|e| storage_err("list_ids prepare", e))?;
    let all_params: Vec<rusqlite::types::Value> = scope_params.into_iter().chain(kind_params).collect();
    let ids = stmt
        .query_map(params_from_iter(all_params), |row| row.get::<_, String>(0))
        .map_err(|e| storage_err("list_ids query", e))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| storage_err("list_ids collect", e))?;
    Ok(ids.into_iter().map(EntryId::new).collect())
}

fn matches_temporal(entry: &Entry, temporal: &Option<TemporalQuery>) -> bool {
    match temporal {
        None => true,
        Some(TemporalQuery::AtTime(t)) => {
            let after_from = entry.valid_from.map(|f| f <= *t).unwrap_or(true);
            let before_until = entry.valid_until.map(|u| *t < u).unwrap_or(true);
            after_from && before_until
        }
        Some(TemporalQuery::ValidDuring { start, end }) => {
            let from = entry.valid_from.unwrap_or(chrono::DateTime::<chrono::Utc>::MIN_UTC);
            let until = entry.valid_until.unwrap_or(chrono::DateTime::<chrono::Utc>::MAX_UTC);
            from < *end && *start < until
        }
    }
}

/// Filter steps 4-10, applied after scope/kind/candidate-id/active have
/// already narrowed the row set in SQL.
fn passes_row_filters(entry: &Entry, options: &FetchOptions) -> bool {
    if !options.tags.include.is_empty() && entry.tags.is_disjoint(&options.tags.include) {
        return false;
    }
    if !options.tags.require.is_subset(&entry.tags) {
        return false;
    }
    if !entry.tags.is_disjoint(&options.tags.exclude) {
        return false;
    }
    if entry.kind == EntryKind::Guideline {
        if let Some(min) = options.priority_min {
            if entry.priority.unwrap_or(0) < min {
                return false;
            }
        }
        if let Some(max) = options.priority_max {
            if entry.priority.unwrap_or(100) > max {
                return false;
            }
        }
    }
    if entry.kind == EntryKind::Knowledge {
        if let Some(min) = options.confidence_min {
            if entry.confidence.unwrap_or(0.0) < min {
                return false;
            }
        }
        if let Some(max) = options.confidence_max {
            if entry.confidence.unwrap_or(1.0) > max {
                return false;
            }
        }
    }
    if !matches_temporal(entry, &options.temporal) {
        return false;
    }
    if let Some(after) = options.created_after {
        if entry.created_at < after {
            return false;
        }
    }
    if let Some(before) = options.created_before {
        if entry.created_at > before {
            return false;
        }
    }
    if let Some(after) = options.updated_after {
        if entry.updated_at < after {
            return false;
        }
    }
    if let Some(before) = options.updated_before {
        if entry.updated_at > before {
            return false;
        }
    }
    true
}

pub fn fetch_candidates(
    conn: &Connection,
    candidate_ids: Option<&[EntryId]>,
    scopes: &[Scope],
    kinds: &[EntryKind],
    options: &FetchOptions,
) -> CoreResult<Vec<Entry>> {
    let (scope_sql, scope_params) = scope_predicate(scopes);
    let (kind_sql, kind_params) = kind_predicate(kinds);
    let mut clauses = vec![format!("({scope_sql})"), format!("({kind_sql})")];
    let mut params: Vec<rusqlite::types::Value> = scope_params.into_iter().chain(kind_params).collect();

    if !options.include_inactive {
        clauses.push("active = 1".to_string());
    }
    if let Some(ids) = candidate_ids {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; ids.len()].join(",");
        clauses.push(format!("id IN ({placeholders})"));
        params.extend(ids.iter().map(|id| rusqlite::types::Value::Text(id.as_str().to_string())));
    }

    let sql = format!("SELECT * FROM entries WHERE {}", clauses.join(" AND "));
    let mut stmt = conn.prepare(&sql).map_err(|e| storage_err("fetch_candidates prepare", e))?;
    let rows: Vec<(String, CoreResult<Entry>)> = stmt
        .query_map(params_from_iter(params), |row| {
            let id: String = row.get("id")?;
            Ok((id, entry_from_row(row)))
        })
        .map_err(|e| storage_err("fetch_candidates query", e))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| storage_err("fetch_candidates collect", e))?;

    let ids: Vec<EntryId> = rows.iter().map(|(id, _)| EntryId::new(id.clone())).collect();
    let tags_by_id = super::tags::batch_tags(conn, &ids)?;

    let mut entries = Vec::with_capacity(rows.len());
    for (id, entry) in rows {
        let mut entry = entry?;
        entry.tags = tags_by_id.get(&EntryId::new(id)).cloned().unwrap_or_default();
        if passes_row_filters(&entry, options) {
            entries.push(entry);
        }
    }

    entries.sort_by(|a, b| a.id.cmp(&b.id));
    if options.candidate_limit != 0 && entries.len() > options.candidate_limit {
        entries.truncate(options.candidate_limit);
    }
    Ok(entries)
}
