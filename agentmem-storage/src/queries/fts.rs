//! FTS5 match query.
//!
//! `agentmem-retrieval::fts` already normalizes, tokenizes, and rebuilds the
//! canonical FTS5 match string (AND/OR/NOT, quoted phrases, `*` prefixes);
//! this module only runs it against the `entries_fts` shadow table and
//! turns `bm25()` (lower is more relevant in SQLite) into an ascending
//! tf-idf-equivalent score.

use rusqlite::{params, Connection};

use agentmem_core::errors::{CoreError, CoreResult};
use agentmem_core::model::EntryId;

fn storage_err(e: impl std::fmt::Display) -> CoreError {
    CoreError::Unavailable(format!("fts5 match: {e}"))
}

pub fn search_fts(conn: &Connection, match_string: &str, limit: usize) -> CoreResult<Vec<(EntryId, f64)>> {
    let sql = "SELECT id, bm25(entries_fts) AS rank FROM entries_fts
               WHERE entries_fts MATCH ?1 ORDER BY rank LIMIT ?2";
    let mut stmt = conn.prepare(sql).map_err(storage_err)?;
    let limit = if limit == 0 { i64::MAX } else { limit as i64 };
    let rows = stmt
        .query_map(params![match_string, limit], |row| {
            let id: String = row.get(0)?;
            let bm25: f64 = row.get(1)?;
            Ok((EntryId::new(id), -bm25))
        })
        .map_err(storage_err)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(storage_err)?;
    Ok(rows)
}
