//! Feedback rollup and recording.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use agentmem_core::errors::{CoreError, CoreResult};
use agentmem_core::model::{EntryId, EntryKind, FeedbackScore};

fn storage_err(context: &str, e: impl std::fmt::Display) -> CoreError {
    CoreError::Unavailable(format!("{context}: {e}"))
}

fn kind_str(kind: EntryKind) -> &'static str {
    kind.as_str()
}

pub fn feedback_rollup(conn: &Connection, kind: EntryKind, id: &EntryId) -> CoreResult<Option<FeedbackScore>> {
    conn.query_row(
        "SELECT positive_count, negative_count, inserted_at FROM feedback_scores WHERE kind = ?1 AND entry_id = ?2",
        params![kind_str(kind), id.as_str()],
        |row| {
            let positive_count: i64 = row.get(0)?;
            let negative_count: i64 = row.get(1)?;
            let inserted_at: String = row.get(2)?;
            Ok((positive_count, negative_count, inserted_at))
        },
    )
    .optional()
    .map_err(|e| storage_err("feedback_rollup", e))?
    .map(|(positive, negative, inserted_at)| {
        Ok(FeedbackScore {
            kind,
            entry_id: id.clone(),
            positive_count: positive as u32,
            negative_count: negative as u32,
            inserted_at: chrono::DateTime::parse_from_rfc3339(&inserted_at)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| storage_err("feedback_rollup timestamp", e))?,
        })
    })
    .transpose()
}

pub fn record_feedback(conn: &Connection, kind: EntryKind, id: &EntryId, positive: bool) -> CoreResult<()> {
    let (pos_delta, neg_delta) = if positive { (1, 0) } else { (0, 1) };
    conn.execute(
        "INSERT INTO feedback_scores (kind, entry_id, positive_count, negative_count, inserted_at)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(kind, entry_id) DO UPDATE SET
            positive_count = positive_count + ?3,
            negative_count = negative_count + ?4",
        params![kind_str(kind), id.as_str(), pos_delta, neg_delta, Utc::now().to_rfc3339()],
    )
    .map_err(|e| storage_err("record_feedback", e))?;
    Ok(())
}
