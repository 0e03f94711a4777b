//! Schema creation — a single idempotent migration rather than a numbered
//! `migrations::vNNN_*` ladder, since this reference driver has exactly one
//! schema version to carry (schema migrations proper are out of scope
//! here).

use rusqlite::Connection;

use agentmem_core::errors::{CoreError, CoreResult};

fn storage_err(context: &str, e: impl std::fmt::Display) -> CoreError {
    CoreError::Unavailable(format!("{context}: {e}"))
}

pub fn run_migrations(conn: &Connection) -> CoreResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS entries (
            id            TEXT PRIMARY KEY,
            kind          TEXT NOT NULL,
            scope_type    TEXT NOT NULL,
            scope_id      TEXT,
            name          TEXT NOT NULL,
            body          TEXT NOT NULL,
            title         TEXT,
            priority      INTEGER,
            confidence    REAL,
            active        INTEGER NOT NULL,
            created_at    TEXT NOT NULL,
            updated_at    TEXT NOT NULL,
            valid_from    TEXT,
            valid_until   TEXT,
            payload       TEXT NOT NULL,
            version       INTEGER NOT NULL,
            content_hash  TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_entries_scope ON entries(scope_type, scope_id);
        CREATE INDEX IF NOT EXISTS idx_entries_kind ON entries(kind);
        CREATE INDEX IF NOT EXISTS idx_entries_active ON entries(active);

        CREATE TABLE IF NOT EXISTS entry_tags (
            entry_id TEXT NOT NULL REFERENCES entries(id) ON DELETE CASCADE,
            tag      TEXT NOT NULL,
            PRIMARY KEY (entry_id, tag)
        );

        CREATE INDEX IF NOT EXISTS idx_entry_tags_tag ON entry_tags(tag);

        CREATE TABLE IF NOT EXISTS relations (
            source_id      TEXT NOT NULL,
            target_id      TEXT NOT NULL,
            relation_type  TEXT NOT NULL,
            properties     TEXT NOT NULL,
            weight         REAL NOT NULL,
            PRIMARY KEY (source_id, target_id, relation_type)
        );

        CREATE INDEX IF NOT EXISTS idx_relations_source ON relations(source_id);
        CREATE INDEX IF NOT EXISTS idx_relations_target ON relations(target_id);

        CREATE TABLE IF NOT EXISTS feedback_scores (
            kind            TEXT NOT NULL,
            entry_id        TEXT NOT NULL,
            positive_count  INTEGER NOT NULL DEFAULT 0,
            negative_count  INTEGER NOT NULL DEFAULT 0,
            inserted_at     TEXT NOT NULL,
            PRIMARY KEY (kind, entry_id)
        );

        CREATE TABLE IF NOT EXISTS scope_links (
            scope_type   TEXT NOT NULL,
            scope_id     TEXT NOT NULL,
            parent_type  TEXT,
            parent_id    TEXT,
            PRIMARY KEY (scope_type, scope_id)
        );

        CREATE VIRTUAL TABLE IF NOT EXISTS entries_fts USING fts5(
            id UNINDEXED,
            name,
            title,
            body,
            tokenize = 'unicode61'
        );
        ",
    )
    .map_err(|e| storage_err("run_migrations", e))
}
