//! `StorageEngine` — owns the `ConnectionPool`, runs schema setup on open,
//! and implements `StorageDriver`. Wraps a pool and dispatches CRUD/query
//! calls to the `queries::*` modules, choosing the read pool vs. the writer
//! per call.

use std::path::Path;

use agentmem_core::errors::CoreResult;
use agentmem_core::model::{Direction, Entry, EntryId, EntryKind, FeedbackScore, Relation, RelationType, Scope};
use agentmem_core::traits::{FetchOptions, StorageDriver};
use tracing::{debug, info};

use crate::pool::ConnectionPool;
use crate::queries;
use crate::schema;

pub struct StorageEngine {
    pool: ConnectionPool,
}

impl StorageEngine {
    pub fn open(path: &Path) -> CoreResult<Self> {
        let pool = ConnectionPool::open(path, ConnectionPool::default_read_pool_size())?;
        let engine = Self { pool };
        engine.pool.writer.with_conn(|conn| schema::run_migrations(conn))?;
        info!(path = %path.display(), "storage engine opened");
        Ok(engine)
    }

    pub fn open_in_memory() -> CoreResult<Self> {
        let pool = ConnectionPool::open_in_memory()?;
        let engine = Self { pool };
        engine.pool.writer.with_conn(|conn| schema::run_migrations(conn))?;
        debug!("in-memory storage engine opened");
        Ok(engine)
    }

    fn with_reader<F, T>(&self, f: F) -> CoreResult<T>
    where
        F: FnOnce(&rusqlite::Connection) -> CoreResult<T>,
    {
        if self.pool.readers.is_empty() {
            self.pool.writer.with_conn(f)
        } else {
            self.pool.readers.with_conn(f)
        }
    }

    /// Registers a scope's parent link (e.g. a project's org), used by test
    /// and fixture setup ahead of queries with `inherit=true`.
    /// Not part of `StorageDriver`: scope topology is provisioned by
    /// whatever system owns organizations/projects, not the retrieval core.
    pub fn register_scope(&self, child: Scope, parent: Option<Scope>) -> CoreResult<()> {
        self.pool.writer.with_conn(|conn| queries::scopes::register_scope(conn, &child, parent.as_ref()))
    }

    /// Inserts or upserts a relation edge. Not part of `StorageDriver` for
    /// the same reason as `register_scope` — edges are written by whatever
    /// process builds the relation graph.
    pub fn add_relation(&self, relation: Relation) -> CoreResult<()> {
        self.pool.writer.with_conn(|conn| queries::relations::add_relation(conn, &relation))
    }
}

impl StorageDriver for StorageEngine {
    fn create(&self, entry: &Entry) -> CoreResult<()> {
        self.pool.writer.with_conn(|conn| queries::entry_crud::create(conn, entry))?;
        debug!(id = %entry.id, kind = ?entry.kind, "entry created");
        Ok(())
    }

    fn update(&self, entry: &Entry) -> CoreResult<()> {
        self.pool.writer.with_conn(|conn| queries::entry_crud::update(conn, entry))?;
        debug!(id = %entry.id, "entry updated");
        Ok(())
    }

    fn delete(&self, id: &EntryId) -> CoreResult<()> {
        self.pool.writer.with_conn(|conn| queries::entry_crud::delete(conn, id))?;
        debug!(%id, "entry deleted");
        Ok(())
    }

    fn deactivate(&self, id: &EntryId) -> CoreResult<()> {
        self.pool.writer.with_conn(|conn| queries::entry_crud::deactivate(conn, id))?;
        debug!(%id, "entry deactivated");
        Ok(())
    }

    fn get(&self, id: &EntryId) -> CoreResult<Option<Entry>> {
        self.with_reader(|conn| queries::entry_crud::get(conn, id))
    }

    fn list_ids_by_scope_and_kind(&self, scopes: &[Scope], kinds: &[EntryKind]) -> CoreResult<Vec<EntryId>> {
        self.with_reader(|conn| queries::entry_query::list_ids_by_scope_and_kind(conn, scopes, kinds))
    }

    fn fetch_candidates(
        &self,
        candidate_ids: Option<&[EntryId]>,
        scopes: &[Scope],
        kinds: &[EntryKind],
        options: &FetchOptions,
    ) -> CoreResult<Vec<Entry>> {
        self.with_reader(|conn| queries::entry_query::fetch_candidates(conn, candidate_ids, scopes, kinds, options))
    }

    fn search_fts(&self, query: &str, limit: usize) -> CoreResult<Vec<(EntryId, f64)>> {
        self.with_reader(|conn| queries::fts::search_fts(conn, query, limit))
    }

    fn batch_tags(&self, ids: &[EntryId]) -> CoreResult<std::collections::HashMap<EntryId, std::collections::BTreeSet<String>>> {
        self.with_reader(|conn| queries::tags::batch_tags(conn, ids))
    }

    fn relation_neighbors(
        &self,
        id: &EntryId,
        relation_type: Option<&RelationType>,
        direction: Direction,
    ) -> CoreResult<Vec<Relation>> {
        self.with_reader(|conn| queries::relations::relation_neighbors(conn, id, relation_type, direction))
    }

    fn feedback_rollup(&self, kind: EntryKind, id: &EntryId) -> CoreResult<Option<FeedbackScore>> {
        self.with_reader(|conn| queries::feedback::feedback_rollup(conn, kind, id))
    }

    fn record_feedback(&self, kind: EntryKind, id: &EntryId, positive: bool) -> CoreResult<()> {
        self.pool.writer.with_conn(|conn| queries::feedback::record_feedback(conn, kind, id, positive))
    }

    fn parent_scope(&self, scope: &Scope) -> CoreResult<Option<Scope>> {
        self.with_reader(|conn| queries::scopes::parent_scope(conn, scope))
    }

    fn scope_exists(&self, scope: &Scope) -> CoreResult<bool> {
        self.with_reader(|conn| queries::scopes::scope_exists(conn, scope))
    }
}
