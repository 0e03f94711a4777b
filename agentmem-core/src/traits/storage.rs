use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};

use crate::errors::CoreResult;
use crate::model::entry::{Entry, EntryId, EntryKind};
use crate::model::feedback::FeedbackScore;
use crate::model::relation::{Direction, Relation, RelationType};
use crate::model::scope::Scope;

/// Temporal predicate accepted by `fetch_candidates` (step 9).
#[derive(Debug, Clone)]
pub enum TemporalQuery {
    AtTime(DateTime<Utc>),
    ValidDuring { start: DateTime<Utc>, end: DateTime<Utc> },
}

/// Inclusive tag filter sets (steps 4-6).
#[derive(Debug, Clone, Default)]
pub struct TagFilter {
    pub include: BTreeSet<String>,
    pub require: BTreeSet<String>,
    pub exclude: BTreeSet<String>,
}

/// The full options block accepted by the Entry Fetcher.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    pub include_inactive: bool,
    pub tags: TagFilter,
    pub priority_min: Option<u8>,
    pub priority_max: Option<u8>,
    pub confidence_min: Option<f64>,
    pub confidence_max: Option<f64>,
    pub temporal: Option<TemporalQuery>,
    pub created_after: Option<DateTime<Utc>>,
    pub created_before: Option<DateTime<Utc>>,
    pub updated_after: Option<DateTime<Utc>>,
    pub updated_before: Option<DateTime<Utc>>,
    pub candidate_limit: usize,
}

/// Storage driver contract consumed by the Entry Fetcher and other stages,
/// plus the CRUD entry points that produce the `entry_changed` lifecycle
/// events. Durable storage and schema migration are explicitly out of scope
/// for this crate — this trait is the narrow seam a concrete driver like
/// `agentmem-storage` implements.
///
/// All calls are synchronous-from-caller but may suspend on I/O;
/// implementations are free to block or bridge to async internally.
pub trait StorageDriver: Send + Sync {
    // --- CRUD / lifecycle ---
    fn create(&self, entry: &Entry) -> CoreResult<()>;
    fn update(&self, entry: &Entry) -> CoreResult<()>;
    fn delete(&self, id: &EntryId) -> CoreResult<()>;
    fn deactivate(&self, id: &EntryId) -> CoreResult<()>;
    fn get(&self, id: &EntryId) -> CoreResult<Option<Entry>>;

    // --- (a) list-by-scope-and-kind ---
    fn list_ids_by_scope_and_kind(
        &self,
        scopes: &[Scope],
        kinds: &[EntryKind],
    ) -> CoreResult<Vec<EntryId>>;

    // --- (b) fetch-by-ids, with the full filter predicate applied server-side ---
    fn fetch_candidates(
        &self,
        candidate_ids: Option<&[EntryId]>,
        scopes: &[Scope],
        kinds: &[EntryKind],
        options: &FetchOptions,
    ) -> CoreResult<Vec<Entry>>;

    // --- (c) FTS match ---
    /// Returns candidate ids with a sparse tf-idf-equivalent score; order is
    /// significant, absolute magnitude is not.
    fn search_fts(&self, query: &str, limit: usize) -> CoreResult<Vec<(EntryId, f64)>>;

    // --- (d) tag bulk-fetch ---
    fn batch_tags(&self, ids: &[EntryId]) -> CoreResult<HashMap<EntryId, BTreeSet<String>>>;

    // --- (e) relation neighbors ---
    fn relation_neighbors(
        &self,
        id: &EntryId,
        relation_type: Option<&RelationType>,
        direction: Direction,
    ) -> CoreResult<Vec<Relation>>;

    // --- (f) feedback rollup ---
    fn feedback_rollup(&self, kind: EntryKind, id: &EntryId) -> CoreResult<Option<FeedbackScore>>;
    fn record_feedback(&self, kind: EntryKind, id: &EntryId, positive: bool) -> CoreResult<()>;

    /// Resolves the parent scope one level up the chain (project's org,
    /// org's... global has no parent), used by the Scope Resolver. Returns
    /// `Ok(None)` for `Scope::Global` and for a scope with no recorded
    /// parent.
    fn parent_scope(&self, scope: &Scope) -> CoreResult<Option<Scope>>;

    /// Whether `scope` is a known scope id. `Scope::Global` always exists.
    /// The Scope Resolver uses this to fail with `NotFound` on an unknown
    /// scope id regardless of the `inherit` flag.
    fn scope_exists(&self, scope: &Scope) -> CoreResult<bool>;
}
