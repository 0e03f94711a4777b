//! In-memory `StorageDriver` fake, mirroring the real engine's
//! `open_in_memory()` mode minus SQLite — plain `HashMap`s behind a `Mutex`,
//! since the fake only needs to be correct, not fast.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Mutex;

use chrono::Utc;

use agentmem_core::errors::{CoreError, CoreResult};
use agentmem_core::model::{Direction, Entry, EntryId, EntryKind, FeedbackScore, Relation, RelationType, Scope};
use agentmem_core::traits::{FetchOptions, StorageDriver, TemporalQuery};

#[derive(Default)]
struct Inner {
    entries: HashMap<EntryId, Entry>,
    relations: Vec<Relation>,
    feedback: HashMap<(EntryKind, EntryId), FeedbackScore>,
    scope_parents: HashMap<Scope, Scope>,
    known_scopes: HashSet<Scope>,
}

/// A complete, in-process `StorageDriver`. Every method runs against plain
/// in-memory collections guarded by a single mutex — fine for tests, never
/// used in production.
pub struct FakeStorageDriver {
    inner: Mutex<Inner>,
}

impl Default for FakeStorageDriver {
    fn default() -> Self {
        let mut inner = Inner::default();
        inner.known_scopes.insert(Scope::Global);
        Self {
            inner: Mutex::new(inner),
        }
    }
}

impl FakeStorageDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `child`'s parent as `parent` and marks both as known scopes
    /// (used by corpus builders to wire up a project -> org -> global chain
    /// before seeding entries).
    pub fn register_scope(&self, child: Scope, parent: Option<Scope>) {
        let mut inner = self.inner.lock().expect("fake storage mutex poisoned");
        inner.known_scopes.insert(child.clone());
        if let Some(parent) = parent {
            inner.known_scopes.insert(parent.clone());
            inner.scope_parents.insert(child, parent);
        }
    }

    pub fn seed_relation(&self, relation: Relation) {
        let mut inner = self.inner.lock().expect("fake storage mutex poisoned");
        let dup = inner.relations.iter().any(|r| {
            r.source_id == relation.source_id
                && r.target_id == relation.target_id
                && r.relation_type == relation.relation_type
        });
        if !dup {
            inner.relations.push(relation);
        }
    }

    pub fn entry_count(&self) -> usize {
        self.inner.lock().expect("fake storage mutex poisoned").entries.len()
    }
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
            let from = entry.valid_from.unwrap_or(chrono::DateTime::<Utc>::MIN_UTC);
            let until = entry.valid_until.unwrap_or(chrono::DateTime::<Utc>::MAX_UTC);
            from < *end && *start < until
        }
    }
}

/// Applies the filter predicate, in the strict order it specifies,
/// to a single entry. Candidate-id intersection is handled by the caller
/// before this runs (step 0).
fn passes_filters(entry: &Entry, scopes: &[Scope], kinds: &[EntryKind], options: &FetchOptions) -> bool {
    if !scopes.iter().any(|s| s == &entry.scope) {
        return false;
    }
    if !kinds.contains(&entry.kind) {
        return false;
    }
    if !entry.is_visible(options.include_inactive) {
        return false;
    }
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

impl StorageDriver for FakeStorageDriver {
    fn create(&self, entry: &Entry) -> CoreResult<()> {
        entry.validate()?;
        let mut inner = self.inner.lock().expect("fake storage mutex poisoned");
        if inner.entries.contains_key(&entry.id) {
            return Err(CoreError::Conflict(format!("entry {} already exists", entry.id)));
        }
        inner.known_scopes.insert(entry.scope.clone());
        inner.entries.insert(entry.id.clone(), entry.clone());
        Ok(())
    }

    fn update(&self, entry: &Entry) -> CoreResult<()> {
        entry.validate()?;
        let mut inner = self.inner.lock().expect("fake storage mutex poisoned");
        if !inner.entries.contains_key(&entry.id) {
            return Err(CoreError::not_found(format!("entry {} not found", entry.id)));
        }
        inner.entries.insert(entry.id.clone(), entry.clone());
        Ok(())
    }

    fn delete(&self, id: &EntryId) -> CoreResult<()> {
        let mut inner = self.inner.lock().expect("fake storage mutex poisoned");
        inner.entries.remove(id);
        inner.relations.retain(|r| &r.source_id != id && &r.target_id != id);
        Ok(())
    }

    fn deactivate(&self, id: &EntryId) -> CoreResult<()> {
        let mut inner = self.inner.lock().expect("fake storage mutex poisoned");
        let entry = inner
            .entries
            .get_mut(id)
            .ok_or_else(|| CoreError::not_found(format!("entry {id} not found")))?;
        entry.active = false;
        Ok(())
    }

    fn get(&self, id: &EntryId) -> CoreResult<Option<Entry>> {
        Ok(self.inner.lock().expect("fake storage mutex poisoned").entries.get(id).cloned())
    }

    fn list_ids_by_scope_and_kind(&self, scopes: &[Scope], kinds: &[EntryKind]) -> CoreResult<Vec<EntryId>> {
        let inner = self.inner.lock().expect("fake storage mutex poisoned");
        Ok(inner
            .entries
            .values()
            .filter(|e| scopes.iter().any(|s| s == &e.scope) && kinds.contains(&e.kind))
            .map(|e| e.id.clone())
            .collect())
    }

    fn fetch_candidates(
        &self,
        candidate_ids: Option<&[EntryId]>,
        scopes: &[Scope],
        kinds: &[EntryKind],
        options: &FetchOptions,
    ) -> CoreResult<Vec<Entry>> {
        let inner = self.inner.lock().expect("fake storage mutex poisoned");
        let pool: Box<dyn Iterator<Item = &Entry>> = match candidate_ids {
            Some(ids) => Box::new(ids.iter().filter_map(|id| inner.entries.get(id))),
            None => Box::new(inner.entries.values()),
        };
        let mut results: Vec<Entry> = pool
            .filter(|e| passes_filters(e, scopes, kinds, options))
            .cloned()
            .collect();
        results.sort_by(|a, b| a.id.cmp(&b.id));
        if options.candidate_limit != 0 && results.len() > options.candidate_limit {
            results.truncate(options.candidate_limit);
        }
        Ok(results)
    }

    fn search_fts(&self, query: &str, limit: usize) -> CoreResult<Vec<(EntryId, f64)>> {
        let inner = self.inner.lock().expect("fake storage mutex poisoned");
        let terms: Vec<String> = query
            .split_whitespace()
            .filter(|t| !matches!(*t, "AND" | "OR" | "NOT"))
            .map(|t| t.trim_matches('"').trim_end_matches('*').to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        let mut scored: Vec<(EntryId, f64)> = inner
            .entries
            .values()
            .filter_map(|e| {
                let hay = format!(
                    "{} {} {}",
                    e.name.to_lowercase(),
                    e.title.clone().unwrap_or_default().to_lowercase(),
                    e.body.to_lowercase()
                );
                let score: f64 = terms.iter().map(|t| hay.matches(t.as_str()).count() as f64).sum();
                if score > 0.0 {
                    Some((e.id.clone(), score))
                } else {
                    None
                }
            })
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal).then(a.0.cmp(&b.0)));
        scored.truncate(limit);
        Ok(scored)
    }

    fn batch_tags(&self, ids: &[EntryId]) -> CoreResult<HashMap<EntryId, BTreeSet<String>>> {
        let inner = self.inner.lock().expect("fake storage mutex poisoned");
        Ok(ids
            .iter()
            .filter_map(|id| inner.entries.get(id).map(|e| (id.clone(), e.tags.clone())))
            .collect())
    }

    fn relation_neighbors(
        &self,
        id: &EntryId,
        relation_type: Option<&RelationType>,
        direction: Direction,
    ) -> CoreResult<Vec<Relation>> {
        let inner = self.inner.lock().expect("fake storage mutex poisoned");
        Ok(inner
            .relations
            .iter()
            .filter(|r| !r.is_self_loop())
            .filter(|r| relation_type.map(|t| &r.relation_type == t).unwrap_or(true))
            .filter(|r| match direction {
                Direction::Forward => &r.source_id == id,
                Direction::Backward => &r.target_id == id,
                Direction::Both => &r.source_id == id || &r.target_id == id,
            })
            .cloned()
            .collect())
    }

    fn feedback_rollup(&self, kind: EntryKind, id: &EntryId) -> CoreResult<Option<FeedbackScore>> {
        let inner = self.inner.lock().expect("fake storage mutex poisoned");
        Ok(inner.feedback.get(&(kind, id.clone())).cloned())
    }

    fn record_feedback(&self, kind: EntryKind, id: &EntryId, positive: bool) -> CoreResult<()> {
        let mut inner = self.inner.lock().expect("fake storage mutex poisoned");
        let entry = inner
            .feedback
            .entry((kind, id.clone()))
            .or_insert_with(|| FeedbackScore {
                kind,
                entry_id: id.clone(),
                positive_count: 0,
                negative_count: 0,
                inserted_at: Utc::now(),
            });
        if positive {
            entry.positive_count += 1;
        } else {
            entry.negative_count += 1;
        }
        Ok(())
    }

    fn parent_scope(&self, scope: &Scope) -> CoreResult<Option<Scope>> {
        if scope == &Scope::Global {
            return Ok(None);
        }
        let inner = self.inner.lock().expect("fake storage mutex poisoned");
        Ok(inner.scope_parents.get(scope).cloned())
    }

    fn scope_exists(&self, scope: &Scope) -> CoreResult<bool> {
        if scope == &Scope::Global {
            return Ok(true);
        }
        let inner = self.inner.lock().expect("fake storage mutex poisoned");
        Ok(inner.known_scopes.contains(scope))
    }
}
