//! Result Assembler: batch tag load, per-kind context quota,
//! pagination, and the public response shape.

use std::collections::{BTreeMap, HashMap};

use agentmem_core::errors::CoreResult;
use agentmem_core::model::EntryKind;
use agentmem_core::traits::StorageDriver;

use crate::request::ResultEntry;
use crate::scorer::ScoredEntry;

/// Applies the "context" quota — `ceil(limit / |kinds|)` per kind —
/// before the final sort, only when `search` was empty and `action ==
/// context`. Within each kind's quota the existing score order is
/// preserved; the combined set is then handed back for the final sort.
pub fn apply_context_quota(mut scored: Vec<ScoredEntry>, limit: usize, kinds: &[EntryKind]) -> Vec<ScoredEntry> {
    if kinds.is_empty() {
        return scored;
    }
    let quota = (limit as f64 / kinds.len() as f64).ceil() as usize;
    let mut taken: HashMap<EntryKind, usize> = HashMap::new();
    scored.retain(|s| {
        let count = taken.entry(s.entry.kind).or_insert(0);
        if *count < quota {
            *count += 1;
            true
        } else {
            false
        }
    });
    scored
}

/// Batch-loads tag sets for the final short list and reconciles them onto
/// each entry. In this workspace `Entry::tags` is already populated by the
/// fetcher, so this is a consistency check against the storage driver's tag
/// table rather than the only source of truth — kept as an explicit step so
/// a driver whose fetch path omits tags still gets them filled in here.
pub fn reconcile_tags(storage: &dyn StorageDriver, scored: &mut [ScoredEntry]) -> CoreResult<()> {
    let ids: Vec<_> = scored.iter().map(|s| s.entry.id.clone()).collect();
    let tag_map = storage.batch_tags(&ids)?;
    for scored_entry in scored.iter_mut() {
        if let Some(tags) = tag_map.get(&scored_entry.entry.id) {
            scored_entry.entry.tags = tags.clone();
        }
    }
    Ok(())
}

pub fn to_result_entry(scored: &ScoredEntry) -> ResultEntry {
    let entry = &scored.entry;
    ResultEntry {
        id: entry.id.to_string(),
        kind: entry.kind,
        scope: entry.scope.clone(),
        name: entry.name.clone(),
        content: entry.body.clone(),
        tags: entry.tags.iter().cloned().collect(),
        priority: entry.priority,
        confidence: entry.confidence,
        score: scored.score,
        matched_fields: matched_fields(scored),
        created_at: entry.created_at,
        updated_at: entry.updated_at,
        valid_from: entry.valid_from,
        valid_until: entry.valid_until,
    }
}

fn matched_fields(scored: &ScoredEntry) -> Option<Vec<String>> {
    let mut fields = Vec::new();
    if scored.signals.text_matched {
        fields.push("name".to_string());
        fields.push("content".to_string());
    }
    if scored.signals.semantic_score.is_some() {
        fields.push("semantic".to_string());
    }
    if fields.is_empty() {
        None
    } else {
        Some(fields)
    }
}

/// Applies offset/limit pagination and builds the final entries + timings shape.
pub fn paginate(scored: Vec<ScoredEntry>, offset: usize, limit: usize) -> (Vec<ScoredEntry>, usize) {
    let total = scored.len();
    let page = scored.into_iter().skip(offset).take(limit).collect();
    (page, total)
}

pub fn stage_timings_map(timings: &[(&str, f64)]) -> BTreeMap<String, f64> {
    timings.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}
