//! Reciprocal Rank Fusion, used to merge the FTS/semantic/relation/entity
//! candidate generators' outputs into one rank-ordered id list before the
//! Entry Fetcher runs. Stage 6's candidate union leaves the merge strategy
//! otherwise unspecified, so RRF fills that gap.

use std::collections::HashMap;

use agentmem_core::model::EntryId;

/// Smoothing constant; higher values reduce the influence of any single
/// source's top rank.
pub const RRF_K: f64 = 60.0;

/// Fuses any number of ranked id lists (each already sorted best-first) via
/// `score += 1/(k + rank)`, and returns ids sorted by descending fused
/// score. Ties break by id for determinism.
pub fn fuse(sources: &[&[EntryId]]) -> Vec<EntryId> {
    let mut scores: HashMap<EntryId, f64> = HashMap::new();
    for list in sources {
        for (rank, id) in list.iter().enumerate() {
            *scores.entry(id.clone()).or_insert(0.0) += 1.0 / (RRF_K + rank as f64);
        }
    }
    let mut ids: Vec<EntryId> = scores.keys().cloned().collect();
    ids.sort_by(|a, b| {
        scores[b]
            .partial_cmp(&scores[a])
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.cmp(b))
    });
    ids
}
