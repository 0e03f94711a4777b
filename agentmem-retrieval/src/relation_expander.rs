//! Relation Expander: bounded BFS over the typed relation graph,
//! generalized to arbitrary depth/direction/type.

use std::collections::{HashMap, HashSet, VecDeque};

use agentmem_core::errors::CoreResult;
use agentmem_core::model::{Direction, EntryId, EntryKind, RelationType};
use agentmem_core::traits::StorageDriver;
use tracing::debug;

pub const MIN_RELATION_DEPTH: usize = 1;
pub const MAX_RELATION_DEPTH: usize = 5;

#[derive(Debug, Default)]
pub struct RelationExpansion {
    pub ids_by_kind: HashMap<EntryKind, Vec<EntryId>>,
    /// Edge weight observed when each id was first reached; surfaced
    /// downstream but not used to order this stage's output.
    pub edge_weight: HashMap<EntryId, f64>,
}

impl RelationExpansion {
    pub fn all_ids(&self) -> Vec<EntryId> {
        self.ids_by_kind.values().flatten().cloned().collect()
    }

    pub fn contains(&self, id: &EntryId) -> bool {
        self.ids_by_kind.values().any(|ids| ids.contains(id))
    }
}

/// Performs the bounded BFS. `max_depth` is clamped
/// into `[1,5]`. The seed is excluded from the result; a visited set
/// prevents cycles; edges whose source or target entry is inactive are
/// skipped entirely (neither traversed through nor included).
pub fn expand(
    storage: &dyn StorageDriver,
    seed: &EntryId,
    relation_type: Option<&RelationType>,
    direction: Direction,
    max_depth: usize,
    max_results: Option<usize>,
) -> CoreResult<RelationExpansion> {
    let depth = max_depth.clamp(MIN_RELATION_DEPTH, MAX_RELATION_DEPTH);

    let mut visited: HashSet<EntryId> = HashSet::new();
    visited.insert(seed.clone());

    let mut result = RelationExpansion::default();
    let mut frontier: VecDeque<(EntryId, usize)> = VecDeque::new();
    frontier.push_back((seed.clone(), 0));

    while let Some((current, current_depth)) = frontier.pop_front() {
        if current_depth >= depth {
            continue;
        }
        let neighbors = storage.relation_neighbors(&current, relation_type, direction)?;
        for edge in neighbors {
            if edge.is_self_loop() {
                continue;
            }
            let other = if edge.source_id == current {
                edge.target_id.clone()
            } else {
                edge.source_id.clone()
            };
            if visited.contains(&other) {
                continue;
            }
            let source_active = storage.get(&edge.source_id)?.map(|e| e.active).unwrap_or(false);
            let target_active = storage.get(&edge.target_id)?.map(|e| e.active).unwrap_or(false);
            if !source_active || !target_active {
                continue;
            }
            visited.insert(other.clone());
            if let Some(entry) = storage.get(&other)? {
                result.edge_weight.entry(other.clone()).or_insert(edge.weight);
                let bucket = result.ids_by_kind.entry(entry.kind).or_default();
                bucket.push(other.clone());
                if let Some(max) = max_results {
                    if result.all_ids().len() >= max {
                        debug!(seed = %seed, max, "relation expansion reached max_results, truncating");
                        return Ok(result);
                    }
                }
            }
            frontier.push_back((other, current_depth + 1));
        }
    }

    debug!(seed = %seed, found = result.all_ids().len(), depth, "relation expansion complete");
    Ok(result)
}
