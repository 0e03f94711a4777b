//! Entry Fetcher. Translates the request's filter fields into a
//! `FetchOptions` block and delegates row access to `StorageDriver`, which
//! applies the strict filter order itself (steps 1-10); candidate
//! id intersection (step 0) is the `candidate_ids` argument.

use std::collections::BTreeSet;

use agentmem_core::errors::{CoreError, CoreResult};
use agentmem_core::model::{Entry, EntryId, EntryKind, Scope};
use agentmem_core::traits::{FetchOptions, StorageDriver, TagFilter, TemporalQuery};

use crate::request::{QueryRequest, TagFilterRequest};

fn to_tag_filter(req: Option<&TagFilterRequest>) -> TagFilter {
    match req {
        None => TagFilter::default(),
        Some(t) => TagFilter {
            include: t.include.iter().cloned().collect::<BTreeSet<_>>(),
            require: t.require.iter().cloned().collect::<BTreeSet<_>>(),
            exclude: t.exclude.iter().cloned().collect::<BTreeSet<_>>(),
        },
    }
}

/// Builds the Entry Fetcher's options block from the public request.
/// `candidate_limit = ceil(limit * 1.5)`.
pub fn build_fetch_options(request: &QueryRequest, limit: usize) -> CoreResult<FetchOptions> {
    let temporal = match (&request.at_time, &request.valid_during) {
        (Some(t), _) => Some(TemporalQuery::AtTime(*t)),
        (None, Some(v)) => Some(TemporalQuery::ValidDuring { start: v.start, end: v.end }),
        (None, None) => None,
    };

    let priority_min = request.priority.as_ref().and_then(|r| r.min).map(|v| v as u8);
    let priority_max = request.priority.as_ref().and_then(|r| r.max).map(|v| v as u8);
    if let (Some(min), Some(max)) = (priority_min, priority_max) {
        if min > max {
            return Err(CoreError::bad_request("priority.min must be <= priority.max"));
        }
    }
    let confidence_min = request.confidence.as_ref().and_then(|r| r.min);
    let confidence_max = request.confidence.as_ref().and_then(|r| r.max);
    if let (Some(min), Some(max)) = (confidence_min, confidence_max) {
        if min > max {
            return Err(CoreError::bad_request("confidence.min must be <= confidence.max"));
        }
    }

    let candidate_limit = (limit as f64 * agentmem_core::constants::CANDIDATE_OVERFETCH_FACTOR).ceil() as usize;

    Ok(FetchOptions {
        include_inactive: request.include_inactive,
        tags: to_tag_filter(request.tags.as_ref()),
        priority_min,
        priority_max,
        confidence_min,
        confidence_max,
        temporal,
        created_after: request.created_after,
        created_before: request.created_before,
        updated_after: None,
        updated_before: None,
        candidate_limit,
    })
}

/// Fetches the refined entry set for the candidate pool. A
/// `None` `candidate_ids` means "all entries in scope" (no keyword,
/// semantic, or relation candidate generator ran).
pub fn fetch_entries(
    storage: &dyn StorageDriver,
    candidate_ids: Option<&[EntryId]>,
    scope_chain: &[Scope],
    kinds: &[EntryKind],
    options: &FetchOptions,
) -> CoreResult<Vec<Entry>> {
    storage.fetch_candidates(candidate_ids, scope_chain, kinds, options)
}
