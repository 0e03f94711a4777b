//! `RetrievalEngine`: orchestrates the nine pipeline stages into the public
//! `query()` entry point. A struct holding the collaborators plus config,
//! one `new()`, builder-style optional collaborators, and a single staged
//! method logging each step.

use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeSet, HashMap};
use std::hash::{Hash, Hasher};
use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use agentmem_core::config::RetrievalConfig;
use agentmem_core::constants::CANDIDATE_OVERFETCH_FACTOR;
use agentmem_core::errors::{CoreError, CoreResult};
use agentmem_core::model::{Direction, Entry, EntryId, EntryKind, RelationType};
use agentmem_core::traits::{EmbeddingProvider, HydeGenerator, IntentClassifier, StorageDriver};

use crate::assembler;
use crate::caches::{FeedbackCache, QueryResultCache};
use crate::deadline::Deadline;
use crate::entity::{self, EntityIndex};
use crate::entry_fetcher;
use crate::fts::{self, generate_fts_candidates};
use crate::relation_expander::{self, RelationExpansion};
use crate::request::{Action, QueryRequest, QueryResponse, ResponseMeta};
use crate::rrf;
use crate::scorer::{self, FullScoreContext, ScoredEntry, ScoringSignals};
use crate::semantic::generate_semantic_candidates;
use crate::synonym;

/// HyDE is bounded to a handful of hypothetical documents; the exact count
/// is implementation-defined.
const HYDE_MAX_DOCUMENTS: usize = 3;

/// The nine-stage pipeline, bound to one storage driver and its
/// collaborators for the lifetime of the borrow.
pub struct RetrievalEngine<'a> {
    storage: &'a dyn StorageDriver,
    embedding: &'a dyn EmbeddingProvider,
    hyde: Option<&'a dyn HydeGenerator>,
    intent_classifier: &'a dyn IntentClassifier,
    entity_index: EntityIndex,
    feedback_cache: FeedbackCache,
    query_cache: QueryResultCache,
    config: RetrievalConfig,
}

impl<'a> RetrievalEngine<'a> {
    pub fn new(
        storage: &'a dyn StorageDriver,
        embedding: &'a dyn EmbeddingProvider,
        intent_classifier: &'a dyn IntentClassifier,
        config: RetrievalConfig,
    ) -> Self {
        let feedback_cache = FeedbackCache::new(
            config.cache.feedback_cache_capacity,
            config.cache.feedback_cache_ttl_secs,
        );
        let query_cache = QueryResultCache::new(
            config.cache.query_result_cache_enabled,
            config.cache.query_cache_capacity,
            config.cache.query_cache_ttl_secs,
        );
        Self {
            storage,
            embedding,
            hyde: None,
            intent_classifier,
            entity_index: EntityIndex::new(),
            feedback_cache,
            query_cache,
            config,
        }
    }

    pub fn with_hyde(mut self, hyde: &'a dyn HydeGenerator) -> Self {
        self.hyde = Some(hyde);
        self
    }

    /// Rebuilds the entity reverse index from the full corpus. Call once at boot and after any bulk load.
    pub fn rebuild_entity_index(&self, entries: &[Entry]) {
        self.entity_index.rebuild(entries);
    }

    pub fn index_entry(&self, entry: &Entry) {
        self.entity_index.index_entry(entry);
    }

    pub fn remove_entry_from_index(&self, id: &EntryId) {
        self.entity_index.remove_entry(id);
    }

    /// Drops all cached query results. Callers subscribe this to the
    /// `EventBus` so a write is never served back out of a stale cached
    /// query.
    pub fn invalidate_query_cache(&self) {
        self.query_cache.invalidate_all();
    }

    pub fn invalidate_feedback(&self, kind: EntryKind, id: &EntryId) {
        self.feedback_cache.invalidate(kind, id);
    }

    pub fn query(&self, request: &QueryRequest, now: DateTime<Utc>) -> CoreResult<QueryResponse> {
        self.query_with_deadline(request, now, None, &[])
    }

    /// Runs the full pipeline for `request`, evaluating all decay/feedback
    /// terms as of `now` (injected rather than read from the clock so scoring
    /// stays reproducible in tests). `previously_seen` drops entries already
    /// surfaced in an earlier turn of the same conversation (deduplication
    /// by supersession); this is a pipeline-internal knob, not part of the
    /// public `QueryRequest` shape.
    pub fn query_with_deadline(
        &self,
        request: &QueryRequest,
        now: DateTime<Utc>,
        deadline: Option<Deadline>,
        previously_seen: &[EntryId],
    ) -> CoreResult<QueryResponse> {
        let start = Instant::now();
        let mut timings: Vec<(&str, f64)> = Vec::new();

        let limit = request.limit.unwrap_or(self.config.default_limit);
        if limit == 0 || limit > self.config.max_limit {
            return Err(CoreError::bad_request(format!(
                "limit must be in 1..={}",
                self.config.max_limit
            )));
        }
        let offset = request.offset.unwrap_or(0);

        // Per-request recency overrides: fall back to config when the
        // request leaves a knob unset, same as `hybrid_alpha` below.
        let mut scoring_config = self.config.clone();
        if let Some(weight) = request.recency_weight {
            scoring_config.recency_weight = weight;
        }
        if let Some(days) = request.decay_half_life_days {
            scoring_config.decay_half_life_days = days as f64;
        }
        if let Some(function) = request.decay_function.as_deref() {
            scoring_config.decay_function = scorer::parse_decay_function(function).map_err(CoreError::bad_request)?;
        }

        let cache_key = cache_key_for(request, previously_seen)?;
        if let Some(mut cached) = self.query_cache.get(cache_key) {
            cached.meta.cache_hit = true;
            debug!(cache_key, "query result cache hit");
            return Ok(cached);
        }

        // Stage 1: Scope Resolver — fail-closed.
        let scope = request.scope.to_scope().map_err(CoreError::bad_request)?;
        let scope_chain = crate::scope_resolver::resolve_scope_chain(self.storage, &scope, request.scope.inherit)?;
        timings.push(("scope_resolution", elapsed_ms(start)));

        let kinds: Vec<EntryKind> = request.types.clone().unwrap_or_else(|| EntryKind::ALL.to_vec());
        let intent = request
            .intent
            .unwrap_or_else(|| self.intent_classifier.classify(request.search.as_deref().unwrap_or("")));

        if deadline.map(|d| d.is_exceeded()).unwrap_or(false) {
            return Err(CoreError::Timeout);
        }

        let candidate_limit = (limit as f64 * CANDIDATE_OVERFETCH_FACTOR).ceil() as usize;

        // Stage 2: FTS Candidate Generator, widened by a
        // synonym-expanded re-run when the query has a registered synonym.
        let fts_start = Instant::now();
        let mut fts_scores: HashMap<EntryId, f64> = HashMap::new();
        let mut degraded = false;
        if let Some(primary) = generate_fts_candidates(
            self.storage,
            request.search.as_deref(),
            &scope_chain,
            &kinds,
            request.fuzzy,
            request.regex,
            request.use_fts5,
            request.fields.as_deref(),
            candidate_limit,
        )? {
            degraded |= primary.degraded;
            merge_sparse(&mut fts_scores, &primary.sparse_score);

            if self.config.query_expansion && !request.fuzzy && !request.regex {
                if let Some(search) = request.search.as_deref() {
                    let normalized = fts::normalize(search);
                    if let Some(variant) = synonym::expand_with_synonyms(&normalized) {
                        if let Some(secondary) = generate_fts_candidates(
                            self.storage,
                            Some(variant.as_str()),
                            &scope_chain,
                            &kinds,
                            false,
                            false,
                            request.use_fts5,
                            request.fields.as_deref(),
                            candidate_limit,
                        )? {
                            degraded |= secondary.degraded;
                            merge_sparse(&mut fts_scores, &secondary.sparse_score);
                        }
                    }
                }
            }
        }
        let fts_ids = rank_by_f64_desc(&fts_scores);
        timings.push(("fts_candidates", elapsed_ms(fts_start)));

        // Stage 3: Semantic Candidate Generator — fail-open.
        let semantic_start = Instant::now();
        let mut semantic_scores: HashMap<EntryId, f64> = HashMap::new();
        let mut semantic_ids: Vec<EntryId> = Vec::new();
        if request.semantic_search {
            if let Some(search) = request.search.as_deref().filter(|s| !s.trim().is_empty()) {
                let hyde_enabled = self.hyde.is_some() && self.config.query_expansion;
                let threshold = request.semantic_threshold.unwrap_or(0.0);
                if let Some(candidates) = generate_semantic_candidates(
                    self.storage,
                    self.embedding,
                    self.hyde,
                    hyde_enabled,
                    HYDE_MAX_DOCUMENTS,
                    search,
                    intent,
                    &scope_chain,
                    &kinds,
                    threshold,
                )? {
                    semantic_ids = candidates.ids;
                    semantic_scores = candidates.dense_score;
                }
            }
        }
        timings.push(("semantic_candidates", elapsed_ms(semantic_start)));

        // Stage 4: Relation Expander.
        let relation_start = Instant::now();
        let mut relation_expansion: Option<RelationExpansion> = None;
        let mut relation_ids: Vec<EntryId> = Vec::new();
        if let Some(related) = &request.related_to {
            let seed = EntryId::new(related.id.clone());
            let relation_type = related.relation.as_deref().map(parse_relation_type);
            let direction = related.direction.as_deref().map(parse_direction).unwrap_or(Direction::Both);
            let depth = related.depth.unwrap_or(self.config.relation_default_depth);
            let expansion = relation_expander::expand(
                self.storage,
                &seed,
                relation_type.as_ref(),
                direction,
                depth,
                related.max_results,
            )?;
            relation_ids = match related.entry_type {
                Some(kind) => expansion.ids_by_kind.get(&kind).cloned().unwrap_or_default(),
                None => expansion.all_ids(),
            };
            relation_expansion = Some(expansion);
        }
        timings.push(("relation_expansion", elapsed_ms(relation_start)));

        // Stage 5: Entity Filter.
        let entity_start = Instant::now();
        let mut entity_match_counts: HashMap<EntryId, usize> = HashMap::new();
        let mut total_entities: usize = 0;
        if let Some(search) = request.search.as_deref() {
            let query_entities = entity::extract_entities(search);
            if query_entities.len() >= self.config.entity.min_entities_for_filter {
                total_entities = query_entities.len();
                entity_match_counts = self.entity_index.lookup_multiple(&query_entities);
            }
        }
        let entity_ids = rank_by_usize_desc(&entity_match_counts);
        timings.push(("entity_filter", elapsed_ms(entity_start)));

        // Candidate merge: RRF across every source that actually ran.
        let has_candidates = !fts_ids.is_empty() || !semantic_ids.is_empty() || !relation_ids.is_empty() || !entity_ids.is_empty();
        let fused_ids = if has_candidates {
            Some(rrf::fuse(&[&fts_ids, &semantic_ids, &relation_ids, &entity_ids]))
        } else {
            None
        };

        // Stage 6: Entry Fetcher.
        let fetch_start = Instant::now();
        let fetch_options = entry_fetcher::build_fetch_options(request, limit)?;
        let entries = entry_fetcher::fetch_entries(self.storage, fused_ids.as_deref(), &scope_chain, &kinds, &fetch_options)?;
        timings.push(("entry_fetch", elapsed_ms(fetch_start)));

        // Stage 7: Light Scorer.
        let light_start = Instant::now();
        let include_tags: BTreeSet<String> = request
            .tags
            .as_ref()
            .map(|t| t.include.iter().cloned().collect())
            .unwrap_or_default();
        let mut light_pool: Vec<(Entry, ScoringSignals, f64)> = Vec::with_capacity(entries.len());
        for entry in entries {
            let scope_index = scope_chain.iter().position(|s| s == &entry.scope).map(|i| (i, scope_chain.len()));
            let matching_tag_count = if include_tags.is_empty() {
                0
            } else {
                entry.tags.intersection(&include_tags).count()
            };
            let entity_count = entity_match_counts.get(&entry.id).copied().unwrap_or(0);
            let signals = ScoringSignals {
                entity_match_boost: entity::match_boost(entity_count, total_entities, &self.config.entity),
                has_explicit_relation: relation_expansion.as_ref().map(|r| r.contains(&entry.id)).unwrap_or(false),
                matching_tag_count,
                scope_index,
                text_matched: fts_scores.contains_key(&entry.id),
                fts_score: fts_scores.get(&entry.id).copied(),
                semantic_score: semantic_scores.get(&entry.id).copied(),
            };
            let light = scorer::light_score(&entry, &signals, &self.config.scorer);
            light_pool.push((entry, signals, light));
        }
        scorer::sort_light(&mut light_pool);
        light_pool.truncate(limit);
        timings.push(("light_score", elapsed_ms(light_start)));

        // Stage 8: Full Scorer.
        let full_start = Instant::now();
        let hybrid_alpha = request.hybrid_alpha.unwrap_or_else(|| intent.default_hybrid_alpha());
        let mut scored: Vec<ScoredEntry> = Vec::with_capacity(light_pool.len());
        for (entry, signals, light) in light_pool {
            let feedback = self.feedback_cache.get_or_load(self.storage, entry.kind, &entry.id)?;
            let (positive, net) = feedback.map(|f| (f.positive_count, f.net_score())).unwrap_or((0, 0));
            let ctx = FullScoreContext {
                intent,
                hybrid_alpha,
                positive_feedback: positive,
                net_feedback: net,
            };
            let score = scorer::full_score(&entry, &signals, light, &ctx, now, &scoring_config);
            scored.push(ScoredEntry { entry, score, signals });
        }
        scorer::sort_scored(&mut scored);
        timings.push(("full_score", elapsed_ms(full_start)));

        // Stage 9: Result Assembler, plus the supersession
        // dedup knob ahead of the context quota so a repeated top result
        // doesn't also eat a per-kind slot it will then be dropped from.
        let assemble_start = Instant::now();
        if !previously_seen.is_empty() {
            let seen: std::collections::HashSet<&EntryId> = previously_seen.iter().collect();
            scored.retain(|s| !seen.contains(&s.entry.id));
        }
        let is_empty_search_context =
            request.action == Action::Context && request.search.as_deref().map(|s| s.trim().is_empty()).unwrap_or(true);
        if is_empty_search_context {
            scored = assembler::apply_context_quota(scored, limit, &kinds);
            scorer::sort_scored(&mut scored);
        }
        assembler::reconcile_tags(self.storage, &mut scored)?;
        let (page, total) = assembler::paginate(scored, offset, limit);
        let mut result_entries: Vec<_> = page.iter().map(assembler::to_result_entry).collect();
        timings.push(("assemble", elapsed_ms(assemble_start)));

        let mut meta = ResponseMeta {
            returned_count: result_entries.len(),
            total_matched: Some(total),
            cache_hit: false,
            degraded,
            stage_timings_ms: Some(assembler::stage_timings_map(&timings)),
            intent_detected: Some(intent),
        };
        if request.compact {
            meta.stage_timings_ms = None;
            for entry in &mut result_entries {
                entry.matched_fields = None;
            }
        }
        let response = QueryResponse {
            entries: result_entries,
            meta,
        };
        self.query_cache.put(cache_key, response.clone());

        info!(
            returned = response.entries.len(),
            total,
            elapsed_ms = elapsed_ms(start),
            ?intent,
            "query complete"
        );
        Ok(response)
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

fn merge_sparse(dst: &mut HashMap<EntryId, f64>, src: &HashMap<EntryId, f64>) {
    for (id, score) in src {
        dst.entry(id.clone())
            .and_modify(|v| {
                if *score > *v {
                    *v = *score;
                }
            })
            .or_insert(*score);
    }
}

fn rank_by_f64_desc(scores: &HashMap<EntryId, f64>) -> Vec<EntryId> {
    let mut ids: Vec<EntryId> = scores.keys().cloned().collect();
    ids.sort_by(|a, b| {
        scores[b]
            .partial_cmp(&scores[a])
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.cmp(b))
    });
    ids
}

fn rank_by_usize_desc(counts: &HashMap<EntryId, usize>) -> Vec<EntryId> {
    let mut ids: Vec<EntryId> = counts.keys().cloned().collect();
    ids.sort_by(|a, b| counts[b].cmp(&counts[a]).then_with(|| a.cmp(b)));
    ids
}

fn parse_relation_type(s: &str) -> RelationType {
    match s {
        "related_to" => RelationType::RelatedTo,
        "applies_to" => RelationType::AppliesTo,
        "depends_on" => RelationType::DependsOn,
        other => RelationType::Custom(other.to_string()),
    }
}

fn parse_direction(s: &str) -> Direction {
    match s {
        "forward" => Direction::Forward,
        "backward" => Direction::Backward,
        _ => Direction::Both,
    }
}

/// Stable hash of the request plus the supersession list, used as the
/// query-result cache key. `QueryRequest` carries `f64` fields
/// so it cannot derive `Hash` directly; hashing its canonical JSON form
/// sidesteps that without pulling in a content-hash dependency beyond what
/// this crate already has.
fn cache_key_for(request: &QueryRequest, previously_seen: &[EntryId]) -> CoreResult<u64> {
    let json = serde_json::to_string(request).map_err(|e| CoreError::Internal(e.to_string()))?;
    let mut hasher = DefaultHasher::new();
    json.hash(&mut hasher);
    for id in previously_seen {
        id.hash(&mut hasher);
    }
    Ok(hasher.finish())
}
