//! Property tests for the pipeline's ranking invariants, using a
//! `proptest`-based `tests/property/` suite.

use chrono::Utc;
use proptest::prelude::*;

use agentmem_core::config::{HybridStrategy, RetrievalConfig};
use agentmem_core::model::{Entry, EntryId, EntryKind, EntryPayload, Scope};
use agentmem_retrieval::request::{Action, QueryRequest, ScopeRequest, TagFilterRequest};
use agentmem_retrieval::scorer::{self, FullScoreContext, ScoringSignals};
use agentmem_retrieval::{RetrievalEngine, RuleBasedIntentClassifier};
use agentmem_test_fixtures::{seed_scenario_one_two, FakeEmbeddingProvider};

fn base_request(limit: usize, offset: usize, types: Option<Vec<EntryKind>>) -> QueryRequest {
    QueryRequest {
        action: Action::Search,
        scope: ScopeRequest {
            scope_type: "project".to_string(),
            id: Some("P".to_string()),
            inherit: true,
        },
        types,
        search: None,
        fuzzy: false,
        regex: false,
        use_fts5: true,
        semantic_search: false,
        semantic_threshold: None,
        fields: None,
        tags: None,
        priority: None,
        confidence: None,
        include_inactive: false,
        at_time: None,
        valid_during: None,
        created_after: None,
        created_before: None,
        related_to: None,
        limit: Some(limit),
        offset: Some(offset),
        intent: None,
        hybrid_alpha: None,
        recency_weight: None,
        decay_half_life_days: None,
        decay_function: None,
        compact: false,
    }
}

proptest! {
    /// Invariant 1: `returnedCount <= limit`, and `limit` itself is
    /// always clamped to `[1, maxLimit]` before the pipeline runs.
    #[test]
    fn returned_count_never_exceeds_limit(limit in 1usize..=10, offset in 0usize..3) {
        let storage = seed_scenario_one_two();
        let embedding = FakeEmbeddingProvider::new();
        let classifier = RuleBasedIntentClassifier::new();
        let engine = RetrievalEngine::new(&storage, &embedding, &classifier, RetrievalConfig::default());

        let request = base_request(limit, offset, None);
        let response = engine.query(&request, Utc::now()).expect("query succeeds");
        prop_assert!(response.entries.len() <= limit);
        prop_assert_eq!(response.meta.returned_count, response.entries.len());
    }

    /// Invariant 2: every returned entry's kind is a member of the requested
    /// `types` filter (or any kind when the filter is absent).
    #[test]
    fn every_result_matches_the_requested_kinds(
        include_guideline in any::<bool>(),
        include_tool in any::<bool>(),
        include_knowledge in any::<bool>(),
    ) {
        let mut kinds = Vec::new();
        if include_guideline { kinds.push(EntryKind::Guideline); }
        if include_tool { kinds.push(EntryKind::Tool); }
        if include_knowledge { kinds.push(EntryKind::Knowledge); }
        prop_assume!(!kinds.is_empty());

        let storage = seed_scenario_one_two();
        let embedding = FakeEmbeddingProvider::new();
        let classifier = RuleBasedIntentClassifier::new();
        let engine = RetrievalEngine::new(&storage, &embedding, &classifier, RetrievalConfig::default());

        let request = base_request(20, 0, Some(kinds.clone()));
        let response = engine.query(&request, Utc::now()).expect("query succeeds");
        for entry in &response.entries {
            prop_assert!(kinds.contains(&entry.kind));
        }
    }

    /// Invariant 4: a tag in `tags.exclude` never appears on a returned
    /// entry, regardless of how many other signals favor it.
    #[test]
    fn excluded_tag_never_appears_in_results(exclude_typescript in any::<bool>()) {
        let storage = seed_scenario_one_two();
        let embedding = FakeEmbeddingProvider::new();
        let classifier = RuleBasedIntentClassifier::new();
        let engine = RetrievalEngine::new(&storage, &embedding, &classifier, RetrievalConfig::default());

        let mut request = base_request(20, 0, None);
        if exclude_typescript {
            request.tags = Some(TagFilterRequest {
                include: vec![],
                require: vec![],
                exclude: vec!["typescript".to_string()],
            });
        }
        let response = engine.query(&request, Utc::now()).expect("query succeeds");
        if exclude_typescript {
            for entry in &response.entries {
                prop_assert!(!entry.tags.iter().any(|t| t == "typescript"));
            }
        }
    }

    /// Invariant 3: an inactive entry is invisible unless `includeInactive`
    /// is set, independent of every other field.
    #[test]
    fn inactive_entries_respect_include_inactive(active in any::<bool>(), include_inactive in any::<bool>()) {
        let entry = Entry {
            active,
            ..Entry::new(
                EntryId::new("e-1"),
                Scope::Global,
                "e",
                "body",
                EntryPayload::Knowledge,
            ).unwrap()
        };
        let visible = entry.is_visible(include_inactive);
        prop_assert_eq!(visible, active || include_inactive);
    }

    /// Invariant 5: the feedback multiplier is monotonically non-decreasing
    /// in positive feedback and non-increasing in negative feedback, each
    /// clamped at its configured cap.
    #[test]
    fn feedback_multiplier_is_monotonic(positive in 0u32..50, extra_positive in 0u32..10, negative in 0i64..50) {
        let cfg = agentmem_core::config::FeedbackConfig::default();
        let lower = scorer::feedback_multiplier(positive, -negative, &cfg);
        let higher = scorer::feedback_multiplier(positive + extra_positive, -negative, &cfg);
        prop_assert!(higher >= lower - 1e-9);

        let with_more_negative = scorer::feedback_multiplier(positive, -(negative + 1), &cfg);
        prop_assert!(with_more_negative <= lower + 1e-9);
    }

    /// Invariant 6: hybrid blending at `alpha=1` degenerates exactly to the
    /// semantic-only strategy, and the FTS-only strategy never varies with
    /// the semantic score at all.
    #[test]
    fn hybrid_alpha_extremes_match_single_source_strategies(
        fts_score in 0.0f64..1.0,
        semantic_score in 0.0f64..1.0,
        other_semantic_score in 0.0f64..1.0,
    ) {
        let entry = Entry::new(
            EntryId::new("e-1"),
            Scope::Global,
            "e",
            "body",
            EntryPayload::Knowledge,
        ).unwrap();
        let signals = ScoringSignals {
            fts_score: Some(fts_score),
            semantic_score: Some(semantic_score),
            text_matched: true,
            ..ScoringSignals::default()
        };
        let now = Utc::now();
        let light = scorer::light_score(&entry, &signals, &agentmem_core::config::ScorerWeights::default());

        let mut hybrid_cfg = RetrievalConfig { recency_weight: 0.0, ..RetrievalConfig::default() };
        hybrid_cfg.hybrid_strategy = HybridStrategy::Hybrid;
        let alpha_one_ctx = FullScoreContext { hybrid_alpha: 1.0, ..FullScoreContext::default() };
        let alpha_one = scorer::full_score(&entry, &signals, light, &alpha_one_ctx, now, &hybrid_cfg);

        let mut semantic_only_cfg = hybrid_cfg;
        semantic_only_cfg.hybrid_strategy = HybridStrategy::SemanticOnly;
        let semantic_only = scorer::full_score(&entry, &signals, light, &FullScoreContext::default(), now, &semantic_only_cfg);
        prop_assert!((alpha_one - semantic_only).abs() < 1e-9);

        // FtsOnly discards the semantic axis entirely: swapping in a
        // different semantic score must not move the result.
        let mut fts_only_cfg = RetrievalConfig { recency_weight: 0.0, ..RetrievalConfig::default() };
        fts_only_cfg.hybrid_strategy = HybridStrategy::FtsOnly;
        let other_signals = ScoringSignals { semantic_score: Some(other_semantic_score), ..signals.clone() };
        let other_light = scorer::light_score(&entry, &other_signals, &agentmem_core::config::ScorerWeights::default());
        let fts_only_a = scorer::full_score(&entry, &signals, light, &FullScoreContext::default(), now, &fts_only_cfg);
        let fts_only_b = scorer::full_score(&entry, &other_signals, other_light, &FullScoreContext::default(), now, &fts_only_cfg);
        prop_assert!((fts_only_a - fts_only_b).abs() < 1e-9);
    }
}
