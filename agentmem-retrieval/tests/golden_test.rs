//! Golden tests for the six concrete ranking scenarios, run against
//! `agentmem-test-fixtures`'s in-memory corpus builders.

use chrono::{TimeZone, Utc};

use agentmem_core::config::RetrievalConfig;
use agentmem_core::model::EntryKind;
use agentmem_retrieval::request::{Action, QueryRequest, RelatedToRequest, ScopeRequest, TagFilterRequest};
use agentmem_retrieval::{RetrievalEngine, RuleBasedIntentClassifier};
use agentmem_test_fixtures::{
    seed_scenario_five, seed_scenario_four, seed_scenario_one_two, seed_scenario_six, seed_scenario_three,
    FakeEmbeddingProvider,
};

fn base_request(scope_type: &str, id: Option<&str>, inherit: bool) -> QueryRequest {
    QueryRequest {
        action: Action::Search,
        scope: ScopeRequest {
            scope_type: scope_type.to_string(),
            id: id.map(|s| s.to_string()),
            inherit,
        },
        types: None,
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
        limit: None,
        offset: None,
        intent: None,
        hybrid_alpha: None,
        recency_weight: None,
        decay_half_life_days: None,
        decay_function: None,
        compact: false,
    }
}

fn ids(response: &agentmem_retrieval::QueryResponse) -> Vec<String> {
    response.entries.iter().map(|e| e.id.clone()).collect()
}

#[test]
fn scenario_one_keyword_search_ranks_typescript_guideline_first() {
    let storage = seed_scenario_one_two();
    let embedding = FakeEmbeddingProvider::new();
    let classifier = RuleBasedIntentClassifier::new();
    let engine = RetrievalEngine::new(&storage, &embedding, &classifier, RetrievalConfig::default());

    let mut request = base_request("project", Some("P"), true);
    request.search = Some("typescript".to_string());

    let response = engine.query(&request, Utc::now()).expect("query succeeds");
    let returned = ids(&response);

    let returned_set: std::collections::HashSet<_> = returned.iter().cloned().collect();
    let expected: std::collections::HashSet<_> =
        ["g-ts-strict", "g-no-any", "t-build"].iter().map(|s| s.to_string()).collect();
    assert_eq!(returned_set, expected, "unrelated k-pg and org-scoped g-no-secrets must not match");
    assert_eq!(returned.first().map(String::as_str), Some("g-ts-strict"), "highest-priority matching guideline ranks first");
    assert!(!response.meta.cache_hit);
}

#[test]
fn scenario_three_tag_require_is_an_intersection() {
    let storage = seed_scenario_three();
    let embedding = FakeEmbeddingProvider::new();
    let classifier = RuleBasedIntentClassifier::new();
    let engine = RetrievalEngine::new(&storage, &embedding, &classifier, RetrievalConfig::default());

    let mut request = base_request("project", Some("P"), false);
    request.tags = Some(TagFilterRequest {
        include: vec![],
        require: vec!["security".to_string(), "api".to_string()],
        exclude: vec![],
    });

    let response = engine.query(&request, Utc::now()).expect("query succeeds");
    assert_eq!(ids(&response), vec!["g-both".to_string()]);
}

#[test]
fn scenario_four_related_to_expands_two_hops_excluding_seed() {
    let storage = seed_scenario_four();
    let embedding = FakeEmbeddingProvider::new();
    let classifier = RuleBasedIntentClassifier::new();
    let engine = RetrievalEngine::new(&storage, &embedding, &classifier, RetrievalConfig::default());

    let mut request = base_request("project", Some("P"), false);
    request.related_to = Some(RelatedToRequest {
        id: "g-ts-strict".to_string(),
        entry_type: None,
        relation: None,
        direction: None,
        depth: Some(2),
        max_results: None,
    });

    let response = engine.query(&request, Utc::now()).expect("query succeeds");
    let returned = ids(&response);
    let returned_set: std::collections::HashSet<_> = returned.iter().cloned().collect();
    let expected: std::collections::HashSet<_> = ["g-no-any", "g-deep"].iter().map(|s| s.to_string()).collect();
    assert_eq!(returned_set, expected, "seed itself must not appear in its own expansion");
    assert_eq!(returned.first().map(String::as_str), Some("g-no-any"), "directly-related, higher-priority entry ranks first");
}

#[test]
fn scenario_five_regex_search_matches_pattern_not_keywords() {
    let storage = seed_scenario_five();
    let embedding = FakeEmbeddingProvider::new();
    let classifier = RuleBasedIntentClassifier::new();
    let engine = RetrievalEngine::new(&storage, &embedding, &classifier, RetrievalConfig::default());

    let mut request = base_request("project", Some("P"), false);
    request.regex = true;
    request.search = Some("v[0-9]".to_string());

    let response = engine.query(&request, Utc::now()).expect("query succeeds");
    assert_eq!(ids(&response), vec!["k-versions".to_string()]);
}

#[test]
fn scenario_six_temporal_window_gates_visibility() {
    let storage = seed_scenario_six();
    let embedding = FakeEmbeddingProvider::new();
    let classifier = RuleBasedIntentClassifier::new();
    let engine = RetrievalEngine::new(&storage, &embedding, &classifier, RetrievalConfig::default());

    let mut inside = base_request("project", Some("P"), false);
    inside.at_time = Some(Utc.with_ymd_and_hms(2025, 1, 10, 0, 0, 0).unwrap());
    let response = engine.query(&inside, Utc::now()).expect("query succeeds");
    assert_eq!(ids(&response), vec!["g-temporary".to_string()]);

    let mut outside = base_request("project", Some("P"), false);
    outside.at_time = Some(Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap());
    let response = engine.query(&outside, Utc::now()).expect("query succeeds");
    assert!(ids(&response).is_empty(), "entry must not be visible outside its valid window");
}

#[test]
fn context_action_applies_per_kind_quota() {
    let storage = seed_scenario_one_two();
    let embedding = FakeEmbeddingProvider::new();
    let classifier = RuleBasedIntentClassifier::new();
    let engine = RetrievalEngine::new(&storage, &embedding, &classifier, RetrievalConfig::default());

    let mut request = base_request("project", Some("P"), true);
    request.action = Action::Context;
    request.types = Some(vec![EntryKind::Guideline, EntryKind::Tool, EntryKind::Knowledge]);
    request.limit = Some(2);

    let response = engine.query(&request, Utc::now()).expect("query succeeds");
    // ceil(2/3) == 1 per kind, so no single kind can dominate the page.
    let mut counts = std::collections::HashMap::new();
    for entry in &response.entries {
        *counts.entry(entry.kind).or_insert(0) += 1;
    }
    assert!(counts.values().all(|&c| c <= 1), "quota of 1 per kind must hold: {counts:?}");
}

#[test]
fn repeated_query_is_idempotent() {
    let storage = seed_scenario_one_two();
    let embedding = FakeEmbeddingProvider::new();
    let classifier = RuleBasedIntentClassifier::new();
    let engine = RetrievalEngine::new(&storage, &embedding, &classifier, RetrievalConfig::default());

    let mut request = base_request("project", Some("P"), true);
    request.search = Some("typescript".to_string());
    let now = Utc::now();

    let first = engine.query(&request, now).expect("first query succeeds");
    let second = engine.query(&request, now).expect("second query succeeds");
    assert_eq!(ids(&first), ids(&second));
    assert_eq!(
        first.entries.iter().map(|e| e.score).collect::<Vec<_>>(),
        second.entries.iter().map(|e| e.score).collect::<Vec<_>>()
    );
}

#[test]
fn supersession_dedup_drops_previously_seen_entries() {
    let storage = seed_scenario_one_two();
    let embedding = FakeEmbeddingProvider::new();
    let classifier = RuleBasedIntentClassifier::new();
    let engine = RetrievalEngine::new(&storage, &embedding, &classifier, RetrievalConfig::default());

    let mut request = base_request("project", Some("P"), true);
    request.search = Some("typescript".to_string());

    let first = engine.query(&request, Utc::now()).expect("first query succeeds");
    let seen: Vec<agentmem_core::model::EntryId> = first
        .entries
        .iter()
        .map(|e| agentmem_core::model::EntryId::new(e.id.clone()))
        .collect();

    let second = engine
        .query_with_deadline(&request, Utc::now(), None, &seen)
        .expect("second query succeeds");
    assert!(second.entries.iter().all(|e| !seen.iter().any(|s| s.as_str() == e.id)));
}
