use criterion::{criterion_group, criterion_main, Criterion};

use agentmem_core::config::RetrievalConfig;
use agentmem_core::model::{Entry, EntryId, EntryPayload, Scope};
use agentmem_retrieval::request::{Action, QueryRequest, ScopeRequest};
use agentmem_retrieval::{RetrievalEngine, RuleBasedIntentClassifier};
use agentmem_test_fixtures::{FakeEmbeddingProvider, FakeStorageDriver};

/// Builds a 2K-guideline corpus in one project scope, half mentioning
/// "typescript" so the FTS and scoring stages both do real work.
fn build_2k_entry_corpus() -> FakeStorageDriver {
    let driver = FakeStorageDriver::new();
    let project = Scope::Project { id: "P".to_string() };
    driver.register_scope(project.clone(), None);

    for i in 0..2000 {
        let body = if i % 2 == 0 {
            format!("Guideline {i} about TypeScript strict mode and narrow typing.")
        } else {
            format!("Guideline {i} about deployment pipelines and release cadence.")
        };
        let mut entry = Entry::new(
            EntryId::new(format!("g-{i}")),
            project.clone(),
            format!("guideline-{i}"),
            body,
            EntryPayload::Guideline,
        )
        .expect("valid guideline");
        entry.priority = Some((i % 100) as u8);
        if i % 3 == 0 {
            entry.tags.insert("typescript".to_string());
        }
        driver.create(&entry).expect("seed guideline");
    }
    driver
}

fn base_request(search: Option<&str>) -> QueryRequest {
    QueryRequest {
        action: Action::Search,
        scope: ScopeRequest {
            scope_type: "project".to_string(),
            id: Some("P".to_string()),
            inherit: false,
        },
        types: None,
        search: search.map(|s| s.to_string()),
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
        limit: Some(20),
        offset: None,
        intent: None,
        hybrid_alpha: None,
        recency_weight: None,
        decay_half_life_days: None,
        decay_function: None,
        compact: false,
    }
}

fn bench_keyword_query_2k_entries(c: &mut Criterion) {
    let storage = build_2k_entry_corpus();
    let embedding = FakeEmbeddingProvider::new();
    let classifier = RuleBasedIntentClassifier::new();
    let engine = RetrievalEngine::new(&storage, &embedding, &classifier, RetrievalConfig::default());
    let request = base_request(Some("typescript"));

    c.bench_function("query_keyword_2k_entries", |b| {
        b.iter(|| {
            engine.query(&request, chrono::Utc::now()).expect("query succeeds");
        });
    });
}

fn bench_empty_query_2k_entries(c: &mut Criterion) {
    let storage = build_2k_entry_corpus();
    let embedding = FakeEmbeddingProvider::new();
    let classifier = RuleBasedIntentClassifier::new();
    let engine = RetrievalEngine::new(&storage, &embedding, &classifier, RetrievalConfig::default());
    let request = base_request(None);

    c.bench_function("query_unfiltered_2k_entries", |b| {
        b.iter(|| {
            engine.query(&request, chrono::Utc::now()).expect("query succeeds");
        });
    });
}

criterion_group!(benches, bench_keyword_query_2k_entries, bench_empty_query_2k_entries);
criterion_main!(benches);
