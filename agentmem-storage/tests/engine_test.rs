//! Exercises `StorageEngine` against the same contract
//! `agentmem-test-fixtures::FakeStorageDriver` implements, against an
//! in-memory database via `open_in_memory`.

use agentmem_core::model::{Direction, Entry, EntryId, EntryKind, EntryPayload, Relation, RelationType, Scope};
use agentmem_core::traits::{FetchOptions, StorageDriver, TagFilter};
use agentmem_storage::StorageEngine;

fn guideline(id: &str, scope: Scope, body: &str, priority: u8) -> Entry {
    let mut e = Entry::new(EntryId::new(id), scope, id, body, EntryPayload::Guideline).expect("valid guideline");
    e.priority = Some(priority);
    e
}

#[test]
fn create_then_get_round_trips() {
    let engine = StorageEngine::open_in_memory().expect("open engine");
    let entry = guideline("g1", Scope::Project { id: "p".into() }, "always write tests", 80);
    engine.create(&entry).expect("create");

    let loaded = engine.get(&entry.id).expect("get").expect("present");
    assert_eq!(loaded.id, entry.id);
    assert_eq!(loaded.body, entry.body);
    assert_eq!(loaded.priority, Some(80));
}

#[test]
fn create_rejects_duplicate_id() {
    let engine = StorageEngine::open_in_memory().expect("open engine");
    let entry = guideline("dup", Scope::Global, "one", 10);
    engine.create(&entry).expect("first create");
    let err = engine.create(&entry).expect_err("duplicate should conflict");
    assert!(matches!(err, agentmem_core::errors::CoreError::Conflict(_)));
}

#[test]
fn update_requires_existing_row() {
    let engine = StorageEngine::open_in_memory().expect("open engine");
    let entry = guideline("missing", Scope::Global, "x", 1);
    let err = engine.update(&entry).expect_err("update of unknown entry should fail");
    assert!(matches!(err, agentmem_core::errors::CoreError::NotFound(_)));
}

#[test]
fn deactivate_hides_from_default_fetch() {
    let engine = StorageEngine::open_in_memory().expect("open engine");
    let entry = guideline("g-deact", Scope::Global, "body", 50);
    engine.create(&entry).expect("create");
    engine.deactivate(&entry.id).expect("deactivate");

    let visible = engine
        .fetch_candidates(None, &[Scope::Global], &EntryKind::ALL, &FetchOptions::default())
        .expect("fetch");
    assert!(visible.is_empty());

    let with_inactive = engine
        .fetch_candidates(
            None,
            &[Scope::Global],
            &EntryKind::ALL,
            &FetchOptions { include_inactive: true, ..Default::default() },
        )
        .expect("fetch including inactive");
    assert_eq!(with_inactive.len(), 1);
    assert!(!with_inactive[0].active);
}

#[test]
fn tag_filters_apply_in_order() {
    let engine = StorageEngine::open_in_memory().expect("open engine");
    let mut a = guideline("a", Scope::Global, "a body", 1);
    a.tags = ["security", "api"].iter().map(|s| s.to_string()).collect();
    let mut b = guideline("b", Scope::Global, "b body", 1);
    b.tags = ["security"].iter().map(|s| s.to_string()).collect();
    engine.create(&a).unwrap();
    engine.create(&b).unwrap();

    let options = FetchOptions {
        tags: TagFilter { require: ["security".to_string(), "api".to_string()].into_iter().collect(), ..Default::default() },
        ..Default::default()
    };
    let results = engine.fetch_candidates(None, &[Scope::Global], &EntryKind::ALL, &options).expect("fetch");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, a.id);
}

#[test]
fn fts_search_finds_matching_body() {
    let engine = StorageEngine::open_in_memory().expect("open engine");
    let e1 = guideline("ts1", Scope::Global, "Always enable TypeScript strict mode", 50);
    let e2 = guideline("ts2", Scope::Global, "We chose PostgreSQL for storage", 50);
    engine.create(&e1).unwrap();
    engine.create(&e2).unwrap();

    let hits = engine.search_fts("TypeScript", 10).expect("search");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].0, e1.id);
}

#[test]
fn relation_neighbors_respects_direction_and_excludes_self_loops() {
    let engine = StorageEngine::open_in_memory().expect("open engine");
    let a = guideline("a", Scope::Global, "a", 1);
    let b = guideline("b", Scope::Global, "b", 1);
    engine.create(&a).unwrap();
    engine.create(&b).unwrap();
    engine
        .add_relation(Relation {
            source_id: a.id.clone(),
            target_id: b.id.clone(),
            relation_type: RelationType::RelatedTo,
            properties: Default::default(),
            weight: 1.0,
        })
        .expect("add relation");
    engine
        .add_relation(Relation {
            source_id: a.id.clone(),
            target_id: a.id.clone(),
            relation_type: RelationType::RelatedTo,
            properties: Default::default(),
            weight: 1.0,
        })
        .expect("add self loop");

    let forward = engine.relation_neighbors(&a.id, None, Direction::Forward).expect("forward");
    assert_eq!(forward.len(), 1);
    assert_eq!(forward[0].target_id, b.id);

    let backward = engine.relation_neighbors(&b.id, None, Direction::Backward).expect("backward");
    assert_eq!(backward.len(), 1);
    assert_eq!(backward[0].source_id, a.id);
}

#[test]
fn feedback_rollup_accumulates_across_events() {
    let engine = StorageEngine::open_in_memory().expect("open engine");
    let e = guideline("fb", Scope::Global, "x", 1);
    engine.create(&e).unwrap();

    engine.record_feedback(EntryKind::Guideline, &e.id, true).unwrap();
    engine.record_feedback(EntryKind::Guideline, &e.id, true).unwrap();
    engine.record_feedback(EntryKind::Guideline, &e.id, false).unwrap();

    let rollup = engine.feedback_rollup(EntryKind::Guideline, &e.id).expect("rollup").expect("present");
    assert_eq!(rollup.positive_count, 2);
    assert_eq!(rollup.negative_count, 1);
    assert_eq!(rollup.net_score(), 1);
}

#[test]
fn scope_chain_resolves_through_registered_parents() {
    let engine = StorageEngine::open_in_memory().expect("open engine");
    let org = Scope::Org { id: "o1".into() };
    let project = Scope::Project { id: "p1".into() };
    engine.register_scope(org.clone(), None).unwrap();
    engine.register_scope(project.clone(), Some(org.clone())).unwrap();

    assert!(engine.scope_exists(&project).unwrap());
    assert_eq!(engine.parent_scope(&project).unwrap(), Some(org.clone()));
    assert_eq!(engine.parent_scope(&org).unwrap(), None);
    assert_eq!(engine.parent_scope(&Scope::Global).unwrap(), None);

    let unknown = Scope::Project { id: "missing".into() };
    assert!(!engine.scope_exists(&unknown).unwrap());
}

#[test]
fn batch_tags_groups_by_entry() {
    let engine = StorageEngine::open_in_memory().expect("open engine");
    let mut a = guideline("a", Scope::Global, "a", 1);
    a.tags = ["x", "y"].iter().map(|s| s.to_string()).collect();
    let b = guideline("b", Scope::Global, "b", 1);
    engine.create(&a).unwrap();
    engine.create(&b).unwrap();

    let tags = engine.batch_tags(&[a.id.clone(), b.id.clone()]).expect("batch tags");
    assert_eq!(tags[&a.id], a.tags);
    assert!(tags[&b.id].is_empty());
}
