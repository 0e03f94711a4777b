//! Builders for six concrete ranking scenarios. Each returns a ready-to-query
//! `FakeStorageDriver` seeded with the entries (and, where relevant,
//! relations) the scenario describes, plus the ids a test will want to
//! assert against.

use agentmem_core::model::{Entry, EntryId, EntryPayload, Relation, RelationType, Scope};

use crate::storage::FakeStorageDriver;

fn guideline(id: &str, scope: Scope, body: &str, priority: u8, tags: &[&str]) -> Entry {
    let mut e = Entry::new(EntryId::new(id), scope, id, body, EntryPayload::Guideline).expect("valid guideline");
    e.priority = Some(priority);
    e.tags = tags.iter().map(|t| t.to_string()).collect();
    e
}

fn tool(id: &str, scope: Scope, body: &str, tags: &[&str]) -> Entry {
    let mut e = Entry::new(EntryId::new(id), scope, id, body, EntryPayload::Tool).expect("valid tool");
    e.tags = tags.iter().map(|t| t.to_string()).collect();
    e
}

fn knowledge(id: &str, scope: Scope, body: &str, confidence: f64) -> Entry {
    let mut e = Entry::new(EntryId::new(id), scope, id, body, EntryPayload::Knowledge).expect("valid knowledge");
    e.confidence = Some(confidence);
    e
}

/// Seeds scenario 1: four project-scoped entries, three
/// TypeScript-related plus one unrelated knowledge entry. Scenario 2 extends
/// this with an org-scoped `g-no-secrets` guideline, so both scenarios share
/// this builder; callers that only need scenario 1 can ignore the extra id.
pub fn seed_scenario_one_two() -> FakeStorageDriver {
    let driver = FakeStorageDriver::new();
    let org = Scope::Org { id: "O".to_string() };
    let project = Scope::Project { id: "P".to_string() };
    driver.register_scope(project.clone(), Some(org.clone()));
    driver.register_scope(org.clone(), None);

    driver
        .create(&guideline(
            "g-ts-strict",
            project.clone(),
            "Always enable TypeScript strict mode in tsconfig.json for every new project.",
            95,
            &["typescript", "config"],
        ))
        .expect("seed g-ts-strict");
    driver
        .create(&guideline(
            "g-no-any",
            project.clone(),
            "Never use the any type; prefer unknown and narrow explicitly.",
            90,
            &["typescript", "types"],
        ))
        .expect("seed g-no-any");
    driver
        .create(&tool(
            "t-build",
            project.clone(),
            "Compiles TypeScript sources into the dist/ directory.",
            &["npm", "build", "typescript"],
        ))
        .expect("seed t-build");
    driver
        .create(&knowledge(
            "k-pg",
            project.clone(),
            "We chose PostgreSQL for the primary datastore after evaluating MySQL and SQLite.",
            0.95,
        ))
        .expect("seed k-pg");
    driver
        .create(&guideline(
            "g-no-secrets",
            org,
            "Never commit secrets or API keys to version control; use the secrets manager.",
            100,
            &["security"],
        ))
        .expect("seed g-no-secrets");

    driver
}

/// Seeds scenario 3: entries with overlapping but non-identical
/// tag sets, so `tags.require=["security","api"]` selects exactly one.
pub fn seed_scenario_three() -> FakeStorageDriver {
    let driver = FakeStorageDriver::new();
    let project = Scope::Project { id: "P".to_string() };
    driver.register_scope(project.clone(), None);

    driver
        .create(&guideline(
            "g-both",
            project.clone(),
            "Authenticate every API request and log security-relevant failures.",
            80,
            &["security", "api"],
        ))
        .expect("seed g-both");
    driver
        .create(&guideline(
            "g-security-only",
            project.clone(),
            "Rotate credentials on a fixed schedule.",
            70,
            &["security"],
        ))
        .expect("seed g-security-only");
    driver
        .create(&tool(
            "t-api-only",
            project,
            "Generates an OpenAPI client from the service schema.",
            &["api"],
        ))
        .expect("seed t-api-only");

    driver
}

/// Seeds scenario 4: `g-ts-strict —related_to— g-no-any
/// —related_to— g-deep`, for a `relatedTo` BFS of depth 2 excluding the seed.
pub fn seed_scenario_four() -> FakeStorageDriver {
    let driver = FakeStorageDriver::new();
    let project = Scope::Project { id: "P".to_string() };
    driver.register_scope(project.clone(), None);

    driver
        .create(&guideline(
            "g-ts-strict",
            project.clone(),
            "Always enable TypeScript strict mode.",
            95,
            &["typescript"],
        ))
        .expect("seed g-ts-strict");
    driver
        .create(&guideline(
            "g-no-any",
            project.clone(),
            "Never use the any type.",
            90,
            &["typescript"],
        ))
        .expect("seed g-no-any");
    driver
        .create(&guideline(
            "g-deep",
            project,
            "Prefer discriminated unions over deeply nested optional fields.",
            60,
            &["typescript"],
        ))
        .expect("seed g-deep");

    driver.seed_relation(Relation {
        source_id: EntryId::new("g-ts-strict"),
        target_id: EntryId::new("g-no-any"),
        relation_type: RelationType::RelatedTo,
        properties: Default::default(),
        weight: 1.0,
    });
    driver.seed_relation(Relation {
        source_id: EntryId::new("g-no-any"),
        target_id: EntryId::new("g-deep"),
        relation_type: RelationType::RelatedTo,
        properties: Default::default(),
        weight: 1.0,
    });

    driver
}

/// Seeds scenario 5: a regex query `v[0-9]` over entry bodies.
pub fn seed_scenario_five() -> FakeStorageDriver {
    let driver = FakeStorageDriver::new();
    let project = Scope::Project { id: "P".to_string() };
    driver.register_scope(project.clone(), None);

    driver
        .create(&knowledge(
            "k-versions",
            project.clone(),
            "The API supports v1 and v2 simultaneously during the migration window.",
            0.8,
        ))
        .expect("seed k-versions");
    driver
        .create(&knowledge(
            "k-unrelated",
            project,
            "The team prefers trunk-based development over long-lived feature branches.",
            0.5,
        ))
        .expect("seed k-unrelated");

    driver
}

/// Seeds scenario 6: an entry valid only within `[2025-01-01,
/// 2025-01-16)`.
pub fn seed_scenario_six() -> FakeStorageDriver {
    use chrono::{TimeZone, Utc};

    let driver = FakeStorageDriver::new();
    let project = Scope::Project { id: "P".to_string() };
    driver.register_scope(project.clone(), None);

    let mut entry = guideline(
        "g-temporary",
        project,
        "Use the legacy API endpoint during the migration window only.",
        50,
        &["migration"],
    );
    entry.valid_from = Some(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
    entry.valid_until = Some(Utc.with_ymd_and_hms(2025, 1, 16, 0, 0, 0).unwrap());
    driver.create(&entry).expect("seed g-temporary");

    driver
}
