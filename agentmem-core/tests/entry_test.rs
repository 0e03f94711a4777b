use agentmem_core::model::{Entry, EntryId, EntryPayload, Scope};

fn project_scope() -> Scope {
    Scope::Project {
        id: "P".to_string(),
    }
}

#[test]
fn priority_out_of_range_is_rejected() {
    let mut entry = Entry::new(
        EntryId::new("g-1"),
        project_scope(),
        "g-1",
        "always do x",
        EntryPayload::Guideline,
    )
    .unwrap();
    entry.priority = Some(150);
    assert!(entry.validate().is_err());
}

#[test]
fn priority_is_guideline_only() {
    let mut entry = Entry::new(
        EntryId::new("k-1"),
        project_scope(),
        "k-1",
        "we chose postgres",
        EntryPayload::Knowledge,
    )
    .unwrap();
    entry.priority = Some(50);
    assert!(entry.validate().is_err());
}

#[test]
fn confidence_out_of_range_is_rejected() {
    let mut entry = Entry::new(
        EntryId::new("k-2"),
        project_scope(),
        "k-2",
        "we chose postgres",
        EntryPayload::Knowledge,
    )
    .unwrap();
    entry.confidence = Some(1.5);
    assert!(entry.validate().is_err());
}

#[test]
fn valid_from_must_not_exceed_valid_until() {
    let mut entry = Entry::new(
        EntryId::new("g-2"),
        project_scope(),
        "g-2",
        "body",
        EntryPayload::Guideline,
    )
    .unwrap();
    let now = chrono::Utc::now();
    entry.valid_from = Some(now);
    entry.valid_until = Some(now - chrono::Duration::days(1));
    assert!(entry.validate().is_err());
}

#[test]
fn inactive_entry_requires_opt_in() {
    let mut entry = Entry::new(
        EntryId::new("g-3"),
        project_scope(),
        "g-3",
        "body",
        EntryPayload::Guideline,
    )
    .unwrap();
    assert!(entry.is_visible(false));
    entry.active = false;
    assert!(!entry.is_visible(false));
    assert!(entry.is_visible(true));
}

#[test]
fn touch_for_update_bumps_version_and_hash() {
    let mut entry = Entry::new(
        EntryId::new("g-4"),
        project_scope(),
        "g-4",
        "original body",
        EntryPayload::Guideline,
    )
    .unwrap();
    let original_hash = entry.content_hash.clone();
    let original_version = entry.version;
    entry.body = "updated body".to_string();
    entry.touch_for_update().unwrap();
    assert_eq!(entry.version, original_version + 1);
    assert_ne!(entry.content_hash, original_hash);
}
