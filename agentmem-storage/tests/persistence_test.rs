//! File-backed persistence: data survives closing and reopening the engine.
//! `StorageEngine::open` vs `::open_in_memory` run the same assertions
//! against a temp file.

use agentmem_core::model::{Entry, EntryId, EntryPayload, Scope};
use agentmem_core::traits::StorageDriver;
use agentmem_storage::StorageEngine;

#[test]
fn entry_survives_reopen() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("agentmem.sqlite3");

    {
        let engine = StorageEngine::open(&path).expect("open");
        let entry = Entry::new(
            EntryId::new("persisted"),
            Scope::Global,
            "persisted",
            "this entry should survive a reopen",
            EntryPayload::Knowledge,
        )
        .expect("valid entry");
        engine.create(&entry).expect("create");
    }

    {
        let engine = StorageEngine::open(&path).expect("reopen");
        let loaded = engine.get(&EntryId::new("persisted")).expect("get").expect("present");
        assert_eq!(loaded.body, "this entry should survive a reopen");
    }
}
