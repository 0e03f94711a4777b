//! In-memory fakes and corpus builders shared by the workspace's test
//! suites, consumed only from `[dev-dependencies]`.
//!
//! `FakeStorageDriver` is a complete, in-process `StorageDriver` — no SQLite,
//! no I/O — so pipeline and property tests run fast and deterministically.
//! `FakeEmbeddingProvider` and `FakeHydeGenerator` are equally deterministic
//! stand-ins for the external embedding/LLM collaborators.

mod corpus;
mod embedding;
mod hyde;
mod storage;

pub use corpus::{seed_scenario_one_two, seed_scenario_three, seed_scenario_four, seed_scenario_five, seed_scenario_six};
pub use embedding::FakeEmbeddingProvider;
pub use hyde::FakeHydeGenerator;
pub use storage::FakeStorageDriver;

/// Installs a `tracing-subscriber` fmt layer scoped to the test harness,
/// so `cargo test -- --nocapture` shows pipeline stage logs. Safe to call
/// from every test; only the first call in a process wins.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
