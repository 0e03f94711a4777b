//! SQLite-backed `StorageDriver`: connection pool, schema, FTS5 match, and
//! the tag/relation/feedback queries the retrieval core's collaborator
//! trait needs. Entirely swappable — the retrieval core only ever depends
//! on `agentmem_core::traits::StorageDriver`, never on this crate directly.

pub mod convert;
pub mod engine;
pub mod pool;
pub mod queries;
pub mod schema;

pub use engine::StorageEngine;
