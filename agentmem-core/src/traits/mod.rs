pub mod embedding;
pub mod hyde;
pub mod intent_classifier;
pub mod storage;

pub use embedding::{EmbeddingBatch, EmbeddingProvider};
pub use hyde::HydeGenerator;
pub use intent_classifier::IntentClassifier;
pub use storage::{FetchOptions, StorageDriver, TagFilter, TemporalQuery};
