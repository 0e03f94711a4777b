//! # agentmem-core
//!
//! Foundation crate for the agent memory retrieval core.
//! Defines the data model, collaborator traits, errors, config, the
//! change-event bus, and shared constants. Every other crate in the
//! workspace depends on this one.

pub mod config;
pub mod constants;
pub mod errors;
pub mod events;
pub mod intent;
pub mod model;
pub mod traits;

pub use config::RetrievalConfig;
pub use errors::{CoreError, CoreResult};
pub use events::{ChangeAction, ChangeEvent, EventBus};
pub use intent::Intent;
pub use model::{
    Entry, EntryId, EntryKind, EntryPayload, EntityOccurrence, EntityType, FeedbackScore,
    Relation, RelationType, Scope, ScopeChain, Tag, TrajectoryStep,
};
