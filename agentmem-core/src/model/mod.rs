pub mod entity;
pub mod entry;
pub mod feedback;
pub mod relation;
pub mod scope;
pub mod tag;

pub use entity::{EntityOccurrence, EntityType};
pub use entry::{compute_content_hash, Entry, EntryId, EntryKind, EntryPayload, TrajectoryStep};
pub use feedback::FeedbackScore;
pub use relation::{Direction, Relation, RelationType};
pub use scope::{scope_proximity, Scope, ScopeChain};
pub use tag::{normalize_tag, Tag};
