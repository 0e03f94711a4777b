use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::entry::{EntryId, EntryKind};

/// Aggregated feedback for one (kind, entry_id), updated on each feedback
/// event and cached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackScore {
    pub kind: EntryKind,
    pub entry_id: EntryId,
    pub positive_count: u32,
    pub negative_count: u32,
    pub inserted_at: DateTime<Utc>,
}

impl FeedbackScore {
    pub fn net_score(&self) -> i64 {
        self.positive_count as i64 - self.negative_count as i64
    }
}
