use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{CoreError, CoreResult};
use crate::model::scope::Scope;

/// Stable opaque identifier, unique across kinds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntryId(pub String);

impl EntryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Mints a fresh id for a newly written entry.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for EntryId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for EntryId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// The four entry kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Guideline,
    Knowledge,
    Tool,
    Experience,
}

impl EntryKind {
    pub const ALL: [EntryKind; 4] = [
        EntryKind::Guideline,
        EntryKind::Knowledge,
        EntryKind::Tool,
        EntryKind::Experience,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Guideline => "guideline",
            EntryKind::Knowledge => "knowledge",
            EntryKind::Tool => "tool",
            EntryKind::Experience => "experience",
        }
    }
}

/// A single step in an experience's recorded trajectory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrajectoryStep {
    pub action: String,
    pub observation: Option<String>,
    pub outcome: Option<String>,
}

/// Kind-specific payload, carried alongside the shared header. Stages that only need the header never
/// match on this; kind-specific boosts and rendering do.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum EntryPayload {
    Guideline,
    Knowledge,
    Tool,
    Experience { steps: Vec<TrajectoryStep> },
}

impl EntryPayload {
    pub fn kind(&self) -> EntryKind {
        match self {
            EntryPayload::Guideline => EntryKind::Guideline,
            EntryPayload::Knowledge => EntryKind::Knowledge,
            EntryPayload::Tool => EntryKind::Tool,
            EntryPayload::Experience { .. } => EntryKind::Experience,
        }
    }
}

/// The base unit stored and retrieved by the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    pub kind: EntryKind,
    pub scope: Scope,
    pub name: String,
    pub body: String,
    pub title: Option<String>,
    pub tags: BTreeSet<String>,
    /// 0-100, guideline-only.
    pub priority: Option<u8>,
    /// 0.0-1.0, knowledge-only.
    pub confidence: Option<f64>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    pub payload: EntryPayload,
    /// Incremented on every versioned update.
    pub version: u32,
    /// blake3 hash of `body`, used for write-time dedup.
    pub content_hash: String,
}

impl Entry {
    pub fn new(
        id: EntryId,
        scope: Scope,
        name: impl Into<String>,
        body: impl Into<String>,
        payload: EntryPayload,
    ) -> CoreResult<Self> {
        let body = body.into();
        let content_hash = compute_content_hash(&body);
        let now = Utc::now();
        let entry = Self {
            id,
            kind: payload.kind(),
            scope,
            name: name.into(),
            body,
            title: None,
            tags: BTreeSet::new(),
            priority: None,
            confidence: None,
            active: true,
            created_at: now,
            updated_at: now,
            valid_from: None,
            valid_until: None,
            payload,
            version: 1,
            content_hash,
        };
        entry.validate()?;
        Ok(entry)
    }

    /// Enforces the range/ordering invariants at write time.
    pub fn validate(&self) -> CoreResult<()> {
        if let Some(p) = self.priority {
            if self.kind != EntryKind::Guideline {
                return Err(CoreError::bad_request("priority is guideline-only"));
            }
            if p > 100 {
                return Err(CoreError::bad_request("priority must be in [0,100]"));
            }
        }
        if let Some(c) = self.confidence {
            if self.kind != EntryKind::Knowledge {
                return Err(CoreError::bad_request("confidence is knowledge-only"));
            }
            if !(0.0..=1.0).contains(&c) {
                return Err(CoreError::bad_request("confidence must be in [0,1]"));
            }
        }
        if let (Some(from), Some(until)) = (self.valid_from, self.valid_until) {
            if from > until {
                return Err(CoreError::bad_request("validFrom must be <= validUntil"));
            }
        }
        Ok(())
    }

    /// Re-stamps `updated_at`, bumps the version, and recomputes the content
    /// hash. Callers are expected to call `validate()` afterward (done here).
    pub fn touch_for_update(&mut self) -> CoreResult<()> {
        self.updated_at = Utc::now();
        self.version += 1;
        self.content_hash = compute_content_hash(&self.body);
        self.validate()
    }

    pub fn is_visible(&self, include_inactive: bool) -> bool {
        self.active || include_inactive
    }
}

pub fn compute_content_hash(body: &str) -> String {
    blake3::hash(body.as_bytes()).to_hex().to_string()
}
