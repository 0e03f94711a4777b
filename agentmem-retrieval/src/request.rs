//! The canonical query request/response shapes. Bit-exact JSON
//! compatibility is required here, for the change-event shape, and for the
//! scoring formula; everything else is pipeline-private.

use std::collections::BTreeMap;

use agentmem_core::intent::Intent;
use agentmem_core::model::{EntryKind, Scope};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Search,
    Context,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TagFilterRequest {
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub require: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RangeRequest {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidDuringRequest {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelatedToRequest {
    pub id: String,
    #[serde(rename = "type")]
    pub entry_type: Option<EntryKind>,
    pub relation: Option<String>,
    pub direction: Option<String>,
    pub depth: Option<usize>,
    pub max_results: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScopeRequest {
    #[serde(rename = "type")]
    pub scope_type: String,
    pub id: Option<String>,
    #[serde(default)]
    pub inherit: bool,
}

impl ScopeRequest {
    pub fn to_scope(&self) -> Result<Scope, String> {
        match self.scope_type.as_str() {
            "global" => Ok(Scope::Global),
            "org" => self
                .id
                .clone()
                .map(|id| Scope::Org { id })
                .ok_or_else(|| "org scope requires id".to_string()),
            "project" => self
                .id
                .clone()
                .map(|id| Scope::Project { id })
                .ok_or_else(|| "project scope requires id".to_string()),
            "session" => self
                .id
                .clone()
                .map(|id| Scope::Session { id })
                .ok_or_else(|| "session scope requires id".to_string()),
            other => Err(format!("unknown scope type: {other}")),
        }
    }
}

/// The canonical query request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    pub action: Action,
    pub scope: ScopeRequest,
    pub types: Option<Vec<EntryKind>>,
    pub search: Option<String>,
    #[serde(default)]
    pub fuzzy: bool,
    #[serde(default)]
    pub regex: bool,
    #[serde(default = "default_true")]
    pub use_fts5: bool,
    #[serde(default)]
    pub semantic_search: bool,
    pub semantic_threshold: Option<f64>,
    pub fields: Option<Vec<String>>,
    pub tags: Option<TagFilterRequest>,
    pub priority: Option<RangeRequest>,
    pub confidence: Option<RangeRequest>,
    #[serde(default)]
    pub include_inactive: bool,
    pub at_time: Option<DateTime<Utc>>,
    pub valid_during: Option<ValidDuringRequest>,
    pub created_after: Option<DateTime<Utc>>,
    pub created_before: Option<DateTime<Utc>>,
    pub related_to: Option<RelatedToRequest>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub intent: Option<Intent>,
    pub hybrid_alpha: Option<f64>,
    pub recency_weight: Option<f64>,
    pub decay_half_life_days: Option<u64>,
    pub decay_function: Option<String>,
    #[serde(default)]
    pub compact: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultEntry {
    pub id: String,
    pub kind: EntryKind,
    pub scope: Scope,
    pub name: String,
    pub content: String,
    pub tags: Vec<String>,
    pub priority: Option<u8>,
    pub confidence: Option<f64>,
    pub score: f64,
    pub matched_fields: Option<Vec<String>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResponseMeta {
    pub returned_count: usize,
    pub total_matched: Option<usize>,
    pub cache_hit: bool,
    pub degraded: bool,
    pub stage_timings_ms: Option<BTreeMap<String, f64>>,
    pub intent_detected: Option<Intent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    pub entries: Vec<ResultEntry>,
    pub meta: ResponseMeta,
}
