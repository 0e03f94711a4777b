pub mod defaults;

use serde::{Deserialize, Serialize};

/// Which timestamp the recency term is computed against — created or last
/// updated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecencyTimestampField {
    CreatedAt,
    UpdatedAt,
}

impl Default for RecencyTimestampField {
    fn default() -> Self {
        RecencyTimestampField::UpdatedAt
    }
}

/// Recency decay function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecayFunction {
    Exponential,
    Linear,
    Step,
}

impl Default for DecayFunction {
    fn default() -> Self {
        DecayFunction::Exponential
    }
}

/// How the Full Scorer combines sparse (FTS) and dense (semantic) scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HybridStrategy {
    Hybrid,
    SemanticOnly,
    FtsOnly,
}

impl Default for HybridStrategy {
    fn default() -> Self {
        HybridStrategy::Hybrid
    }
}

/// Scorer weights, each overridable with its own configurable default.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScorerWeights {
    pub explicit_relation: f64,
    pub tag_match: f64,
    pub scope_proximity: f64,
    pub text_match: f64,
    pub priority_max: f64,
    pub semantic_max: f64,
    pub recency_max: f64,
}

impl Default for ScorerWeights {
    fn default() -> Self {
        Self {
            explicit_relation: defaults::DEFAULT_EXPLICIT_RELATION,
            tag_match: defaults::DEFAULT_TAG_MATCH,
            scope_proximity: defaults::DEFAULT_SCOPE_PROXIMITY,
            text_match: defaults::DEFAULT_TEXT_MATCH,
            priority_max: defaults::DEFAULT_PRIORITY_MAX,
            semantic_max: defaults::DEFAULT_SEMANTIC_MAX,
            recency_max: defaults::DEFAULT_RECENCY_MAX,
        }
    }
}

/// Feedback multiplier coefficients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackConfig {
    pub enabled: bool,
    pub boost_per_positive: f64,
    pub boost_max: f64,
    pub penalty_per_negative: f64,
    pub penalty_max: f64,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            boost_per_positive: defaults::DEFAULT_BOOST_PER_POSITIVE,
            boost_max: defaults::DEFAULT_BOOST_MAX,
            penalty_per_negative: defaults::DEFAULT_PENALTY_PER_NEGATIVE,
            penalty_max: defaults::DEFAULT_PENALTY_MAX,
        }
    }
}

/// Entity index / entity filter tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityConfig {
    pub exact_match_boost: f64,
    pub partial_match_boost: f64,
    pub min_entities_for_filter: usize,
}

impl Default for EntityConfig {
    fn default() -> Self {
        Self {
            exact_match_boost: defaults::DEFAULT_EXACT_MATCH_BOOST,
            partial_match_boost: defaults::DEFAULT_PARTIAL_MATCH_BOOST,
            min_entities_for_filter: defaults::DEFAULT_MIN_ENTITIES_FOR_FILTER,
        }
    }
}

/// Cache capacities and TTLs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub prepared_statement_capacity: u64,
    pub feedback_cache_capacity: u64,
    pub feedback_cache_ttl_secs: u64,
    pub query_result_cache_enabled: bool,
    pub query_cache_capacity: u64,
    pub query_cache_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            prepared_statement_capacity: defaults::DEFAULT_PREPARED_STATEMENT_CACHE_CAPACITY,
            feedback_cache_capacity: defaults::DEFAULT_FEEDBACK_CACHE_CAPACITY,
            feedback_cache_ttl_secs: defaults::DEFAULT_FEEDBACK_CACHE_TTL_SECS,
            query_result_cache_enabled: defaults::DEFAULT_QUERY_RESULT_CACHE_ENABLED,
            query_cache_capacity: defaults::DEFAULT_QUERY_CACHE_CAPACITY,
            query_cache_ttl_secs: defaults::DEFAULT_QUERY_CACHE_TTL_SECS,
        }
    }
}

/// Top-level retrieval core configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub default_limit: usize,
    pub max_limit: usize,
    pub scorer: ScorerWeights,
    pub feedback: FeedbackConfig,
    pub entity: EntityConfig,
    pub recency_weight: f64,
    pub decay_half_life_days: f64,
    pub decay_function: DecayFunction,
    pub recency_timestamp_field: RecencyTimestampField,
    pub hybrid_strategy: HybridStrategy,
    pub query_expansion: bool,
    pub relation_default_depth: usize,
    pub cache: CacheConfig,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            default_limit: defaults::DEFAULT_LIMIT,
            max_limit: defaults::MAX_LIMIT,
            scorer: ScorerWeights::default(),
            feedback: FeedbackConfig::default(),
            entity: EntityConfig::default(),
            recency_weight: defaults::DEFAULT_RECENCY_WEIGHT,
            decay_half_life_days: defaults::DEFAULT_DECAY_HALF_LIFE_DAYS,
            decay_function: DecayFunction::default(),
            recency_timestamp_field: RecencyTimestampField::default(),
            hybrid_strategy: HybridStrategy::default(),
            query_expansion: true,
            relation_default_depth: defaults::DEFAULT_RELATION_DEPTH,
            cache: CacheConfig::default(),
        }
    }
}

impl RetrievalConfig {
    /// Parses a TOML config document, filling in defaults for any field the
    /// document omits via `#[serde(default)]` per struct.
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}
