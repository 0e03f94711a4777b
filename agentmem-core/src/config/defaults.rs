//! Numeric defaults for the retrieval pipeline, collected in one place so
//! every tunable knob has a single source of truth.

pub const DEFAULT_LIMIT: usize = 20;
pub const MAX_LIMIT: usize = 500;

// Scorer weights.
pub const DEFAULT_EXPLICIT_RELATION: f64 = 5.0;
pub const DEFAULT_TAG_MATCH: f64 = 1.0;
pub const DEFAULT_SCOPE_PROXIMITY: f64 = 2.0;
pub const DEFAULT_TEXT_MATCH: f64 = 1.0;
pub const DEFAULT_PRIORITY_MAX: f64 = 3.0;
pub const DEFAULT_SEMANTIC_MAX: f64 = 4.0;
pub const DEFAULT_RECENCY_MAX: f64 = 2.0;

// Entity index.
pub const DEFAULT_EXACT_MATCH_BOOST: f64 = 25.0;
pub const DEFAULT_PARTIAL_MATCH_BOOST: f64 = 25.0;
pub const DEFAULT_MIN_ENTITIES_FOR_FILTER: usize = 1;

// FTS fuzzy matching.
pub const DEFAULT_FUZZY_EDIT_DISTANCE_LONG: u32 = 2;
pub const DEFAULT_FUZZY_EDIT_DISTANCE_SHORT: u32 = 1;
pub const FUZZY_LONG_TOKEN_LEN: usize = 4;

// Recency decay.
pub const DEFAULT_RECENCY_WEIGHT: f64 = 1.0;
pub const DEFAULT_DECAY_HALF_LIFE_DAYS: f64 = 30.0;

// Feedback multiplier.
pub const DEFAULT_BOOST_PER_POSITIVE: f64 = 0.05;
pub const DEFAULT_BOOST_MAX: f64 = 0.5;
pub const DEFAULT_PENALTY_PER_NEGATIVE: f64 = 0.1;
pub const DEFAULT_PENALTY_MAX: f64 = 0.5;

// Caches.
pub const DEFAULT_PREPARED_STATEMENT_CACHE_CAPACITY: u64 = 256;
pub const DEFAULT_FEEDBACK_CACHE_CAPACITY: u64 = 10_000;
pub const DEFAULT_FEEDBACK_CACHE_TTL_SECS: u64 = 300;
pub const DEFAULT_QUERY_CACHE_CAPACITY: u64 = 1_000;
pub const DEFAULT_QUERY_CACHE_TTL_SECS: u64 = 30;
pub const DEFAULT_QUERY_RESULT_CACHE_ENABLED: bool = false;

// Relation expander.
pub const DEFAULT_RELATION_DEPTH: usize = 2;
