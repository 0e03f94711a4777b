/// agentmem-core version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default result page size when a request omits `limit`.
pub const DEFAULT_LIMIT: usize = 20;

/// Hard ceiling on `limit`, enforced by the Result Assembler.
pub const MAX_LIMIT: usize = 500;

/// Candidate-pool overfetch factor feeding the Light Scorer (Phase 1).
/// Candidate limit = ceil(limit * CANDIDATE_OVERFETCH_FACTOR).
pub const CANDIDATE_OVERFETCH_FACTOR: f64 = 1.5;

/// Minimum token length kept by the FTS normalizer unless quoted.
pub const MIN_FTS_TOKEN_LEN: usize = 2;

/// Minimum identifier length considered by entity extraction.
pub const MIN_IDENTIFIER_LEN: usize = 4;

/// Maximum bounded BFS depth for the Relation Expander.
pub const MAX_RELATION_DEPTH: usize = 5;

/// Maximum in-process change-bus subscribers; excess registrations are
/// dropped with a single logged warning.
pub const MAX_EVENT_SUBSCRIBERS: usize = 1000;

/// Milliseconds in a day, used for age/decay computations.
pub const MS_PER_DAY: f64 = 86_400_000.0;
