//! Error taxonomy for the retrieval core.
//!
//! Policy: non-essential subsystems (semantic, HyDE, feedback multiplier,
//! entity index lookup, cache) fail open — the pipeline swallows the error,
//! continues without that signal, and records it in telemetry. Essential
//! subsystems (scope resolution, entry fetch, scoring) fail closed — the
//! error propagates to the caller.

use thiserror::Error;

/// The single public error type returned by the retrieval core.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("storage driver unavailable: {0}")]
    Unavailable(String),

    #[error("degraded: {0}")]
    Degraded(String),

    #[error("deadline exceeded")]
    Timeout,

    #[error("internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Whether this error belongs to a subsystem the pipeline treats as
    /// fail-open: callers of non-essential collaborators should catch the
    /// error themselves and never construct one of these from an essential
    /// stage. Kept here as a single source of truth for the classification.
    pub fn is_fail_open(&self) -> bool {
        matches!(self, Self::Degraded(_) | Self::Timeout)
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
