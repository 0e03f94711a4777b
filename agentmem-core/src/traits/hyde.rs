use crate::errors::CoreResult;
use crate::intent::Intent;

/// LLM collaborator used only for Hypothetical Document Expansion. Out of
/// scope to implement here; callers inject a concrete LLM-backed
/// implementation.
pub trait HydeGenerator: Send + Sync {
    /// Generates up to `max_documents` hypothetical documents conditioned on
    /// `query` and the detected `intent`. Any failure should be surfaced as
    /// an error; the Semantic Candidate Generator is responsible for
    /// silently falling back to the literal query, not this trait.
    fn generate(&self, query: &str, intent: Intent, max_documents: usize) -> CoreResult<Vec<String>>;
}
