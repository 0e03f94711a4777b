//! Deterministic stand-in for the HyDE LLM collaborator. Instead
//! of calling out to an LLM, generates `max_documents` short templated
//! pseudo-documents that paraphrase the query through the detected intent,
//! which is enough to exercise the expansion fan-out/union logic in tests.

use agentmem_core::errors::{CoreError, CoreResult};
use agentmem_core::intent::Intent;
use agentmem_core::traits::HydeGenerator;

pub struct FakeHydeGenerator {
    fail: bool,
}

impl Default for FakeHydeGenerator {
    fn default() -> Self {
        Self { fail: false }
    }
}

impl FakeHydeGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a generator whose `generate` always errors, to exercise the
    /// "silently fall back to the literal query" path.
    pub fn failing() -> Self {
        Self { fail: true }
    }
}

impl HydeGenerator for FakeHydeGenerator {
    fn generate(&self, query: &str, intent: Intent, max_documents: usize) -> CoreResult<Vec<String>> {
        if self.fail {
            return Err(CoreError::Degraded("fake hyde generator unavailable".to_string()));
        }
        let templates: &[&str] = match intent {
            Intent::HowTo => &["A guide explaining how to {q}.", "Step-by-step instructions to {q}."],
            Intent::Debug => &["A postmortem describing a bug related to {q}.", "Troubleshooting notes for {q}."],
            Intent::Compare => &["A comparison of approaches to {q}.", "Tradeoffs to consider for {q}."],
            Intent::Configure => &["Configuration reference for {q}.", "Setup instructions covering {q}."],
            Intent::Explore => &["An overview introducing {q}.", "Background material about {q}."],
            Intent::Lookup | Intent::Unknown => &["Documentation about {q}.", "Reference material on {q}."],
        };
        Ok(templates
            .iter()
            .take(max_documents)
            .map(|t| t.replace("{q}", query))
            .collect())
    }
}
