use crate::intent::Intent;

/// Single lightweight query-intent classifier. The default
/// rule-based implementation lives in `agentmem-retrieval`; this trait lets
/// callers swap in an LLM-backed classifier without touching the pipeline.
pub trait IntentClassifier: Send + Sync {
    fn classify(&self, query: &str) -> Intent;
}
