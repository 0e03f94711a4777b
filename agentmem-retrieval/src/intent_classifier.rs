//! Default rule-based `IntentClassifier`: a single lightweight, table-driven
//! classifier over the query text. This is a pluggable default, not the only
//! valid implementation.

use agentmem_core::intent::Intent;
use agentmem_core::traits::IntentClassifier;

const HOW_TO: &[&str] = &["how to", "how do i", "how can i", "guide", "tutorial", "steps to"];
const DEBUG: &[&str] = &["error", "bug", "fix", "broken", "fails", "failing", "crash", "exception", "debug"];
const COMPARE: &[&str] = &["vs", "versus", "compare", "comparison", "better than", "difference between"];
const CONFIGURE: &[&str] = &["configure", "config", "setup", "set up", "install", "settings"];
const EXPLORE: &[&str] = &["overview", "explore", "what is", "explain", "architecture", "introduction"];

/// Rule-based classifier: keyword matching over a casefolded query, in a
/// fixed priority order (debug and how-to outrank explore/compare, since a
/// query like "how to fix an error" is more actionably a debug query).
#[derive(Debug, Default, Clone, Copy)]
pub struct RuleBasedIntentClassifier;

impl RuleBasedIntentClassifier {
    pub fn new() -> Self {
        Self
    }
}

fn any_match(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

impl IntentClassifier for RuleBasedIntentClassifier {
    fn classify(&self, query: &str) -> Intent {
        let lower = query.to_lowercase();
        if lower.trim().is_empty() {
            return Intent::Unknown;
        }
        if any_match(&lower, DEBUG) {
            Intent::Debug
        } else if any_match(&lower, HOW_TO) {
            Intent::HowTo
        } else if any_match(&lower, COMPARE) {
            Intent::Compare
        } else if any_match(&lower, CONFIGURE) {
            Intent::Configure
        } else if any_match(&lower, EXPLORE) {
            Intent::Explore
        } else if lower.split_whitespace().count() <= 3 {
            Intent::Lookup
        } else {
            Intent::Unknown
        }
    }
}
