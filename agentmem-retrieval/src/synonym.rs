//! Synonym expansion: widens the keyword candidate pool with a small
//! built-in synonym table before the query reaches the inverted index
//! (supplemented feature, grounded in the reference implementation's
//! `expansion::synonym_expander`; gated by the same `query_expansion` config
//! flag the reference implementation uses). Purely additive: the pipeline runs the original
//! query and, when a synonym variant exists, runs that too and unions the
//! two candidate sets via RRF — a synonym substitution never narrows the
//! original query's own AND semantics.

const SYNONYMS: &[(&str, &[&str])] = &[
    ("ts", &["typescript"]),
    ("js", &["javascript"]),
    ("db", &["database"]),
    ("config", &["configuration"]),
    ("auth", &["authentication", "authorization"]),
    ("repo", &["repository"]),
    ("func", &["function"]),
    ("impl", &["implementation"]),
    ("perf", &["performance"]),
    ("docs", &["documentation"]),
];

/// Builds an alternate query string from `normalized_query` (already NFKC
/// normalized/casefolded) by substituting the first registered synonym for
/// every recognized token. Returns `None` when no token has a synonym, so
/// the caller can skip the extra search entirely.
pub fn expand_with_synonyms(normalized_query: &str) -> Option<String> {
    let mut variant = String::new();
    let mut changed = false;
    for (i, token) in normalized_query.split_whitespace().enumerate() {
        if i > 0 {
            variant.push(' ');
        }
        let clean = token.trim_matches('"');
        match SYNONYMS.iter().find(|(k, _)| *k == clean) {
            Some((_, syns)) => {
                variant.push_str(syns[0]);
                changed = true;
            }
            None => variant.push_str(token),
        }
    }
    if changed {
        Some(variant)
    } else {
        None
    }
}
