/// A tag is a short, case-preserved string attached to an entry, used for
/// include/require/exclude set filtering. Kept as a plain `String`
/// rather than a newtype: tags travel through `BTreeSet<String>` on `Entry`
/// and through the query request's tag filter without any behavior beyond
/// equality and ordering.
pub type Tag = String;

/// Trims surrounding whitespace; tags are matched by exact string equality
/// elsewhere, so no casefolding happens here (unlike entity normalization).
pub fn normalize_tag(raw: &str) -> Tag {
    raw.trim().to_string()
}
