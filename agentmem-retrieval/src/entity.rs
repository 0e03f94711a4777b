//! Entity extraction and the entity reverse index.

use std::collections::HashMap;

use dashmap::DashMap;
use regex::Regex;
use std::sync::OnceLock;

use agentmem_core::config::EntityConfig;
use agentmem_core::constants::MIN_IDENTIFIER_LEN;
use agentmem_core::model::{Entry, EntryId, EntityOccurrence, EntityType};

/// Rule-based extraction of structured entities from free text. Applied
/// identically to query text and entry bodies, so the offline index and the
/// query-time lookup agree on what counts as an entity.
pub fn extract_entities(text: &str) -> Vec<(EntityType, String)> {
    let mut found = Vec::new();
    found.extend(extract_urls(text));
    found.extend(extract_file_paths(text));
    found.extend(extract_versions(text));
    found.extend(extract_identifiers(text));

    let mut seen = std::collections::HashSet::new();
    found.retain(|(ty, val)| seen.insert((ty.clone(), val.clone())));
    found
}

fn url_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"https?://[^\s,)\]]+").unwrap())
}

fn file_path_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"/?[A-Za-z0-9_.-]+/[A-Za-z0-9_./-]*\.[A-Za-z0-9]{1,8}").unwrap())
}

fn version_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bv\d+(\.\d+)*\b").unwrap())
}

fn identifier_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // camelCase (aB), PascalCase, or snake_case tokens.
    RE.get_or_init(|| Regex::new(r"\b([A-Za-z][a-z0-9]*([A-Z][a-z0-9]*)+|[A-Za-z0-9]+(_[A-Za-z0-9]+)+)\b").unwrap())
}

const STOP_WORDS: &[&str] = &["the", "and", "for", "with", "this", "that", "from", "into"];

fn trim_punct(s: &str) -> &str {
    s.trim_end_matches(|c: char| c.is_ascii_punctuation() && c != '_' && c != '/')
}

fn extract_urls(text: &str) -> Vec<(EntityType, String)> {
    url_re()
        .find_iter(text)
        .map(|m| (EntityType::Url, trim_punct(m.as_str()).to_string()))
        .collect()
}

fn extract_file_paths(text: &str) -> Vec<(EntityType, String)> {
    file_path_re()
        .find_iter(text)
        .map(|m| (EntityType::FilePath, trim_punct(m.as_str()).to_string()))
        .collect()
}

fn extract_versions(text: &str) -> Vec<(EntityType, String)> {
    version_re()
        .find_iter(text)
        .map(|m| (EntityType::VersionString, trim_punct(m.as_str()).to_lowercase()))
        .collect()
}

fn extract_identifiers(text: &str) -> Vec<(EntityType, String)> {
    identifier_re()
        .find_iter(text)
        .map(|m| trim_punct(m.as_str()))
        .filter(|s| s.len() >= MIN_IDENTIFIER_LEN && !STOP_WORDS.contains(&s.to_lowercase().as_str()))
        .map(|s| {
            let ty = if s.contains('(') || s.ends_with("()") {
                EntityType::FunctionName
            } else {
                EntityType::Identifier
            };
            (ty, s.to_lowercase())
        })
        .collect()
}

/// In-memory reverse index `(entity_type, normalized_value) -> [(entry_id,
/// count)]`, rebuilt on startup and incrementally maintained via
/// the change bus.
#[derive(Default)]
pub struct EntityIndex {
    index: DashMap<(EntityType, String), Vec<(EntryId, u32)>>,
    /// Tracks which (type, value) keys each entry currently contributes, so
    /// `remove_entry` can undo exactly what `index_entry` added without a
    /// full rebuild.
    by_entry: DashMap<EntryId, Vec<(EntityType, String)>>,
}

impl EntityIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the index from scratch over `entries` (startup scan).
    pub fn rebuild(&self, entries: &[Entry]) {
        self.index.clear();
        self.by_entry.clear();
        for entry in entries {
            self.index_entry(entry);
        }
    }

    /// Extracts entities from `entry.body` and upserts them into the index
    /// ("entity occurrence... produced offline from entry bodies").
    pub fn index_entry(&self, entry: &Entry) {
        self.remove_entry(&entry.id);
        let extracted = extract_entities(&entry.body);
        let mut counts: HashMap<(EntityType, String), u32> = HashMap::new();
        for (ty, val) in extracted {
            *counts.entry((ty, val)).or_insert(0) += 1;
        }
        let mut keys = Vec::with_capacity(counts.len());
        for ((ty, val), count) in counts {
            self.index
                .entry((ty.clone(), val.clone()))
                .or_default()
                .push((entry.id.clone(), count));
            keys.push((ty, val));
        }
        self.by_entry.insert(entry.id.clone(), keys);
    }

    pub fn remove_entry(&self, id: &EntryId) {
        if let Some((_, keys)) = self.by_entry.remove(id) {
            for key in keys {
                if let Some(mut occurrences) = self.index.get_mut(&key) {
                    occurrences.retain(|(eid, _)| eid != id);
                }
            }
        }
    }

    /// `lookupMultiple(entities)`: returns entry_id -> matched
    /// distinct-entity count, used by the Entry Filter's boost formula.
    pub fn lookup_multiple(&self, entities: &[(EntityType, String)]) -> HashMap<EntryId, usize> {
        let mut matched: HashMap<EntryId, usize> = HashMap::new();
        for key in entities {
            if let Some(occurrences) = self.index.get(key) {
                for (id, _count) in occurrences.iter() {
                    *matched.entry(id.clone()).or_insert(0) += 1;
                }
            }
        }
        matched
    }

    pub fn occurrence_count(&self) -> usize {
        self.index.iter().map(|e| e.value().len()).sum()
    }
}

/// Score contribution for an entry matching `matched` of the `total_entities`
/// extracted from the query: a flat `exact_match_boost` if every extracted
/// entity matched, otherwise `partial_match_boost` scaled by the matched
/// fraction and rounded. Zero when nothing was extracted or nothing matched.
pub fn match_boost(matched: usize, total_entities: usize, cfg: &EntityConfig) -> f64 {
    if total_entities == 0 || matched == 0 {
        return 0.0;
    }
    if matched >= total_entities {
        cfg.exact_match_boost
    } else {
        (cfg.partial_match_boost * (matched as f64 / total_entities as f64)).round()
    }
}

/// Builds the exact `EntityOccurrence` records the index derives from, for
/// callers (e.g. a storage-driver-level batch rebuild job) that want the
/// materialized list rather than the live `EntityIndex`.
pub fn occurrences_for_entry(entry: &Entry) -> Vec<EntityOccurrence> {
    let extracted = extract_entities(&entry.body);
    let mut counts: HashMap<(EntityType, String), u32> = HashMap::new();
    for (ty, val) in extracted {
        *counts.entry((ty, val)).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .map(|((entity_type, normalized_value), count)| EntityOccurrence {
            entity_type,
            normalized_value,
            entry_id: entry.id.clone(),
            count,
        })
        .collect()
}
