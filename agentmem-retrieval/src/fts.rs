//! FTS Candidate Generator.

use std::collections::HashMap;

use agentmem_core::errors::{CoreError, CoreResult};
use agentmem_core::model::{Entry, EntryId, EntryKind, Scope};
use agentmem_core::traits::StorageDriver;
use regex::Regex;
use tracing::{debug, warn};
use unicode_normalization::UnicodeNormalization;

const MIN_TOKEN_LEN: usize = 2;
const FUZZY_LONG_TOKEN_LEN: usize = 4;
const FUZZY_EDIT_DISTANCE_LONG: usize = 2;
const FUZZY_EDIT_DISTANCE_SHORT: usize = 1;

#[derive(Debug, Default)]
pub struct FtsCandidates {
    pub ids: Vec<EntryId>,
    pub sparse_score: HashMap<EntryId, f64>,
    /// Set when the configured engine was unavailable and we fell back to a
    /// naive substring scan ("Failure modes").
    pub degraded: bool,
}

/// NFKC-normalizes and casefolds `text`. Casefolding is approximated with
/// `to_lowercase`, the practical stand-in most ASCII/Latin-script FTS
/// engines use in lieu of full Unicode case folding.
pub fn normalize(text: &str) -> String {
    text.nfkc().collect::<String>().to_lowercase()
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TokenKind {
    And,
    Or,
    Not,
    Phrase(String),
    Prefix(String),
    Word(String),
}

fn tokenize(normalized: &str) -> Vec<TokenKind> {
    let mut tokens = Vec::new();
    let mut chars = normalized.chars().peekable();
    let mut buf = String::new();

    while let Some(&c) = chars.peek() {
        if c == '"' {
            chars.next();
            let mut phrase = String::new();
            for c in chars.by_ref() {
                if c == '"' {
                    break;
                }
                phrase.push(c);
            }
            if !phrase.is_empty() {
                tokens.push(TokenKind::Phrase(phrase));
            }
            continue;
        }
        if c.is_whitespace() {
            chars.next();
            flush_word(&mut buf, &mut tokens);
            continue;
        }
        buf.push(c);
        chars.next();
    }
    flush_word(&mut buf, &mut tokens);
    tokens
}

fn flush_word(buf: &mut String, tokens: &mut Vec<TokenKind>) {
    if buf.is_empty() {
        return;
    }
    let word = std::mem::take(buf);
    match word.as_str() {
        "and" => tokens.push(TokenKind::And),
        "or" => tokens.push(TokenKind::Or),
        "not" => tokens.push(TokenKind::Not),
        _ => {
            if let Some(stem) = word.strip_suffix('*') {
                if stem.len() >= MIN_TOKEN_LEN {
                    tokens.push(TokenKind::Prefix(stem.to_string()));
                }
            } else if word.len() >= MIN_TOKEN_LEN {
                tokens.push(TokenKind::Word(word));
            }
        }
    }
}

/// Rebuilds a canonical match string for the storage driver's FTS engine:
/// short tokens dropped (unless quoted), operators normalized to uppercase,
/// phrases re-quoted, prefixes re-suffixed with `*`.
fn rebuild_match_string(tokens: &[TokenKind]) -> String {
    tokens
        .iter()
        .map(|t| match t {
            TokenKind::And => "AND".to_string(),
            TokenKind::Or => "OR".to_string(),
            TokenKind::Not => "NOT".to_string(),
            TokenKind::Phrase(p) => format!("\"{p}\""),
            TokenKind::Prefix(p) => format!("{p}*"),
            TokenKind::Word(w) => w.clone(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn plain_terms(tokens: &[TokenKind]) -> Vec<String> {
    tokens
        .iter()
        .filter_map(|t| match t {
            TokenKind::Word(w) => Some(w.clone()),
            TokenKind::Phrase(p) => Some(p.clone()),
            TokenKind::Prefix(p) => Some(p.clone()),
            _ => None,
        })
        .collect()
}

fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut cur = vec![0usize; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        cur[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            cur[j + 1] = (prev[j + 1] + 1).min(cur[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    prev[b.len()]
}

fn token_fuzzy_matches(token: &str, candidate: &str) -> bool {
    let bound = if token.len() >= FUZZY_LONG_TOKEN_LEN {
        FUZZY_EDIT_DISTANCE_LONG
    } else {
        FUZZY_EDIT_DISTANCE_SHORT
    };
    levenshtein(token, candidate) <= bound
}

fn corpus_scan(
    storage: &dyn StorageDriver,
    scopes: &[Scope],
    kinds: &[EntryKind],
) -> CoreResult<Vec<Entry>> {
    storage.fetch_candidates(
        None,
        scopes,
        kinds,
        &agentmem_core::traits::FetchOptions {
            include_inactive: false,
            candidate_limit: usize::MAX,
            ..Default::default()
        },
    )
}

/// Maps a request field name to the storage column it searches; `content`
/// and `description` both alias the entry body.
fn field_to_column(field: &str) -> Result<&'static str, String> {
    match field {
        "name" => Ok("name"),
        "title" => Ok("title"),
        "content" | "description" => Ok("body"),
        other => Err(format!("unknown search field: {other}")),
    }
}

/// Resolves a request's `fields` filter to the columns it restricts matching
/// to. `None`/empty means the default: every indexed column.
fn resolve_columns(fields: Option<&[String]>) -> Result<Vec<&'static str>, String> {
    let fields = match fields {
        Some(f) if !f.is_empty() => f,
        _ => return Ok(vec!["name", "title", "body"]),
    };
    let mut columns = Vec::with_capacity(fields.len());
    for field in fields {
        let column = field_to_column(field)?;
        if !columns.contains(&column) {
            columns.push(column);
        }
    }
    Ok(columns)
}

fn haystack(entry: &Entry, columns: &[&str]) -> String {
    let mut parts = Vec::with_capacity(3);
    if columns.contains(&"name") {
        parts.push(entry.name.as_str());
    }
    if columns.contains(&"title") {
        if let Some(title) = &entry.title {
            parts.push(title.as_str());
        }
    }
    if columns.contains(&"body") {
        parts.push(entry.body.as_str());
    }
    normalize(&parts.join(" "))
}

/// Local fuzzy/regex scanner used when the request needs semantics the
/// driver's native FTS engine does not provide, when the caller opted out of
/// the native engine, or when the driver is unavailable (degraded fallback).
fn local_scan(
    storage: &dyn StorageDriver,
    scopes: &[Scope],
    kinds: &[EntryKind],
    query_terms: &[String],
    regex: Option<&Regex>,
    columns: &[&str],
) -> CoreResult<FtsCandidates> {
    let entries = corpus_scan(storage, scopes, kinds)?;
    let mut ids = Vec::new();
    let mut sparse_score = HashMap::new();

    for entry in &entries {
        let hay = haystack(entry, columns);
        let score = if let Some(re) = regex {
            re.find_iter(&hay).count() as f64
        } else {
            let hay_tokens: Vec<&str> = hay.split_whitespace().collect();
            query_terms
                .iter()
                .filter(|term| {
                    hay.contains(term.as_str())
                        || hay_tokens.iter().any(|t| token_fuzzy_matches(term, t))
                })
                .count() as f64
        };
        if score > 0.0 {
            ids.push(entry.id.clone());
            sparse_score.insert(entry.id.clone(), score);
        }
    }

    Ok(FtsCandidates {
        ids,
        sparse_score,
        degraded: false,
    })
}

/// Compiles `pattern` as a regex. The `regex` crate is a linear-time,
/// non-backtracking engine, so "safe regular expression (no catastrophic
/// backtracking constructs)" is an engine-level guarantee here
/// rather than something this function has to additionally police.
fn compile_safe_regex(pattern: &str) -> CoreResult<Regex> {
    Regex::new(pattern).map_err(|e| CoreError::bad_request(format!("invalid regex: {e}")))
}

/// Generates FTS candidates for `query`. Returns `None` when the
/// query is empty or purely filter-based (bypass). `fields` restricts
/// matching to a subset of `name`/`content`/`description`/`title`
/// (`None`/empty searches all of them). `use_fts5` set to `false` bypasses
/// the driver's native engine in favor of the naive scan unconditionally.
pub fn generate_fts_candidates(
    storage: &dyn StorageDriver,
    raw_query: Option<&str>,
    scopes: &[Scope],
    kinds: &[EntryKind],
    fuzzy: bool,
    regex: bool,
    use_fts5: bool,
    fields: Option<&[String]>,
    candidate_limit: usize,
) -> CoreResult<Option<FtsCandidates>> {
    let raw_query = match raw_query {
        Some(q) if !q.trim().is_empty() => q,
        _ => return Ok(None),
    };
    let columns = resolve_columns(fields).map_err(CoreError::bad_request)?;

    if regex {
        let re = compile_safe_regex(raw_query)?;
        let result = local_scan(storage, scopes, kinds, &[], Some(&re), &columns)?;
        debug!(candidates = result.ids.len(), "regex fts scan complete");
        return Ok(Some(result));
    }

    let normalized = normalize(raw_query);
    let tokens = tokenize(&normalized);

    if fuzzy {
        let terms = plain_terms(&tokens);
        let result = local_scan(storage, scopes, kinds, &terms, None, &columns)?;
        debug!(candidates = result.ids.len(), "fuzzy fts scan complete");
        return Ok(Some(result));
    }

    let mut match_string = rebuild_match_string(&tokens);
    if match_string.is_empty() {
        return Ok(None);
    }
    if columns.len() < 3 {
        match_string = format!("{{{}}}: {match_string}", columns.join(" "));
    }

    if !use_fts5 {
        let terms = plain_terms(&tokens);
        let result = local_scan(storage, scopes, kinds, &terms, None, &columns)?;
        debug!(candidates = result.ids.len(), "fts5 bypassed by request, naive scan complete");
        return Ok(Some(result));
    }

    match storage.search_fts(&match_string, candidate_limit) {
        Ok(hits) => {
            let mut ids = Vec::with_capacity(hits.len());
            let mut sparse_score = HashMap::with_capacity(hits.len());
            for (id, score) in hits {
                ids.push(id.clone());
                sparse_score.insert(id, score);
            }
            Ok(Some(FtsCandidates {
                ids,
                sparse_score,
                degraded: false,
            }))
        }
        Err(CoreError::Unavailable(reason)) => {
            warn!(reason, "fts engine unavailable, degrading to substring scan");
            let terms = plain_terms(&tokens);
            let mut result = local_scan(storage, scopes, kinds, &terms, None, &columns)?;
            result.degraded = true;
            Ok(Some(result))
        }
        Err(other) => Err(other),
    }
}
