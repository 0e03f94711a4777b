//! Semantic Candidate Generator: vector similarity via the
//! embedding collaborator, with optional HyDE expansion.

use std::collections::HashMap;

use agentmem_core::errors::CoreResult;
use agentmem_core::intent::Intent;
use agentmem_core::model::{Entry, EntryId, EntryKind, Scope};
use agentmem_core::traits::{EmbeddingProvider, FetchOptions, HydeGenerator, StorageDriver};
use tracing::{debug, warn};

#[derive(Debug, Default)]
pub struct SemanticCandidates {
    pub ids: Vec<EntryId>,
    pub dense_score: HashMap<EntryId, f64>,
}

fn cosine(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f64 = a.iter().zip(b).map(|(x, y)| (*x as f64) * (*y as f64)).sum();
    let na: f64 = a.iter().map(|x| (*x as f64) * (*x as f64)).sum::<f64>().sqrt();
    let nb: f64 = b.iter().map(|x| (*x as f64) * (*x as f64)).sum::<f64>().sqrt();
    if na == 0.0 || nb == 0.0 {
        0.0
    } else {
        dot / (na * nb)
    }
}

/// Generates semantic candidates for `query`. Returns `None`
/// when semantic search is disabled or the collaborator is unavailable —
/// this is a fail-open, non-essential stage.
#[allow(clippy::too_many_arguments)]
pub fn generate_semantic_candidates(
    storage: &dyn StorageDriver,
    embedding: &dyn EmbeddingProvider,
    hyde: Option<&dyn HydeGenerator>,
    hyde_enabled: bool,
    hyde_max_documents: usize,
    query: &str,
    intent: Intent,
    scopes: &[Scope],
    kinds: &[EntryKind],
    threshold: f64,
) -> CoreResult<Option<SemanticCandidates>> {
    if query.trim().is_empty() || !embedding.is_available() {
        return Ok(None);
    }

    let mut query_texts = vec![query.to_string()];
    if hyde_enabled {
        if let Some(hyde) = hyde {
            match hyde.generate(query, intent, hyde_max_documents) {
                Ok(docs) => query_texts.extend(docs),
                Err(e) => {
                    warn!(error = %e, "hyde generation failed, falling back to literal query");
                }
            }
        }
    }

    let query_embeddings = match embedding.embed_batch(&query_texts) {
        Ok(batch) => batch.embeddings,
        Err(e) => {
            warn!(error = %e, "embedding provider failed on query batch, degrading");
            return Ok(None);
        }
    };

    let corpus: Vec<Entry> = storage.fetch_candidates(
        None,
        scopes,
        kinds,
        &FetchOptions {
            include_inactive: false,
            candidate_limit: usize::MAX,
            ..Default::default()
        },
    )?;
    if corpus.is_empty() {
        return Ok(Some(SemanticCandidates::default()));
    }

    let bodies: Vec<String> = corpus.iter().map(|e| e.body.clone()).collect();
    let corpus_embeddings = match embedding.embed_batch(&bodies) {
        Ok(batch) => batch.embeddings,
        Err(e) => {
            warn!(error = %e, "embedding provider failed on corpus batch, degrading");
            return Ok(None);
        }
    };

    let mut dense_score: HashMap<EntryId, f64> = HashMap::new();
    for (entry, corpus_vec) in corpus.iter().zip(corpus_embeddings.iter()) {
        let mut best = 0.0f64;
        for q in &query_embeddings {
            let sim = cosine(q, corpus_vec);
            if sim > best {
                best = sim;
            }
        }
        if best >= threshold {
            dense_score.insert(entry.id.clone(), best);
        }
    }

    let mut ids: Vec<EntryId> = dense_score.keys().cloned().collect();
    ids.sort_by(|a, b| {
        dense_score[b]
            .partial_cmp(&dense_score[a])
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.cmp(b))
    });

    debug!(candidates = ids.len(), queries = query_texts.len(), "semantic candidate generation complete");
    Ok(Some(SemanticCandidates { ids, dense_score }))
}
