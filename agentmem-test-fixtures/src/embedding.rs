//! Deterministic stand-in for the embedding collaborator. Maps text to a
//! small fixed-dimension vector by hashing overlapping character trigrams
//! into buckets, so lexically similar strings land close in cosine space
//! without pulling in a real embedding model.

use agentmem_core::errors::CoreResult;
use agentmem_core::traits::{EmbeddingBatch, EmbeddingProvider};

const DIMENSIONS: usize = 32;

fn embed_one(text: &str) -> Vec<f32> {
    let lower = text.to_lowercase();
    let chars: Vec<char> = lower.chars().collect();
    let mut v = vec![0f32; DIMENSIONS];
    if chars.len() < 3 {
        let mut hash = 0u64;
        for c in &chars {
            hash = hash.wrapping_mul(131).wrapping_add(*c as u64);
        }
        v[(hash as usize) % DIMENSIONS] += 1.0;
    } else {
        for window in chars.windows(3) {
            let mut hash = 0u64;
            for c in window {
                hash = hash.wrapping_mul(131).wrapping_add(*c as u64);
            }
            v[(hash as usize) % DIMENSIONS] += 1.0;
        }
    }
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
    v
}

/// An `EmbeddingProvider` with no external dependency: every call succeeds
/// and `is_available()` is configurable so tests can exercise the pipeline's
/// "collaborator unavailable" fail-open path.
pub struct FakeEmbeddingProvider {
    available: bool,
}

impl Default for FakeEmbeddingProvider {
    fn default() -> Self {
        Self { available: true }
    }
}

impl FakeEmbeddingProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unavailable() -> Self {
        Self { available: false }
    }
}

impl EmbeddingProvider for FakeEmbeddingProvider {
    fn embed_batch(&self, texts: &[String]) -> CoreResult<EmbeddingBatch> {
        Ok(EmbeddingBatch {
            embeddings: texts.iter().map(|t| embed_one(t)).collect(),
            model: "fake-trigram-hash-v1".to_string(),
        })
    }

    fn is_available(&self) -> bool {
        self.available
    }
}
