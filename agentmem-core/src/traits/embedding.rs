use crate::errors::CoreResult;

/// Embedding collaborator contract. Consumed, never
/// implemented, by this workspace's pipeline crates; embedding inference
/// itself is explicitly out of scope.
pub trait EmbeddingProvider: Send + Sync {
    /// `embedBatch(texts) -> {embeddings, model}`. No guarantee is
    /// made on dimension; the caller's vector index is built from the first
    /// batch's dimension and rejects mismatched vectors downstream.
    fn embed_batch(&self, texts: &[String]) -> CoreResult<EmbeddingBatch>;

    fn embed(&self, text: &str) -> CoreResult<Vec<f32>> {
        Ok(self
            .embed_batch(&[text.to_string()])?
            .embeddings
            .into_iter()
            .next()
            .unwrap_or_default())
    }

    fn is_available(&self) -> bool;
}

#[derive(Debug, Clone)]
pub struct EmbeddingBatch {
    pub embeddings: Vec<Vec<f32>>,
    pub model: String,
}
