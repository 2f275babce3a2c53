use async_trait::async_trait;

use crate::error::VectorResult;
use crate::models::{EmbeddingModel, EmbeddingResult};

/// Trait for embedding generation providers
///
/// Implementations wrap a specific API (OpenAI-compatible, local models).
/// The model is fixed at construction so every caller produces vectors of
/// the same dimension.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    fn model(&self) -> &EmbeddingModel;

    /// Generate an embedding for a single text; blank input is an error
    async fn embed(&self, text: &str) -> VectorResult<EmbeddingResult>;

    /// Generate embeddings for multiple texts, in input order
    async fn embed_batch(&self, texts: &[String]) -> VectorResult<Vec<EmbeddingResult>>;
}
