//! Embedding provider trait

use async_trait::async_trait;

use crate::error::Result;

/// Trait for mapping text to fixed-width vectors
///
/// Implementations:
/// - `OllamaEmbedder`: local Ollama server (nomic-embed-text or similar)
/// - `HashEmbedder`: deterministic offline vectors for tests and air-gapped runs
///
/// Embedding must be a pure function of the text and the loaded model: the
/// same input against the same model yields an identical vector.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding for a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for multiple texts, index-aligned with the input.
    ///
    /// Default implementation calls `embed` sequentially.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed(text).await?);
        }
        Ok(embeddings)
    }

    /// Vector width produced by this provider
    fn dimensions(&self) -> usize;

    /// Provider name for logging
    fn name(&self) -> &str;
}
