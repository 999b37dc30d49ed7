//! Similarity retrieval over the vector index
//!
//! The retriever owns the relevance policy: it searches the index with the
//! query vector, drops anything at or below the similarity threshold, and
//! resolves the survivors to their chunk content through the catalog.

use std::sync::Arc;

use docent_index::VectorIndex;
use uuid::Uuid;

use crate::config::RetrievalConfig;
use crate::error::Result;
use crate::storage::Database;

/// A retrieved chunk with its similarity score
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk_id: Uuid,
    pub document_id: Uuid,
    pub document_name: String,
    pub content: String,
    pub similarity: f32,
}

/// Retrieval knobs resolved for one request
#[derive(Debug, Clone, Copy)]
pub struct RetrievalParams {
    /// Number of chunks fetched from the index
    pub top_k: usize,
    /// Chunks scoring at or below this are excluded even inside the top-k
    pub similarity_threshold: f32,
}

impl RetrievalParams {
    /// Start from configuration, applying optional per-request overrides
    pub fn resolve(
        config: &RetrievalConfig,
        top_k: Option<usize>,
        threshold: Option<f32>,
    ) -> Self {
        Self {
            top_k: top_k.unwrap_or(config.top_k),
            similarity_threshold: threshold.unwrap_or(config.similarity_threshold),
        }
    }
}

/// Threshold-filtered nearest-neighbor retrieval
pub struct Retriever {
    index: Arc<dyn VectorIndex>,
    db: Database,
}

impl Retriever {
    /// Create a retriever over the shared index and catalog
    pub fn new(index: Arc<dyn VectorIndex>, db: Database) -> Self {
        Self { index, db }
    }

    /// Whether the index holds anything retrievable at all
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Top-k chunks above the relevance threshold, best first.
    ///
    /// The index search runs on the blocking pool; brute-force scans are
    /// CPU-bound and must not stall the runtime.
    pub async fn search(&self, query: &[f32], params: RetrievalParams) -> Result<Vec<ScoredChunk>> {
        let index = Arc::clone(&self.index);
        let query = query.to_vec();
        let k = params.top_k;

        let neighbors = tokio::task::spawn_blocking(move || index.search(&query, k))
            .await
            .map_err(|e| crate::error::Error::Internal(format!("search task failed: {}", e)))??;

        let accepted: Vec<_> = neighbors
            .into_iter()
            .filter(|n| n.similarity > params.similarity_threshold)
            .collect();

        if accepted.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = accepted.iter().map(|n| n.chunk_id).collect();
        let records = self.db.chunks_by_ids(&ids)?;

        // Preserve the index's ranking while joining in chunk content
        let mut scored = Vec::with_capacity(accepted.len());
        for neighbor in &accepted {
            if let Some(record) = records.iter().find(|r| r.id == neighbor.chunk_id) {
                scored.push(ScoredChunk {
                    chunk_id: record.id,
                    document_id: record.document_id,
                    document_name: record.document_name.clone(),
                    content: record.content.clone(),
                    similarity: neighbor.similarity,
                });
            } else {
                tracing::warn!(chunk_id = %neighbor.chunk_id, "indexed chunk missing from catalog");
            }
        }

        Ok(scored)
    }
}
