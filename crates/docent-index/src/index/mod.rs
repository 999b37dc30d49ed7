//! The [`VectorIndex`] contract shared by all search backends

pub mod flat;
pub mod hnsw;

use uuid::Uuid;

/// Errors from index operations
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// Vector width does not match the index's configured dimension
    #[error("vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, IndexError>;

/// A chunk's entry in the index: identity plus its embedding
#[derive(Debug, Clone)]
pub struct ChunkRef {
    /// Chunk ID
    pub chunk_id: Uuid,
    /// Parent document ID
    pub document_id: Uuid,
    /// Embedding vector, exactly `dimensions` wide
    pub vector: Vec<f32>,
}

/// A search hit with its similarity score
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor {
    /// Chunk ID
    pub chunk_id: Uuid,
    /// Parent document ID
    pub document_id: Uuid,
    /// Cosine similarity (`1 - cosine distance`), higher is more similar
    pub similarity: f32,
}

/// Similarity search over chunk embeddings.
///
/// Implementations:
/// - [`flat::FlatIndex`]: exact brute-force scan
/// - [`hnsw::HnswIndex`]: approximate HNSW graph (`hnsw_rs`)
///
/// Contract (verified by the shared suite in `tests/contract.rs`):
/// - `search` returns hits sorted by non-increasing similarity; equal scores
///   keep insertion order
/// - every stored vector is exactly `dimensions` wide
/// - `remove_document` drops all of a document's entries and no others
pub trait VectorIndex: Send + Sync {
    /// Insert one chunk entry
    fn insert(&self, entry: ChunkRef) -> Result<()>;

    /// Remove every entry belonging to a document, returning how many were removed
    fn remove_document(&self, document_id: &Uuid) -> usize;

    /// Return up to `k` nearest neighbors of `query` by cosine similarity
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>>;

    /// Number of live entries
    fn len(&self) -> usize;

    /// Whether the index holds no live entries
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Backend name for logging
    fn name(&self) -> &str;
}
