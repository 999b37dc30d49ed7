//! docent-index: vector similarity search core for the docent RAG system
//!
//! Stores `(chunk, document, vector)` references and answers nearest-neighbor
//! queries by cosine similarity. Two interchangeable backends implement the
//! same [`VectorIndex`] contract: a brute-force [`FlatIndex`] and an
//! approximate [`HnswIndex`] built on `hnsw_rs`. Callers pick a backend by
//! configuration; results carry similarity as `1 - cosine distance`.

pub mod distance;
pub mod index;

pub use distance::cosine_similarity;
pub use index::{
    flat::FlatIndex, hnsw::HnswIndex, ChunkRef, IndexError, Neighbor, Result, VectorIndex,
};
