//! docent: document Q&A with retrieval-augmented generation
//!
//! Ingests documents (PDF, plain text, markdown), splits them into
//! overlapping chunks, embeds each chunk, and answers questions by retrieving
//! the most similar chunks and handing them to an LLM as grounding context.
//! Answers carry source attributions back to the originating documents.

pub mod config;
pub mod embeddings;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod memory;
pub mod providers;
pub mod retrieval;
pub mod server;
pub mod storage;
pub mod types;

pub use config::AppConfig;
pub use error::{Error, Result};
pub use types::{
    document::{Chunk, ContentType, Document},
    query::QueryRequest,
    response::{QueryResponse, SourceRef},
};

/// Re-export the index core for convenience
pub use docent_index;
