//! Provider abstractions for embeddings and LLM completion
//!
//! Trait-based so the pipeline can switch between a live Ollama server and
//! the deterministic offline embedder without touching callers.

pub mod deterministic;
pub mod embedding;
pub mod llm;
pub mod ollama;

pub use deterministic::HashEmbedder;
pub use embedding::EmbeddingProvider;
pub use llm::{ChatMessage, ChatRole, LlmProvider};
pub use ollama::{OllamaClient, OllamaEmbedder, OllamaGenerator};
