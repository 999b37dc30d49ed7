//! Configuration for the docent service

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Top-level application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Embedding configuration
    pub embeddings: EmbeddingConfig,
    /// Chunking configuration
    pub chunking: ChunkingConfig,
    /// Retrieval configuration
    pub retrieval: RetrievalConfig,
    /// LLM configuration
    pub llm: LlmConfig,
    /// Vector index configuration
    pub index: IndexConfig,
    /// Catalog storage configuration
    pub storage: StorageConfig,
    /// Conversation memory configuration
    pub memory: MemoryConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file, falling back to defaults when
    /// `path` is `None`. Validates before returning.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(p) => {
                let raw = std::fs::read_to_string(p)?;
                toml::from_str(&raw)
                    .map_err(|e| Error::Config(format!("invalid config {}: {}", p.display(), e)))?
            }
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.chunking.chunk_size == 0 {
            return Err(Error::Config("chunk_size must be positive".into()));
        }
        if self.chunking.chunk_overlap * 2 >= self.chunking.chunk_size {
            return Err(Error::Config(
                "chunk_overlap must be less than half of chunk_size".into(),
            ));
        }
        if self.embeddings.dimensions == 0 {
            return Err(Error::Config("embedding dimensions must be positive".into()));
        }
        if !(0.0..=1.0).contains(&self.retrieval.similarity_threshold) {
            return Err(Error::Config(
                "similarity_threshold must be within [0.0, 1.0]".into(),
            ));
        }
        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
    /// Maximum upload size in bytes
    pub max_upload_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            enable_cors: true,
            max_upload_size: 50 * 1024 * 1024, // 50MB
        }
    }
}

/// Which embedding backend to use
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    /// Local Ollama server
    #[default]
    Ollama,
    /// Hash-seeded vectors, fully offline and reproducible
    Deterministic,
}

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Backend provider
    pub provider: EmbeddingBackend,
    /// Embedding model name (Ollama backend)
    pub model: String,
    /// Vector width; fixed for the lifetime of the store
    pub dimensions: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingBackend::Ollama,
            model: "nomic-embed-text".to_string(),
            dimensions: 768,
        }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Target chunk size in characters
    pub chunk_size: usize,
    /// Overlap between consecutive chunks
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of chunks fetched from the index
    pub top_k: usize,
    /// Minimum similarity for a chunk to count as relevant
    pub similarity_threshold: f32,
    /// At most this many accepted chunks reach the prompt
    pub max_context_chunks: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            similarity_threshold: 0.3,
            max_context_chunks: 3,
        }
    }
}

/// LLM configuration (Ollama)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Ollama base URL
    pub base_url: String,
    /// Generation model name
    pub generate_model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Maximum tokens in the completion
    pub max_tokens: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Retries for failed embedding requests
    pub max_retries: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            generate_model: "llama3.2:3b".to_string(),
            temperature: 0.7,
            max_tokens: 1000,
            timeout_secs: 120,
            max_retries: 2,
        }
    }
}

/// Which vector index backend to use
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IndexBackend {
    /// Exact brute-force scan
    #[default]
    Flat,
    /// Approximate HNSW graph
    Hnsw,
}

/// Vector index configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Index backend
    pub backend: IndexBackend,
    /// HNSW M parameter (connections per layer)
    pub hnsw_m: usize,
    /// HNSW ef_construction parameter
    pub hnsw_ef_construction: usize,
    /// HNSW ef_search parameter
    pub hnsw_ef_search: usize,
    /// Expected maximum chunk count (HNSW sizing hint)
    pub capacity: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            backend: IndexBackend::Flat,
            hnsw_m: 32,
            hnsw_ef_construction: 200,
            hnsw_ef_search: 100,
            capacity: 100_000,
        }
    }
}

/// Catalog storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the SQLite catalog
    pub database_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let database_path = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("docent")
            .join("catalog.db");
        Self { database_path }
    }
}

/// Conversation memory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// How many prior turns reach the prompt
    pub history_window: usize,
    /// Per-session turn cap; oldest turns are dropped beyond it
    pub max_turns_per_session: usize,
    /// Global session cap; the least recently active session is evicted
    pub max_sessions: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            history_window: 5,
            max_turns_per_session: 50,
            max_sessions: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        AppConfig::default().validate().unwrap();
    }

    #[test]
    fn oversized_overlap_is_rejected() {
        let mut config = AppConfig::default();
        config.chunking.chunk_size = 100;
        config.chunking.chunk_overlap = 60;
        assert!(config.validate().is_err());
    }

    #[test]
    fn threshold_out_of_range_is_rejected() {
        let mut config = AppConfig::default();
        config.retrieval.similarity_threshold = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn parses_partial_toml() {
        let raw = r#"
            [chunking]
            chunk_size = 512

            [index]
            backend = "hnsw"
        "#;
        let config: AppConfig = toml::from_str(raw).unwrap();
        assert_eq!(config.chunking.chunk_size, 512);
        assert_eq!(config.chunking.chunk_overlap, 200);
        assert_eq!(config.index.backend, IndexBackend::Hnsw);
        assert_eq!(config.retrieval.top_k, 5);
    }
}
