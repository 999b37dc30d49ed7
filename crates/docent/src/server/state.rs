//! Application state for the docent server

use std::sync::Arc;

use parking_lot::RwLock;

use docent_index::{FlatIndex, HnswIndex, VectorIndex};
use docent_index::index::hnsw::HnswParams;

use crate::config::{AppConfig, IndexBackend};
use crate::embeddings;
use crate::error::Result;
use crate::generation::ResponseGenerator;
use crate::ingestion::IngestPipeline;
use crate::memory::ConversationMemory;
use crate::providers::{EmbeddingProvider, LlmProvider, OllamaClient, OllamaGenerator};
use crate::retrieval::Retriever;
use crate::storage::Database;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    db: Database,
    index: Arc<dyn VectorIndex>,
    embedder: Arc<dyn EmbeddingProvider>,
    retriever: Retriever,
    generator: ResponseGenerator,
    memory: ConversationMemory,
    ready: RwLock<bool>,
}

impl AppState {
    /// Build the full state from configuration: open the catalog, rebuild the
    /// vector index from it, and wire up the providers.
    pub async fn new(config: AppConfig) -> Result<Self> {
        config.validate()?;

        let db = Database::open(&config.storage.database_path)?;
        tracing::info!(path = %config.storage.database_path.display(), "catalog opened");

        let index = build_index(&config);
        let restored = db.embedded_chunks(config.embeddings.dimensions)?;
        let restored_count = restored.len();
        for chunk_ref in restored {
            index.insert(chunk_ref)?;
        }
        tracing::info!(
            backend = index.name(),
            chunks = restored_count,
            "vector index rebuilt from catalog"
        );

        let embedder = embeddings::shared_embedder(&config.embeddings, &config.llm).await;

        let llm_client = Arc::new(OllamaClient::new(&config.llm));
        let llm: Arc<dyn LlmProvider> = Arc::new(OllamaGenerator::new(llm_client, &config.llm));
        tracing::info!(model = llm.model(), "llm provider initialized");

        Ok(Self::assemble(config, db, index, embedder, llm))
    }

    /// Wire state from pre-built collaborators. Used by tests to run the full
    /// pipeline against in-memory storage and stub providers.
    pub fn with_providers(
        config: AppConfig,
        db: Database,
        index: Arc<dyn VectorIndex>,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LlmProvider>,
    ) -> Self {
        Self::assemble(config, db, index, embedder, llm)
    }

    fn assemble(
        config: AppConfig,
        db: Database,
        index: Arc<dyn VectorIndex>,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LlmProvider>,
    ) -> Self {
        let retriever = Retriever::new(Arc::clone(&index), db.clone());
        let generator = ResponseGenerator::new(llm, config.memory.history_window);
        let memory = ConversationMemory::new(&config.memory);

        Self {
            inner: Arc::new(AppStateInner {
                retriever,
                generator,
                memory,
                config,
                db,
                index,
                embedder,
                ready: RwLock::new(true),
            }),
        }
    }

    /// Get configuration
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    /// Get the catalog
    pub fn db(&self) -> &Database {
        &self.inner.db
    }

    /// Get the vector index
    pub fn index(&self) -> &Arc<dyn VectorIndex> {
        &self.inner.index
    }

    /// Get the embedding provider
    pub fn embedder(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.inner.embedder
    }

    /// Get the retriever
    pub fn retriever(&self) -> &Retriever {
        &self.inner.retriever
    }

    /// Get the response generator
    pub fn generator(&self) -> &ResponseGenerator {
        &self.inner.generator
    }

    /// Get conversation memory
    pub fn memory(&self) -> &ConversationMemory {
        &self.inner.memory
    }

    /// Build an ingestion pipeline over the shared collaborators
    pub fn pipeline(&self) -> IngestPipeline {
        IngestPipeline::new(
            &self.inner.config.chunking,
            self.inner.db.clone(),
            Arc::clone(&self.inner.index),
            Arc::clone(&self.inner.embedder),
        )
    }

    /// Whether the server is ready to take traffic
    pub fn is_ready(&self) -> bool {
        *self.inner.ready.read()
    }

    /// Flip the readiness state
    pub fn set_ready(&self, ready: bool) {
        *self.inner.ready.write() = ready;
    }
}

fn build_index(config: &AppConfig) -> Arc<dyn VectorIndex> {
    match config.index.backend {
        IndexBackend::Flat => Arc::new(FlatIndex::new(config.embeddings.dimensions)),
        IndexBackend::Hnsw => Arc::new(HnswIndex::new(
            config.embeddings.dimensions,
            HnswParams {
                max_connections: config.index.hnsw_m,
                ef_construction: config.index.hnsw_ef_construction,
                ef_search: config.index.hnsw_ef_search,
                capacity: config.index.capacity,
            },
        )),
    }
}
