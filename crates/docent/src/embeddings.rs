//! Process-wide embedding provider
//!
//! The embedding backend is the one shared resource whose setup is worth
//! paying only once. [`shared_embedder`] initializes it on first use behind a
//! `tokio::sync::OnceCell`: concurrent first callers block on a single
//! initialization instead of racing to build duplicate instances, and every
//! later call reuses the same `Arc`. Tests that need isolation construct
//! providers directly via [`build_embedder`].

use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::config::{EmbeddingBackend, EmbeddingConfig, LlmConfig};
use crate::providers::{EmbeddingProvider, HashEmbedder, OllamaClient, OllamaEmbedder};

static EMBEDDER: OnceCell<Arc<dyn EmbeddingProvider>> = OnceCell::const_new();

/// Construct an embedding provider for the configured backend.
///
/// Does not touch the process-wide instance.
pub fn build_embedder(
    embeddings: &EmbeddingConfig,
    llm: &LlmConfig,
) -> Arc<dyn EmbeddingProvider> {
    match embeddings.provider {
        EmbeddingBackend::Ollama => {
            let client = Arc::new(OllamaClient::new(llm));
            Arc::new(OllamaEmbedder::new(client, embeddings))
        }
        EmbeddingBackend::Deterministic => Arc::new(HashEmbedder::new(embeddings.dimensions)),
    }
}

/// Get the process-wide embedding provider, initializing it on first call.
///
/// The first caller pays the initialization cost; the configuration of later
/// calls is ignored once the instance exists.
pub async fn shared_embedder(
    embeddings: &EmbeddingConfig,
    llm: &LlmConfig,
) -> Arc<dyn EmbeddingProvider> {
    let provider = EMBEDDER
        .get_or_init(|| async {
            let provider = build_embedder(embeddings, llm);
            tracing::info!(
                provider = provider.name(),
                dimensions = provider.dimensions(),
                "embedding provider initialized"
            );
            provider
        })
        .await;
    Arc::clone(provider)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[tokio::test]
    async fn shared_instance_is_reused() {
        let mut config = AppConfig::default();
        config.embeddings.provider = EmbeddingBackend::Deterministic;

        let a = shared_embedder(&config.embeddings, &config.llm).await;
        let b = shared_embedder(&config.embeddings, &config.llm).await;
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[tokio::test]
    async fn build_embedder_selects_backend() {
        let mut config = AppConfig::default();
        config.embeddings.provider = EmbeddingBackend::Deterministic;
        let provider = build_embedder(&config.embeddings, &config.llm);
        assert_eq!(provider.name(), "deterministic");
    }
}
