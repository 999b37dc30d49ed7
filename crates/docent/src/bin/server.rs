//! Docent server binary
//!
//! Run with: cargo run -p docent --bin docent-server
//!
//! Configuration is read from the TOML file named by `DOCENT_CONFIG`, falling
//! back to built-in defaults.

use std::path::PathBuf;

use docent::config::{AppConfig, EmbeddingBackend};
use docent::providers::OllamaClient;
use docent::server::Server;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docent=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_path = std::env::var_os("DOCENT_CONFIG").map(PathBuf::from);
    let config = AppConfig::load(config_path.as_deref())?;

    tracing::info!("configuration loaded");
    tracing::info!("  - embedding provider: {:?}", config.embeddings.provider);
    tracing::info!("  - embedding dimensions: {}", config.embeddings.dimensions);
    tracing::info!("  - index backend: {:?}", config.index.backend);
    tracing::info!("  - llm model: {}", config.llm.generate_model);
    tracing::info!("  - chunk size: {}", config.chunking.chunk_size);

    if config.embeddings.provider == EmbeddingBackend::Ollama {
        tracing::info!("checking ollama at {}...", config.llm.base_url);
        let client = OllamaClient::new(&config.llm);
        if client.health_check().await {
            tracing::info!("ollama is running");
        } else {
            tracing::warn!("ollama not reachable at {}", config.llm.base_url);
            tracing::warn!("start it with `ollama serve`, then pull the models:");
            tracing::warn!(
                "  ollama pull {} && ollama pull {}",
                config.embeddings.model,
                config.llm.generate_model
            );
        }
    }

    let server = Server::new(config).await?;

    println!("docent server listening on http://{}", server.address());
    println!("  POST /api/ingest     - upload documents");
    println!("  POST /api/query      - ask questions");
    println!("  GET  /api/documents  - list documents");

    server.start().await?;

    Ok(())
}
