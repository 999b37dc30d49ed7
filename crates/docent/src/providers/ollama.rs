//! Ollama-backed providers for embeddings and chat completion

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::{EmbeddingConfig, LlmConfig};
use crate::error::{Error, Result};

use super::embedding::EmbeddingProvider;
use super::llm::{ChatMessage, LlmProvider};

/// HTTP client for a local Ollama server
pub struct OllamaClient {
    http: reqwest::Client,
    base_url: String,
    timeout_secs: u64,
    max_retries: u32,
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    embedding: Vec<f32>,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

impl OllamaClient {
    /// Create a client from the LLM configuration
    pub fn new(config: &LlmConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout_secs: config.timeout_secs,
            max_retries: config.max_retries,
        }
    }

    /// Generate an embedding, retrying transient failures
    pub async fn embed(&self, model: &str, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/api/embeddings", self.base_url);
        let body = serde_json::json!({ "model": model, "prompt": text });

        let mut last_error = None;
        for attempt in 0..=self.max_retries {
            match self.http.post(&url).json(&body).send().await {
                Ok(resp) => {
                    let resp = resp.error_for_status().map_err(|e| {
                        Error::Embedding(format!("ollama returned {}", e))
                    })?;
                    let parsed: EmbeddingsResponse = resp
                        .json()
                        .await
                        .map_err(|e| Error::Embedding(format!("invalid response: {}", e)))?;
                    return Ok(parsed.embedding);
                }
                Err(e) if e.is_timeout() => {
                    return Err(Error::EmbeddingTimeout(self.timeout_secs));
                }
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "embedding request failed");
                    last_error = Some(e);
                }
            }
        }

        Err(Error::Embedding(
            last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unknown error".to_string()),
        ))
    }

    /// Run a single chat completion
    pub async fn chat(
        &self,
        model: &str,
        messages: &[ChatMessage],
        temperature: f32,
        max_tokens: usize,
    ) -> Result<String> {
        let url = format!("{}/api/chat", self.base_url);
        let body = serde_json::json!({
            "model": model,
            "messages": messages,
            "stream": false,
            "options": {
                "temperature": temperature,
                "num_predict": max_tokens,
            },
        });

        let resp = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::GenerationTimeout(self.timeout_secs)
                } else {
                    Error::Generation(e.to_string())
                }
            })?
            .error_for_status()
            .map_err(|e| Error::Generation(format!("ollama returned {}", e)))?;

        let parsed: ChatResponse = resp
            .json()
            .await
            .map_err(|e| Error::Generation(format!("invalid response: {}", e)))?;

        Ok(parsed.message.content)
    }

    /// Check whether the server answers at all
    pub async fn health_check(&self) -> bool {
        let url = format!("{}/api/tags", self.base_url);
        matches!(self.http.get(&url).send().await, Ok(resp) if resp.status().is_success())
    }
}

/// Ollama embedding provider
pub struct OllamaEmbedder {
    client: Arc<OllamaClient>,
    model: String,
    dimensions: usize,
}

impl OllamaEmbedder {
    /// Create an embedder sharing an existing client
    pub fn new(client: Arc<OllamaClient>, config: &EmbeddingConfig) -> Self {
        Self {
            client,
            model: config.model.clone(),
            dimensions: config.dimensions,
        }
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let vector = self.client.embed(&self.model, text).await?;
        if vector.len() != self.dimensions {
            return Err(Error::Embedding(format!(
                "model '{}' produced {} dimensions, store is configured for {}",
                self.model,
                vector.len(),
                self.dimensions
            )));
        }
        Ok(vector)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "ollama"
    }
}

/// Ollama chat-completion provider
pub struct OllamaGenerator {
    client: Arc<OllamaClient>,
    model: String,
    temperature: f32,
    max_tokens: usize,
}

impl OllamaGenerator {
    /// Create a generator sharing an existing client
    pub fn new(client: Arc<OllamaClient>, config: &LlmConfig) -> Self {
        Self {
            client,
            model: config.generate_model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}

#[async_trait]
impl LlmProvider for OllamaGenerator {
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String> {
        self.client
            .chat(&self.model, messages, self.temperature, self.max_tokens)
            .await
    }

    fn name(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }
}
