//! Deterministic offline embedder
//!
//! Derives a unit vector from the SHA-256 digest of the text, so identical
//! inputs always produce byte-identical embeddings. No semantic meaning, but
//! exact: the test suites and air-gapped deployments run the full pipeline
//! against it without a model server.

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::error::Result;

use super::embedding::EmbeddingProvider;

/// Hash-seeded embedding provider
pub struct HashEmbedder {
    dimensions: usize,
}

impl HashEmbedder {
    /// Create a provider emitting vectors of the given width
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn vector_for(&self, text: &str) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.dimensions);
        let mut block: [u8; 32] = Sha256::digest(text.as_bytes()).into();

        // Stretch the digest in counter mode until we have enough components
        while out.len() < self.dimensions {
            for byte in block {
                if out.len() == self.dimensions {
                    break;
                }
                out.push(byte as f32 / 127.5 - 1.0);
            }
            block = Sha256::digest(block).into();
        }

        // Normalize so cosine similarity behaves like the real models
        let norm: f32 = out.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            for x in &mut out {
                *x /= norm;
            }
        }
        out
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.vector_for(text))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "deterministic"
    }
}
