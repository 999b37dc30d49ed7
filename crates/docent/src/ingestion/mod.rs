//! Document ingestion pipeline: extract, chunk, embed, persist, index

pub mod chunker;
pub mod extract;

pub use chunker::TextChunker;
pub use extract::{extract_text, ExtractedText};

use std::sync::Arc;

use docent_index::{ChunkRef, VectorIndex};

use crate::config::ChunkingConfig;
use crate::error::{Error, Result};
use crate::providers::EmbeddingProvider;
use crate::storage::Database;
use crate::types::{Chunk, ContentType, Document};

/// Result of ingesting one file
#[derive(Debug)]
pub enum IngestOutcome {
    /// A new document was created
    Ingested {
        document: Document,
        /// Chunks stored (embedded or pending)
        chunks_created: u32,
        /// Chunks whose embedding failed; stored but excluded from retrieval
        chunks_skipped: u32,
    },
    /// Identical content already exists under another document
    Duplicate { existing: Document },
}

/// Ingestion pipeline wiring extraction, chunking, embedding, and storage
pub struct IngestPipeline {
    chunker: TextChunker,
    db: Database,
    index: Arc<dyn VectorIndex>,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl IngestPipeline {
    /// Create a pipeline over the shared catalog, index, and embedder
    pub fn new(
        chunking: &ChunkingConfig,
        db: Database,
        index: Arc<dyn VectorIndex>,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Self {
        Self {
            chunker: TextChunker::new(chunking.chunk_size, chunking.chunk_overlap),
            db,
            index,
            embedder,
        }
    }

    /// Ingest one uploaded file.
    ///
    /// A chunk whose embedding fails is stored without a vector and excluded
    /// from retrieval; the document is only rejected when every chunk fails.
    pub async fn ingest(
        &self,
        filename: &str,
        declared_type: Option<&str>,
        data: &[u8],
    ) -> Result<IngestOutcome> {
        let content_type = ContentType::classify(declared_type, filename);
        let extracted = extract_text(content_type, filename, data)?;

        if let Some(existing) = self.db.find_document_by_hash(&extracted.content_hash)? {
            tracing::info!(
                filename,
                existing = %existing.filename,
                "skipping duplicate content"
            );
            return Ok(IngestOutcome::Duplicate { existing });
        }

        let pieces = self.chunker.chunk(&extracted.content);
        if pieces.is_empty() {
            return Err(Error::Extraction(format!(
                "'{}' contained only whitespace",
                filename
            )));
        }

        let mut document = Document::new(
            filename.to_string(),
            content_type,
            extracted.content_hash,
            data.len() as u64,
        );

        let mut chunks: Vec<Chunk> = pieces
            .into_iter()
            .enumerate()
            .map(|(i, piece)| Chunk::new(document.id, piece, i as u32))
            .collect();

        let mut skipped = 0u32;
        for chunk in chunks.iter_mut() {
            match self.embedder.embed(&chunk.content).await {
                Ok(vector) => chunk.embedding = vector,
                Err(e) => {
                    skipped += 1;
                    tracing::warn!(
                        filename,
                        chunk_index = chunk.chunk_index,
                        error = %e,
                        "embedding failed, chunk will be excluded from retrieval"
                    );
                }
            }
        }

        if skipped as usize == chunks.len() {
            return Err(Error::Embedding(format!(
                "all {} chunks of '{}' failed to embed",
                chunks.len(),
                filename
            )));
        }

        document.total_chunks = chunks.len() as u32;
        self.db.insert_document(&document, &chunks)?;

        for chunk in chunks.iter().filter(|c| c.is_embedded()) {
            self.index.insert(ChunkRef {
                chunk_id: chunk.id,
                document_id: chunk.document_id,
                vector: chunk.embedding.clone(),
            })?;
        }

        tracing::info!(
            filename,
            document_id = %document.id,
            chunks = chunks.len(),
            skipped,
            "document ingested"
        );

        Ok(IngestOutcome::Ingested {
            chunks_created: document.total_chunks,
            chunks_skipped: skipped,
            document,
        })
    }
}
