//! Response types for the HTTP API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::document::{ContentType, Document};

/// Maximum characters of chunk content carried in a source preview
pub const PREVIEW_CHARS: usize = 200;

/// A source attribution for an answer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceRef {
    /// Parent document ID
    pub document_id: Uuid,
    /// Parent document display name
    pub document_name: String,
    /// Chunk content, truncated to [`PREVIEW_CHARS`] characters
    pub content_preview: String,
    /// Similarity score, rounded to 3 decimal places
    pub similarity: f32,
}

impl SourceRef {
    /// Truncate chunk content for a preview, appending an ellipsis marker
    /// when anything was cut.
    pub fn preview_of(content: &str) -> String {
        if content.chars().count() <= PREVIEW_CHARS {
            content.to_string()
        } else {
            let head: String = content.chars().take(PREVIEW_CHARS).collect();
            format!("{}...", head)
        }
    }

    /// Round a similarity score to 3 decimal places for display
    pub fn round_similarity(similarity: f32) -> f32 {
        (similarity * 1000.0).round() / 1000.0
    }
}

/// Response from a RAG query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    /// Generated answer
    pub response: String,
    /// Session this exchange was recorded under
    pub session_id: String,
    /// Source attributions, empty when no context was used
    pub sources: Vec<SourceRef>,
}

impl QueryResponse {
    /// Canned response for a store with no documents at all
    pub fn no_documents(session_id: String) -> Self {
        Self {
            response: "I don't have any documents in my knowledge base yet. \
                       Please upload some documents first."
                .to_string(),
            session_id,
            sources: Vec::new(),
        }
    }

    /// Canned response when nothing relevant survived the threshold
    pub fn no_context(session_id: String) -> Self {
        Self {
            response: "I couldn't find relevant information to answer your question \
                       in my knowledge base."
                .to_string(),
            session_id,
            sources: Vec::new(),
        }
    }
}

/// Summary of an ingested document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSummary {
    /// Document ID
    pub id: Uuid,
    /// Filename
    pub filename: String,
    /// Content type
    pub content_type: ContentType,
    /// File size in bytes
    pub file_size: u64,
    /// Number of chunks created
    pub total_chunks: u32,
    /// Ingestion timestamp
    pub ingested_at: DateTime<Utc>,
}

impl From<&Document> for DocumentSummary {
    fn from(doc: &Document) -> Self {
        Self {
            id: doc.id,
            filename: doc.filename.clone(),
            content_type: doc.content_type,
            file_size: doc.file_size,
            total_chunks: doc.total_chunks,
            ingested_at: doc.ingested_at,
        }
    }
}

/// Response from document ingestion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestResponse {
    /// Whether at least one document was ingested
    pub success: bool,
    /// Documents created in this request
    pub documents: Vec<DocumentSummary>,
    /// Total chunks created across all documents
    pub total_chunks_created: u32,
    /// Files skipped as duplicates of existing documents
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub skipped: Vec<SkippedFile>,
    /// Per-file failures (partial success)
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub errors: Vec<IngestError>,
    /// Processing time in milliseconds
    pub processing_time_ms: u64,
}

/// A file skipped during ingestion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedFile {
    /// Filename that was skipped
    pub filename: String,
    /// Why it was skipped
    pub reason: String,
}

/// A file that failed during ingestion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestError {
    /// Filename that failed
    pub filename: String,
    /// Error message
    pub error: String,
}

/// Response for listing documents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentListResponse {
    /// All documents, newest first
    pub documents: Vec<DocumentSummary>,
    /// Total count
    pub total_count: usize,
}

/// Response from deleting a document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    /// Deleted document ID
    pub document_id: Uuid,
    /// How many chunks were removed with it
    pub chunks_deleted: usize,
}
