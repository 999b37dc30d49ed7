//! Document and chunk types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Supported content types
///
/// A closed set: classification is a pure function over the declared MIME
/// type and the filename extension, and `Unsupported` is mapped to an
/// extraction error by the ingestion pipeline.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    /// PDF document
    Pdf,
    /// Plain text file
    PlainText,
    /// Markdown file
    Markdown,
    /// Anything else
    Unsupported,
}

impl ContentType {
    /// Classify an upload from its declared MIME type and filename
    pub fn classify(declared: Option<&str>, filename: &str) -> Self {
        if let Some(mime) = declared {
            match mime {
                "application/pdf" => return Self::Pdf,
                "text/plain" => return Self::PlainText,
                "text/markdown" => return Self::Markdown,
                _ => {}
            }
        }

        let guessed = mime_guess::from_path(filename).first_raw();
        match guessed {
            Some("application/pdf") => Self::Pdf,
            Some("text/plain") => Self::PlainText,
            Some("text/markdown") | Some("text/x-markdown") => Self::Markdown,
            _ => {
                // mime_guess misses a few plain-text extensions we accept
                let ext = filename.rsplit('.').next().unwrap_or("").to_lowercase();
                match ext.as_str() {
                    "pdf" => Self::Pdf,
                    "txt" | "text" | "log" => Self::PlainText,
                    "md" | "markdown" => Self::Markdown,
                    _ => Self::Unsupported,
                }
            }
        }
    }

    /// Stable tag used in the catalog
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::PlainText => "text",
            Self::Markdown => "markdown",
            Self::Unsupported => "unsupported",
        }
    }

    /// Inverse of [`ContentType::as_str`]
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "pdf" => Self::Pdf,
            "text" => Self::PlainText,
            "markdown" => Self::Markdown,
            _ => Self::Unsupported,
        }
    }
}

/// A document that has been ingested
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique document ID
    pub id: Uuid,
    /// Original filename as uploaded
    pub filename: String,
    /// Content type
    pub content_type: ContentType,
    /// SHA-256 of the extracted text, for deduplication
    pub content_hash: String,
    /// File size in bytes
    pub file_size: u64,
    /// Number of chunks created
    pub total_chunks: u32,
    /// Ingestion timestamp
    pub ingested_at: DateTime<Utc>,
}

impl Document {
    /// Create a new document record
    pub fn new(
        filename: String,
        content_type: ContentType,
        content_hash: String,
        file_size: u64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            filename,
            content_type,
            content_hash,
            file_size,
            total_chunks: 0,
            ingested_at: Utc::now(),
        }
    }
}

/// A contiguous slice of a document's text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Unique chunk ID
    pub id: Uuid,
    /// Parent document ID
    pub document_id: Uuid,
    /// Text content
    pub content: String,
    /// Embedding vector; empty means pending or failed, never retrievable
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub embedding: Vec<f32>,
    /// Position within the parent document
    pub chunk_index: u32,
}

impl Chunk {
    /// Create a chunk without an embedding
    pub fn new(document_id: Uuid, content: String, chunk_index: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            document_id,
            content,
            embedding: Vec::new(),
            chunk_index,
        }
    }

    /// Whether this chunk can participate in retrieval
    pub fn is_embedded(&self) -> bool {
        !self.embedding.is_empty()
    }
}
