//! Error taxonomy for the RAG pipeline
//!
//! Collaborator failures (extraction, storage) surface to callers as named
//! variants; transient pipeline failures (embedding at ingest, generation)
//! are absorbed into degraded-but-valid responses where a fallback exists and
//! only reach this type when no fallback is possible.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use uuid::Uuid;

/// All errors produced by the docent pipeline
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Query message was blank
    #[error("query message cannot be empty")]
    EmptyQuery,

    /// Upload had a content type outside {pdf, text, markdown}
    #[error("unsupported content type: {0}")]
    UnsupportedContent(String),

    /// The extraction collaborator produced no usable text
    #[error("text extraction failed: {0}")]
    Extraction(String),

    /// Embedding call failed (skip-and-log at ingest, fatal at query time)
    #[error("embedding failed: {0}")]
    Embedding(String),

    /// Embedding call exceeded its deadline
    #[error("embedding timed out after {0}s")]
    EmbeddingTimeout(u64),

    /// LLM completion failed; never escapes the response generator
    #[error("generation failed: {0}")]
    Generation(String),

    /// LLM completion exceeded its deadline
    #[error("generation timed out after {0}s")]
    GenerationTimeout(u64),

    /// Vector index rejected an operation
    #[error("index error: {0}")]
    Index(#[from] docent_index::IndexError),

    /// SQLite catalog failure
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// No document with this identifier
    #[error("document not found: {0}")]
    NotFound(Uuid),

    /// Invalid configuration
    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::EmptyQuery | Error::UnsupportedContent(_) | Error::Extraction(_) => {
                StatusCode::BAD_REQUEST
            }
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Embedding(_) | Error::EmbeddingTimeout(_) => StatusCode::BAD_GATEWAY,
            Error::Generation(_) | Error::GenerationTimeout(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
