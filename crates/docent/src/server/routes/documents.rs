//! Document management endpoints

use axum::extract::{Path, State};
use axum::Json;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::response::{DeleteResponse, DocumentListResponse, DocumentSummary};

/// GET /api/documents - list all documents, newest first
pub async fn list_documents(State(state): State<AppState>) -> Result<Json<DocumentListResponse>> {
    let documents: Vec<DocumentSummary> = state
        .db()
        .list_documents()?
        .iter()
        .map(DocumentSummary::from)
        .collect();
    let total_count = documents.len();
    Ok(Json(DocumentListResponse {
        documents,
        total_count,
    }))
}

/// GET /api/documents/:id - fetch one document
pub async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DocumentSummary>> {
    let document = state.db().get_document(&id)?.ok_or(Error::NotFound(id))?;
    Ok(Json(DocumentSummary::from(&document)))
}

/// DELETE /api/documents/:id - remove a document and all of its chunks.
///
/// The catalog delete is one transaction; the index entries go right after,
/// so a concurrent search can at worst see ids the retriever no longer
/// resolves.
pub async fn delete_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteResponse>> {
    let chunks_deleted = state.db().delete_document(&id)?;
    state.index().remove_document(&id);

    tracing::info!(document_id = %id, chunks_deleted, "document deleted");

    Ok(Json(DeleteResponse {
        document_id: id,
        chunks_deleted,
    }))
}
