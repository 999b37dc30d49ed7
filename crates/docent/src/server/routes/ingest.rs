//! Document ingestion endpoint

use axum::extract::{Multipart, State};
use axum::Json;
use std::time::Instant;

use crate::error::{Error, Result};
use crate::ingestion::IngestOutcome;
use crate::server::state::AppState;
use crate::types::response::{DocumentSummary, IngestError, IngestResponse, SkippedFile};

/// POST /api/ingest - upload and process files.
///
/// Each multipart file field is processed independently; one bad file does
/// not fail the batch. The response carries created documents, skipped
/// duplicates, and per-file errors.
pub async fn ingest_files(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<IngestResponse>> {
    let start = Instant::now();
    let pipeline = state.pipeline();

    let mut documents = Vec::new();
    let mut skipped = Vec::new();
    let mut errors = Vec::new();
    let mut total_chunks = 0u32;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::Internal(format!("failed to read multipart field: {}", e)))?
    {
        let filename = match field.file_name() {
            Some(name) => name.to_string(),
            None => continue, // not a file field
        };
        let declared_type = field.content_type().map(|s| s.to_string());

        let data = match field.bytes().await {
            Ok(d) => d,
            Err(e) => {
                errors.push(IngestError {
                    filename,
                    error: format!("failed to read upload: {}", e),
                });
                continue;
            }
        };

        tracing::info!(filename = %filename, bytes = data.len(), "processing upload");

        match pipeline
            .ingest(&filename, declared_type.as_deref(), &data)
            .await
        {
            Ok(IngestOutcome::Ingested {
                document,
                chunks_created,
                chunks_skipped,
            }) => {
                if chunks_skipped > 0 {
                    tracing::warn!(
                        filename = %filename,
                        chunks_skipped,
                        "some chunks were stored without embeddings"
                    );
                }
                total_chunks += chunks_created;
                documents.push(DocumentSummary::from(&document));
            }
            Ok(IngestOutcome::Duplicate { existing }) => {
                skipped.push(SkippedFile {
                    filename,
                    reason: format!("duplicate of '{}'", existing.filename),
                });
            }
            Err(e) => {
                tracing::warn!(filename = %filename, error = %e, "ingestion failed");
                errors.push(IngestError {
                    filename,
                    error: e.to_string(),
                });
            }
        }
    }

    Ok(Json(IngestResponse {
        success: !documents.is_empty(),
        documents,
        total_chunks_created: total_chunks,
        skipped,
        errors,
        processing_time_ms: start.elapsed().as_millis() as u64,
    }))
}
