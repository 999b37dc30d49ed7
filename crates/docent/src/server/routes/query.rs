//! RAG query endpoint

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use std::time::Instant;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::generation::assemble;
use crate::memory::ConversationTurn;
use crate::retrieval::RetrievalParams;
use crate::server::state::AppState;
use crate::types::query::{QueryRequest, Role};
use crate::types::response::QueryResponse;

/// POST /api/query - answer a question from the ingested documents.
///
/// Pipeline: embed the query, retrieve and threshold-filter similar chunks,
/// assemble attributed context, and run one completion with the session's
/// recent history. An empty store or an empty retrieval short-circuits to a
/// canned answer without calling the model. A failed completion returns the
/// fallback answer with HTTP success; only embedding failure fails the
/// request, since nothing can be retrieved without a query vector.
pub async fn query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>> {
    let start = Instant::now();

    if request.message.trim().is_empty() {
        return Err(Error::EmptyQuery);
    }

    let session_id = request
        .session_id
        .clone()
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    tracing::info!(session = %session_id, "query: \"{}\"", request.message);

    // Inline history overrides stored memory for this request
    let history: Vec<ConversationTurn> = match &request.history {
        Some(turns) => turns
            .iter()
            .map(|t| ConversationTurn {
                role: t.role,
                content: t.content.clone(),
                at: Utc::now(),
            })
            .collect(),
        None => state
            .memory()
            .recent(&session_id, state.config().memory.history_window),
    };

    // Nothing ingested yet: answer without touching the embedder or the model
    if state.retriever().is_empty() {
        let response = QueryResponse::no_documents(session_id.clone());
        record_exchange(&state, &session_id, &request.message, &response.response);
        return Ok(Json(response));
    }

    // Query-time embedding failure is fatal to this request
    let query_vector = state.embedder().embed(&request.message).await?;

    let params = RetrievalParams::resolve(
        &state.config().retrieval,
        request.top_k,
        request.similarity_threshold,
    );
    let ranked = state.retriever().search(&query_vector, params).await?;

    let response = match assemble(&ranked, state.config().retrieval.max_context_chunks) {
        None => QueryResponse::no_context(session_id.clone()),
        Some(assembled) => {
            let answer = state
                .generator()
                .respond(&request.message, &assembled, &history)
                .await;
            QueryResponse {
                response: answer,
                session_id: session_id.clone(),
                sources: assembled.sources,
            }
        }
    };

    record_exchange(&state, &session_id, &request.message, &response.response);

    tracing::info!(
        session = %session_id,
        sources = response.sources.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "query answered"
    );

    Ok(Json(response))
}

fn record_exchange(state: &AppState, session_id: &str, question: &str, answer: &str) {
    state.memory().append(session_id, Role::User, question);
    state.memory().append(session_id, Role::Assistant, answer);
}
