//! End-to-end pipeline tests: ingest, query, delete against in-memory
//! storage, the deterministic embedder, and a scripted LLM.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::{Path, State};
use axum::Json;
use uuid::Uuid;

use docent::config::{AppConfig, EmbeddingBackend};
use docent::error::{Error, Result};
use docent::ingestion::IngestOutcome;
use docent::providers::{ChatMessage, EmbeddingProvider, HashEmbedder, LlmProvider};
use docent::server::routes::{documents, query};
use docent::server::state::AppState;
use docent::storage::Database;
use docent::types::QueryRequest;
use docent_index::{FlatIndex, VectorIndex};

const DIMENSIONS: usize = 256;

/// Counts completions and returns a fixed answer
struct CountingLlm {
    calls: AtomicUsize,
}

impl CountingLlm {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
        })
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmProvider for CountingLlm {
    async fn generate(&self, _messages: &[ChatMessage]) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok("a grounded answer".to_string())
    }

    fn name(&self) -> &str {
        "counting"
    }

    fn model(&self) -> &str {
        "counting-1"
    }
}

/// Delegates to [`HashEmbedder`] but fails for texts containing a marker
struct FlakyEmbedder {
    inner: HashEmbedder,
    poison: &'static str,
}

#[async_trait]
impl EmbeddingProvider for FlakyEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.contains(self.poison) {
            return Err(Error::Embedding("simulated model failure".into()));
        }
        self.inner.embed(text).await
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }

    fn name(&self) -> &str {
        "flaky"
    }
}

fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.embeddings.provider = EmbeddingBackend::Deterministic;
    config.embeddings.dimensions = DIMENSIONS;
    config
}

fn test_state(
    config: AppConfig,
    embedder: Arc<dyn EmbeddingProvider>,
    llm: Arc<dyn LlmProvider>,
) -> AppState {
    let db = Database::in_memory().unwrap();
    let index: Arc<dyn VectorIndex> = Arc::new(FlatIndex::new(config.embeddings.dimensions));
    AppState::with_providers(config, db, index, embedder, llm)
}

fn default_state(llm: Arc<dyn LlmProvider>) -> AppState {
    test_state(test_config(), Arc::new(HashEmbedder::new(DIMENSIONS)), llm)
}

async fn ask(state: &AppState, request: QueryRequest) -> docent::QueryResponse {
    query::query(State(state.clone()), Json(request))
        .await
        .unwrap()
        .0
}

#[tokio::test]
async fn ingest_2500_chars_creates_four_chunks() {
    let state = default_state(CountingLlm::new());
    let text = "a".repeat(2500);

    let outcome = state
        .pipeline()
        .ingest("big.txt", Some("text/plain"), text.as_bytes())
        .await
        .unwrap();

    match outcome {
        IngestOutcome::Ingested {
            document,
            chunks_created,
            chunks_skipped,
        } => {
            // chunk_size 1000, overlap 200: windows advance by 800
            assert_eq!(chunks_created, 4);
            assert_eq!(chunks_skipped, 0);
            assert_eq!(document.total_chunks, 4);
        }
        other => panic!("expected ingestion, got {:?}", other),
    }
}

#[tokio::test]
async fn query_on_empty_store_skips_the_model() {
    let llm = CountingLlm::new();
    let state = default_state(llm.clone());

    let response = ask(&state, QueryRequest::new("anything at all?")).await;

    assert!(response.response.contains("don't have any documents"));
    assert!(response.sources.is_empty());
    assert_eq!(llm.call_count(), 0);
}

#[tokio::test]
async fn blank_query_is_rejected() {
    let state = default_state(CountingLlm::new());
    let result = query::query(
        State(state),
        Json(QueryRequest::new("   \n\t ")),
    )
    .await;
    assert!(matches!(result, Err(Error::EmptyQuery)));
}

#[tokio::test]
async fn relevant_chunk_is_cited_with_truncated_preview() {
    let llm = CountingLlm::new();
    let state = default_state(llm.clone());

    // Single chunk: short document, content longer than the preview cap
    let content = format!("The launch codes are stored in drawer seven. {}", "detail ".repeat(40));
    let content = content.trim().to_string();
    state
        .pipeline()
        .ingest("secrets.txt", Some("text/plain"), content.as_bytes())
        .await
        .unwrap();

    // Identical text embeds to the identical vector: similarity 1.0
    let response = ask(&state, QueryRequest::new(content.clone())).await;

    assert_eq!(response.response, "a grounded answer");
    assert_eq!(llm.call_count(), 1);
    assert_eq!(response.sources.len(), 1);

    let source = &response.sources[0];
    assert_eq!(source.document_name, "secrets.txt");
    assert!(source.similarity > 0.999);
    assert!(source.content_preview.ends_with("..."));
    assert_eq!(source.content_preview.chars().count(), 203);
}

#[tokio::test]
async fn irrelevant_query_gets_canned_answer_without_model_call() {
    let llm = CountingLlm::new();
    let state = default_state(llm.clone());

    state
        .pipeline()
        .ingest("doc.txt", Some("text/plain"), b"completely unrelated material")
        .await
        .unwrap();

    // Hash vectors of unrelated texts are near-orthogonal, far below 0.3
    let response = ask(&state, QueryRequest::new("what is the meaning of life?")).await;

    assert!(response.response.contains("couldn't find relevant information"));
    assert!(response.sources.is_empty());
    assert_eq!(llm.call_count(), 0);
}

#[tokio::test]
async fn sessions_accumulate_memory_per_session() {
    let llm = CountingLlm::new();
    let state = default_state(llm.clone());
    state
        .pipeline()
        .ingest("doc.txt", Some("text/plain"), b"shared knowledge text")
        .await
        .unwrap();

    let mut request = QueryRequest::new("shared knowledge text");
    request.session_id = Some("session-a".to_string());
    ask(&state, request.clone()).await;
    ask(&state, request).await;

    // Two exchanges: user + assistant per query
    assert_eq!(state.memory().recent("session-a", 10).len(), 4);
    assert!(state.memory().recent("session-b", 10).is_empty());
}

#[tokio::test]
async fn generated_session_id_is_returned() {
    let state = default_state(CountingLlm::new());
    let response = ask(&state, QueryRequest::new("hello?")).await;
    assert!(Uuid::parse_str(&response.session_id).is_ok());
}

#[tokio::test]
async fn failed_chunk_embedding_skips_only_that_chunk() {
    let embedder = Arc::new(FlakyEmbedder {
        inner: HashEmbedder::new(DIMENSIONS),
        poison: "POISON",
    });
    let llm = CountingLlm::new();
    let state = test_state(test_config(), embedder, llm.clone());

    // Three ~695-char paragraphs: the chunker cuts the first at its paragraph
    // break, so the first chunk is exactly `para1` and stays POISON-free,
    // while the second chunk swallows the start of the poisoned paragraph.
    let para1 = "alpha ".repeat(116).trim().to_string();
    let para2 = format!("POISON {}", "beta ".repeat(138).trim());
    let para3 = "gamma ".repeat(116).trim().to_string();
    let text = format!("{}\n\n{}\n\n{}", para1, para2, para3);

    let outcome = state
        .pipeline()
        .ingest("mixed.txt", Some("text/plain"), text.as_bytes())
        .await
        .unwrap();

    let document = match outcome {
        IngestOutcome::Ingested {
            document,
            chunks_created,
            chunks_skipped,
        } => {
            assert!(chunks_created > 1);
            assert_eq!(chunks_skipped, 1);
            document
        }
        other => panic!("expected ingestion, got {:?}", other),
    };

    // The clean first chunk is still retrievable
    let response = ask(&state, QueryRequest::new(para1)).await;
    assert_eq!(response.sources.len(), 1);
    assert!(response.sources[0].similarity > 0.999);

    // The failed chunk is stored but excluded from the index
    let embedded = state.db().embedded_chunks(DIMENSIONS).unwrap();
    assert_eq!(embedded.len() as u32, document.total_chunks - 1);
    assert_eq!(state.index().len() as u32, document.total_chunks - 1);
}

#[tokio::test]
async fn all_chunks_failing_rejects_the_document() {
    let embedder = Arc::new(FlakyEmbedder {
        inner: HashEmbedder::new(DIMENSIONS),
        poison: "POISON",
    });
    let state = test_state(test_config(), embedder, CountingLlm::new());

    let err = state
        .pipeline()
        .ingest("bad.txt", Some("text/plain"), b"POISON everywhere")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Embedding(_)));
    assert!(state.db().list_documents().unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_content_is_skipped() {
    let state = default_state(CountingLlm::new());
    let data = b"identical content in two files";

    state
        .pipeline()
        .ingest("one.txt", Some("text/plain"), data)
        .await
        .unwrap();
    let outcome = state
        .pipeline()
        .ingest("two.txt", Some("text/plain"), data)
        .await
        .unwrap();

    match outcome {
        IngestOutcome::Duplicate { existing } => assert_eq!(existing.filename, "one.txt"),
        other => panic!("expected duplicate, got {:?}", other),
    }
    assert_eq!(state.db().list_documents().unwrap().len(), 1);
}

#[tokio::test]
async fn unsupported_upload_is_rejected() {
    let state = default_state(CountingLlm::new());
    let err = state
        .pipeline()
        .ingest("archive.zip", Some("application/zip"), b"PK\x03\x04")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedContent(_)));
}

#[tokio::test]
async fn delete_document_removes_chunks_and_index_entries() {
    let llm = CountingLlm::new();
    let state = default_state(llm.clone());

    let text = "searchable content that will be deleted";
    let outcome = state
        .pipeline()
        .ingest("gone.txt", Some("text/plain"), text.as_bytes())
        .await
        .unwrap();
    let document = match outcome {
        IngestOutcome::Ingested { document, .. } => document,
        other => panic!("expected ingestion, got {:?}", other),
    };

    let deleted = documents::delete_document(State(state.clone()), Path(document.id))
        .await
        .unwrap()
        .0;
    assert_eq!(deleted.document_id, document.id);
    assert_eq!(deleted.chunks_deleted, 1);
    assert!(state.index().is_empty());

    // Further lookups and deletes are NotFound
    let err = documents::get_document(State(state.clone()), Path(document.id))
        .await
        .err()
        .unwrap();
    assert!(matches!(err, Error::NotFound(_)));
    let err = documents::delete_document(State(state.clone()), Path(document.id))
        .await
        .err()
        .unwrap();
    assert!(matches!(err, Error::NotFound(_)));

    // The store is empty again: canned answer, no model call
    let calls_before = llm.call_count();
    let response = ask(&state, QueryRequest::new(text)).await;
    assert!(response.sources.is_empty());
    assert_eq!(llm.call_count(), calls_before);
}
