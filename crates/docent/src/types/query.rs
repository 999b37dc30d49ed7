//! Query request types

use serde::{Deserialize, Serialize};

/// Speaker of a conversation turn
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A prior conversation turn supplied inline with a query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnPayload {
    pub role: Role,
    pub content: String,
}

/// Query request for the RAG pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    /// The question to answer
    pub message: String,

    /// Session identifier; generated server-side when absent
    #[serde(default)]
    pub session_id: Option<String>,

    /// Inline history; overrides stored session memory for this request
    #[serde(default)]
    pub history: Option<Vec<TurnPayload>>,

    /// Number of chunks to retrieve (overrides config)
    #[serde(default)]
    pub top_k: Option<usize>,

    /// Minimum similarity threshold (overrides config)
    #[serde(default)]
    pub similarity_threshold: Option<f32>,
}

impl QueryRequest {
    /// Create a query with defaults
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            session_id: None,
            history: None,
            top_k: None,
            similarity_threshold: None,
        }
    }
}
