//! Answer generation: context assembly, prompting, and the LLM boundary

pub mod context;
pub mod prompt;

pub use context::{assemble, AssembledContext};
pub use prompt::PromptBuilder;

use std::sync::Arc;

use crate::memory::ConversationTurn;
use crate::providers::LlmProvider;

/// Fixed answer returned when the LLM call fails.
///
/// Generation failure is absorbed here by design: the request still succeeds
/// with this text (and whatever sources were retrieved) instead of surfacing
/// a raw error to the user. The failure is logged with the query for
/// operators.
pub const FALLBACK_ANSWER: &str =
    "I'm having trouble generating a response right now. Please try again.";

/// Composes the prompt and performs the single completion call
pub struct ResponseGenerator {
    llm: Arc<dyn LlmProvider>,
    history_window: usize,
}

impl ResponseGenerator {
    /// Create a generator over the configured LLM provider
    pub fn new(llm: Arc<dyn LlmProvider>, history_window: usize) -> Self {
        Self {
            llm,
            history_window,
        }
    }

    /// Generate an answer grounded in the assembled context.
    ///
    /// Never fails: any provider error becomes [`FALLBACK_ANSWER`].
    pub async fn respond(
        &self,
        query: &str,
        assembled: &AssembledContext,
        history: &[ConversationTurn],
    ) -> String {
        let messages =
            PromptBuilder::build_messages(query, &assembled.context, history, self.history_window);

        match self.llm.generate(&messages).await {
            Ok(answer) => answer,
            Err(e) => {
                tracing::error!(
                    query,
                    model = self.llm.model(),
                    error = %e,
                    "generation failed, returning fallback answer"
                );
                FALLBACK_ANSWER.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    use crate::error::{Error, Result};
    use crate::providers::ChatMessage;
    use crate::retrieval::ScoredChunk;
    use crate::types::query::Role;
    use chrono::Utc;
    use uuid::Uuid;

    /// Records the messages it was called with; answers or fails on demand
    struct ScriptedLlm {
        fail: bool,
        seen: Mutex<Vec<Vec<ChatMessage>>>,
    }

    impl ScriptedLlm {
        fn new(fail: bool) -> Self {
            Self {
                fail,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedLlm {
        async fn generate(&self, messages: &[ChatMessage]) -> Result<String> {
            self.seen.lock().push(messages.to_vec());
            if self.fail {
                Err(Error::Generation("model unavailable".into()))
            } else {
                Ok("a grounded answer".to_string())
            }
        }

        fn name(&self) -> &str {
            "scripted"
        }

        fn model(&self) -> &str {
            "scripted-1"
        }
    }

    fn assembled() -> AssembledContext {
        assemble(
            &[ScoredChunk {
                chunk_id: Uuid::new_v4(),
                document_id: Uuid::new_v4(),
                document_name: "doc.txt".to_string(),
                content: "the answer is 42".to_string(),
                similarity: 0.9,
            }],
            3,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn successful_generation_returns_model_answer() {
        let llm = Arc::new(ScriptedLlm::new(false));
        let generator = ResponseGenerator::new(llm.clone(), 5);

        let answer = generator.respond("what is the answer?", &assembled(), &[]).await;
        assert_eq!(answer, "a grounded answer");

        let seen = llm.seen.lock();
        assert!(seen[0][0].content.contains("the answer is 42"));
    }

    #[tokio::test]
    async fn failure_becomes_fallback_answer() {
        let llm = Arc::new(ScriptedLlm::new(true));
        let generator = ResponseGenerator::new(llm, 5);

        let answer = generator.respond("anything", &assembled(), &[]).await;
        assert_eq!(answer, FALLBACK_ANSWER);
    }

    #[tokio::test]
    async fn prompt_includes_only_windowed_history() {
        let llm = Arc::new(ScriptedLlm::new(false));
        let generator = ResponseGenerator::new(llm.clone(), 5);

        let history: Vec<ConversationTurn> = (0..7)
            .map(|i| ConversationTurn {
                role: if i % 2 == 0 { Role::User } else { Role::Assistant },
                content: format!("turn {}", i),
                at: Utc::now(),
            })
            .collect();

        generator.respond("next question", &assembled(), &history).await;

        let seen = llm.seen.lock();
        let messages = &seen[0];
        assert_eq!(messages.len(), 7); // system + 5 turns + query
        assert!(messages.iter().all(|m| m.content != "turn 0"));
        assert!(messages.iter().all(|m| m.content != "turn 1"));
        assert!(messages.iter().any(|m| m.content == "turn 6"));
    }
}
