//! Prompt construction for grounded answering

use crate::memory::ConversationTurn;
use crate::providers::{ChatMessage, ChatRole};
use crate::types::query::Role;

/// Builds the message list sent to the LLM
pub struct PromptBuilder;

impl PromptBuilder {
    /// System instruction embedding the assembled context.
    ///
    /// The model must answer only from the context, decline when the context
    /// is insufficient, and attribute facts to the `[From: name]` document
    /// tags when several documents contribute.
    pub fn system_prompt(context: &str) -> String {
        format!(
            r#"You are a helpful assistant that answers questions using only the provided context.

Rules:
- Answer questions based ONLY on the context below
- If the context does not contain the answer, say "I don't have information about that in my knowledge base"
- Be concise and direct
- When information comes from different documents (indicated by [From: name]), attribute each statement to its source document by name

Context:
{context}"#
        )
    }

    /// Assemble system + windowed history + current query.
    ///
    /// Only the last `history_window` turns are included, in chronological
    /// order, followed by the query as the final user message.
    pub fn build_messages(
        query: &str,
        context: &str,
        history: &[ConversationTurn],
        history_window: usize,
    ) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(history.len().min(history_window) + 2);
        messages.push(ChatMessage::system(Self::system_prompt(context)));

        let skip = history.len().saturating_sub(history_window);
        for turn in &history[skip..] {
            let role = match turn.role {
                Role::User => ChatRole::User,
                Role::Assistant => ChatRole::Assistant,
            };
            messages.push(ChatMessage {
                role,
                content: turn.content.clone(),
            });
        }

        messages.push(ChatMessage::user(query));
        messages
    }
}
