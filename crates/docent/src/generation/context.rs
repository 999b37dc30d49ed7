//! Context assembly from retrieved chunks

use crate::retrieval::ScoredChunk;
use crate::types::response::SourceRef;

/// Separator between chunks in the assembled context
const CHUNK_SEPARATOR: &str = "\n\n---\n\n";

/// Grounding context ready for the prompt, with its source attributions
#[derive(Debug, Clone)]
pub struct AssembledContext {
    /// Tagged chunks joined for the system prompt
    pub context: String,
    /// One source entry per chunk that made it into the context
    pub sources: Vec<SourceRef>,
}

/// Turn ranked chunks into an attributed context block.
///
/// Only the `max_chunks` highest-similarity chunks are used; each is tagged
/// with its document name so the model can attribute claims. Returns `None`
/// when nothing usable was retrieved, so callers can answer with a canned
/// response instead of calling the model on empty context.
pub fn assemble(ranked: &[ScoredChunk], max_chunks: usize) -> Option<AssembledContext> {
    if ranked.is_empty() || max_chunks == 0 {
        return None;
    }

    let used = &ranked[..ranked.len().min(max_chunks)];

    let context = used
        .iter()
        .map(|chunk| format!("[From: {}]\n{}", chunk.document_name, chunk.content))
        .collect::<Vec<_>>()
        .join(CHUNK_SEPARATOR);

    let sources = used
        .iter()
        .map(|chunk| SourceRef {
            document_id: chunk.document_id,
            document_name: chunk.document_name.clone(),
            content_preview: SourceRef::preview_of(&chunk.content),
            similarity: SourceRef::round_similarity(chunk.similarity),
        })
        .collect();

    Some(AssembledContext { context, sources })
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn chunk(name: &str, content: &str, similarity: f32) -> ScoredChunk {
        ScoredChunk {
            chunk_id: Uuid::new_v4(),
            document_id: Uuid::new_v4(),
            document_name: name.to_string(),
            content: content.to_string(),
            similarity,
        }
    }

    #[test]
    fn empty_input_yields_none() {
        assert!(assemble(&[], 3).is_none());
    }

    #[test]
    fn chunks_are_tagged_and_separated() {
        let ranked = vec![
            chunk("resume.pdf", "knows Rust", 0.9),
            chunk("notes.md", "likes coffee", 0.5),
        ];
        let assembled = assemble(&ranked, 3).unwrap();
        assert!(assembled.context.starts_with("[From: resume.pdf]\nknows Rust"));
        assert!(assembled.context.contains("\n\n---\n\n[From: notes.md]\nlikes coffee"));
        assert_eq!(assembled.sources.len(), 2);
    }

    #[test]
    fn restricted_to_top_three() {
        let ranked = vec![
            chunk("a", "one", 0.9),
            chunk("b", "two", 0.8),
            chunk("c", "three", 0.7),
            chunk("d", "four", 0.6),
        ];
        let assembled = assemble(&ranked, 3).unwrap();
        assert_eq!(assembled.sources.len(), 3);
        assert!(!assembled.context.contains("four"));
    }

    #[test]
    fn sources_carry_preview_and_rounded_similarity() {
        let long = "z".repeat(250);
        let ranked = vec![chunk("big.txt", &long, 0.85061)];
        let assembled = assemble(&ranked, 3).unwrap();

        let source = &assembled.sources[0];
        assert_eq!(source.document_name, "big.txt");
        assert!(source.content_preview.ends_with("..."));
        assert_eq!(source.content_preview.chars().count(), 203);
        assert_eq!(source.similarity, 0.851);
        // The full content still reaches the prompt
        assert!(assembled.context.contains(&long));
    }
}
