//! Text chunking with boundary-aware cuts

/// Text chunker with configurable size and overlap
///
/// Scans the text in windows of `chunk_size` characters. Before cutting, it
/// looks
/// backward for a paragraph break past the window's midpoint, then for a
/// sentence terminator, and finally falls back to a hard cut at exactly
/// `chunk_size`, which guarantees forward progress even in text with no
/// natural boundaries. The next window starts `overlap` before the cut, so
/// consecutive chunks share context. Identical input always produces
/// identical boundaries.
pub struct TextChunker {
    /// Target chunk size in characters
    chunk_size: usize,
    /// Overlap between consecutive chunks
    overlap: usize,
}

/// Sentence terminators searched after paragraph breaks
const SENTENCE_BREAKS: &[&str] = &[". ", "! ", "? ", "\n"];

impl TextChunker {
    /// Create a new chunker. Callers validate `overlap < chunk_size / 2`
    /// (see `ChunkingConfig`); that bound keeps every window moving forward.
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        Self {
            chunk_size,
            overlap,
        }
    }

    /// Split text into overlapping chunks, dropping whitespace-only pieces
    pub fn chunk(&self, text: &str) -> Vec<String> {
        if text.len() <= self.chunk_size {
            let trimmed = text.trim();
            return if trimmed.is_empty() {
                Vec::new()
            } else {
                vec![trimmed.to_string()]
            };
        }

        let mut chunks = Vec::new();
        let mut start = 0usize;

        while start < text.len() {
            let end = self.pick_cut(text, start);
            let slice_end = floor_char_boundary(text, end.min(text.len()));

            let chunk = text[start..slice_end].trim();
            if !chunk.is_empty() {
                chunks.push(chunk.to_string());
            }

            // The next window backs up by the overlap from the chosen cut,
            // even when the cut ran past the end of the text
            start = floor_char_boundary(text, end - self.overlap);
        }

        chunks
    }

    /// Choose where the chunk starting at `start` ends.
    ///
    /// A boundary only wins if it lies past the window midpoint; otherwise the
    /// hard cut at `start + chunk_size` applies.
    fn pick_cut(&self, text: &str, start: usize) -> usize {
        let hard_end = start + self.chunk_size;
        if hard_end >= text.len() {
            return hard_end;
        }

        let window_end = floor_char_boundary(text, hard_end);
        let window = &text[start..window_end];
        let midpoint = start + self.chunk_size / 2;

        if let Some(pos) = window.rfind("\n\n") {
            let cut = start + pos;
            if cut > midpoint {
                return cut + 2;
            }
        }

        for sep in SENTENCE_BREAKS {
            if let Some(pos) = window.rfind(sep) {
                let cut = start + pos;
                if cut > midpoint {
                    return cut + sep.len();
                }
            }
        }

        window_end
    }
}

/// Largest byte offset `<= at` that lands on a char boundary
fn floor_char_boundary(text: &str, at: usize) -> usize {
    let mut at = at.min(text.len());
    while at > 0 && !text.is_char_boundary(at) {
        at -= 1;
    }
    at
}
