//! Text extraction from uploaded files
//!
//! Extraction is the collaborator boundary: bytes in, plain text out. The
//! content type is classified up front (`ContentType::classify`) and each
//! variant extracts with its own strategy; `Unsupported` never reaches the
//! chunker.

use pulldown_cmark::{Event, Parser, TagEnd};
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};
use crate::types::ContentType;

/// Extracted text plus its hash
#[derive(Debug, Clone)]
pub struct ExtractedText {
    /// Plain text content
    pub content: String,
    /// SHA-256 of the content, hex encoded, for deduplication
    pub content_hash: String,
}

/// Extract plain text from an upload according to its classified type
pub fn extract_text(content_type: ContentType, filename: &str, data: &[u8]) -> Result<ExtractedText> {
    let content = match content_type {
        ContentType::Pdf => extract_pdf(data)?,
        ContentType::PlainText => decode_utf8(data)?,
        ContentType::Markdown => extract_markdown(&decode_utf8(data)?),
        ContentType::Unsupported => {
            return Err(Error::UnsupportedContent(format!(
                "'{}' is not a PDF, text, or markdown file",
                filename
            )));
        }
    };

    if content.trim().is_empty() {
        return Err(Error::Extraction(format!(
            "no text could be extracted from '{}'",
            filename
        )));
    }

    let content_hash = hex::encode(Sha256::digest(content.as_bytes()));
    Ok(ExtractedText {
        content,
        content_hash,
    })
}

fn extract_pdf(data: &[u8]) -> Result<String> {
    pdf_extract::extract_text_from_mem(data).map_err(|e| Error::Extraction(e.to_string()))
}

fn decode_utf8(data: &[u8]) -> Result<String> {
    String::from_utf8(data.to_vec())
        .map_err(|_| Error::Extraction("file is not valid UTF-8".to_string()))
}

/// Flatten markdown to its text content, keeping paragraph structure so the
/// chunker can still find boundaries.
fn extract_markdown(markdown: &str) -> String {
    let mut out = String::with_capacity(markdown.len());
    for event in Parser::new(markdown) {
        match event {
            Event::Text(text) | Event::Code(text) => out.push_str(&text),
            Event::SoftBreak => out.push(' '),
            Event::HardBreak => out.push('\n'),
            // Paragraph boundaries survive so the chunker can snap to them
            Event::End(TagEnd::Paragraph | TagEnd::Heading(_) | TagEnd::Item | TagEnd::CodeBlock) => {
                if !out.ends_with("\n\n") && !out.is_empty() {
                    out.push_str("\n\n");
                }
            }
            _ => {}
        }
    }
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_passes_through() {
        let extracted =
            extract_text(ContentType::PlainText, "notes.txt", b"hello world").unwrap();
        assert_eq!(extracted.content, "hello world");
        assert_eq!(extracted.content_hash.len(), 64);
    }

    #[test]
    fn markdown_is_flattened() {
        let md = b"# Title\n\nSome *emphasis* and `code`.\n\n- item one\n- item two\n";
        let extracted = extract_text(ContentType::Markdown, "doc.md", md).unwrap();
        assert!(extracted.content.contains("Title"));
        assert!(extracted.content.contains("emphasis"));
        assert!(extracted.content.contains("code"));
        assert!(!extracted.content.contains('#'));
        assert!(!extracted.content.contains('*'));
    }

    #[test]
    fn unsupported_type_is_rejected() {
        let err = extract_text(ContentType::Unsupported, "archive.zip", b"PK").unwrap_err();
        assert!(matches!(err, Error::UnsupportedContent(_)));
    }

    #[test]
    fn empty_extraction_is_rejected() {
        let err = extract_text(ContentType::PlainText, "blank.txt", b"   \n\t ").unwrap_err();
        assert!(matches!(err, Error::Extraction(_)));
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        let err = extract_text(ContentType::PlainText, "bad.txt", &[0xff, 0xfe, 0x00]).unwrap_err();
        assert!(matches!(err, Error::Extraction(_)));
    }

    #[test]
    fn identical_content_hashes_identically() {
        let a = extract_text(ContentType::PlainText, "a.txt", b"same bytes").unwrap();
        let b = extract_text(ContentType::PlainText, "b.txt", b"same bytes").unwrap();
        assert_eq!(a.content_hash, b.content_hash);
    }
}
