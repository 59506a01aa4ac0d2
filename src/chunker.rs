// file: src/chunker.rs
// description: fixed-size overlapping chunk production over cleaned document text
// reference: unit of extraction work, preserved for provenance through the pipeline

use crate::error::{PipelineError, Result};
use std::ops::Range;

/// A bounded character-range slice of a document's cleaned text.
///
/// `index` is 0-based and strictly increasing within a document. `label`
/// starts as the index and grows a split lineage suffix (`"3"` → `"3a"`,
/// `"3b"`) when the retry controller halves a failing chunk, so skipped
/// sub-chunks stay traceable in logs and output.
#[derive(Debug, Clone)]
pub struct Chunk {
    pub doc: String,
    pub index: usize,
    pub label: String,
    /// Byte span within the cleaned text this chunk was cut from.
    pub span: Range<usize>,
    pub text: String,
}

impl Chunk {
    /// Halve this chunk at its character midpoint for a split-retry.
    ///
    /// This is a repair action, not the primary chunking pass, so the
    /// halves carry no extra overlap. Returns None when the text cannot
    /// be split into two non-empty halves.
    pub fn split(&self) -> Option<(Chunk, Chunk)> {
        let mid = snap_to_char_boundary(&self.text, self.text.len() / 2);
        if mid == 0 || mid >= self.text.len() {
            return None;
        }

        let first = Chunk {
            doc: self.doc.clone(),
            index: self.index,
            label: format!("{}a", self.label),
            span: self.span.start..self.span.start + mid,
            text: self.text[..mid].to_string(),
        };
        let second = Chunk {
            doc: self.doc.clone(),
            index: self.index,
            label: format!("{}b", self.label),
            span: self.span.start + mid..self.span.end,
            text: self.text[mid..].to_string(),
        };
        Some((first, second))
    }
}

/// Split cleaned text into overlapping fixed-size windows.
///
/// Chunk i covers `[i*(chunk_size-overlap), min(len, start+chunk_size))`,
/// snapped forward to UTF-8 boundaries. The final chunk may be shorter than
/// `chunk_size`; adjacent chunks share `overlap` characters so a table row or
/// sentence split at a window edge still appears whole in one of them.
pub fn chunk_text(doc: &str, text: &str, chunk_size: usize, overlap: usize) -> Result<Vec<Chunk>> {
    if chunk_size == 0 {
        return Err(PipelineError::Config(
            "chunk_size must be greater than 0".to_string(),
        ));
    }
    if overlap >= chunk_size {
        return Err(PipelineError::Config(format!(
            "overlap ({}) must be smaller than chunk_size ({})",
            overlap, chunk_size
        )));
    }

    if text.is_empty() {
        return Ok(Vec::new());
    }

    let stride = chunk_size - overlap;
    let mut chunks = Vec::new();
    let mut index = 0;

    loop {
        let raw_start = index * stride;
        if raw_start >= text.len() {
            break;
        }
        let start = snap_to_char_boundary(text, raw_start);
        let end = snap_to_char_boundary(text, raw_start + chunk_size);

        chunks.push(Chunk {
            doc: doc.to_string(),
            index,
            label: index.to_string(),
            span: start..end,
            text: text[start..end].to_string(),
        });

        if end >= text.len() {
            break;
        }
        index += 1;
    }

    Ok(chunks)
}

/// Snap a byte offset forward to the nearest UTF-8 character boundary.
fn snap_to_char_boundary(text: &str, mut idx: usize) -> usize {
    if idx >= text.len() {
        return text.len();
    }
    while !text.is_char_boundary(idx) {
        idx += 1;
    }
    idx
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_short_text_yields_single_chunk() {
        let chunks = chunk_text("a.pdf", "short text", 6000, 500).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "short text");
        assert_eq!(chunks[0].span, 0..10);
        assert_eq!(chunks[0].label, "0");
    }

    #[test]
    fn test_two_chunk_split_with_overlap() {
        let text = "x".repeat(10_000);
        let chunks = chunk_text("sample.pdf", &text, 6000, 500).unwrap();

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].span, 0..6000);
        assert_eq!(chunks[1].span, 5500..10_000);
        assert_eq!(chunks[1].index, 1);
    }

    #[test]
    fn test_chunks_cover_text_with_no_gaps() {
        let text: String = ('a'..='z').cycle().take(25_357).collect();
        let chunks = chunk_text("doc", &text, 4000, 300).unwrap();

        assert_eq!(chunks[0].span.start, 0);
        assert_eq!(chunks.last().unwrap().span.end, text.len());
        for pair in chunks.windows(2) {
            // adjacent chunks must overlap, never leave a gap
            assert!(pair[1].span.start <= pair[0].span.end);
            assert!(pair[1].span.start > pair[0].span.start);
        }
        for chunk in &chunks {
            assert_eq!(chunk.text, &text[chunk.span.clone()]);
        }
    }

    #[test]
    fn test_multibyte_text_splits_on_char_boundaries() {
        let text = "高熵合金".repeat(2000); // 3 bytes per char
        let chunks = chunk_text("zh.pdf", &text, 5000, 400).unwrap();

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(text.is_char_boundary(chunk.span.start));
            assert!(text.is_char_boundary(chunk.span.end));
        }
        assert_eq!(chunks.last().unwrap().span.end, text.len());
    }

    #[test]
    fn test_invalid_geometry_is_config_error() {
        assert!(chunk_text("d", "text", 0, 0).is_err());
        assert!(chunk_text("d", "text", 100, 100).is_err());
        assert!(chunk_text("d", "text", 100, 150).is_err());
    }

    #[test]
    fn test_empty_text_yields_no_chunks() {
        assert!(chunk_text("d", "", 100, 10).unwrap().is_empty());
    }

    #[test]
    fn test_split_halves_preserve_span_and_label() {
        let chunks = chunk_text("a.pdf", &"y".repeat(4000), 6000, 500).unwrap();
        let (first, second) = chunks[0].split().unwrap();

        assert_eq!(first.label, "0a");
        assert_eq!(second.label, "0b");
        assert_eq!(first.index, 0);
        assert_eq!(first.span, 0..2000);
        assert_eq!(second.span, 2000..4000);
        assert_eq!(first.text.len() + second.text.len(), 4000);
    }

    #[test]
    fn test_split_of_tiny_chunk_is_none() {
        let chunks = chunk_text("a.pdf", "z", 100, 10).unwrap();
        assert!(chunks[0].split().is_none());
    }
}
