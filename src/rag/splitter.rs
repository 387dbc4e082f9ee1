//! Recursive character text splitting
//!
//! Text is cut on the coarsest separator that occurs in it (paragraphs, then
//! lines, then words, then characters). Pieces are merged back greedily up to
//! the chunk size, and each new chunk starts with up to `chunk_overlap`
//! characters of trailing context from the previous one. Pieces that are
//! still too large are split again with the next separator.

use std::collections::VecDeque;

use crate::documents::Segment;
use crate::{Error, Result};

/// Default chunk size in characters
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// Default overlap between consecutive chunks in characters
pub const DEFAULT_CHUNK_OVERLAP: usize = 100;

/// Separators tried in order, coarsest first
const SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

/// Splits text into overlapping chunks of bounded size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl Default for TextSplitter {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

impl TextSplitter {
    /// Create a splitter
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if `chunk_size` is zero or not larger than
    /// `chunk_overlap`
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::Config("chunk size must be positive".to_string()));
        }
        if chunk_overlap >= chunk_size {
            return Err(Error::Config(format!(
                "chunk overlap ({chunk_overlap}) must be smaller than chunk size ({chunk_size})"
            )));
        }

        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    /// Maximum chunk length in characters
    #[must_use]
    pub const fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Overlap between consecutive chunks in characters
    #[must_use]
    pub const fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Split `text` into trimmed, non-empty chunks
    #[must_use]
    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, &SEPARATORS)
    }

    /// Split every segment, copying its metadata onto each chunk
    #[must_use]
    pub fn split_documents(&self, segments: &[Segment]) -> Vec<Segment> {
        segments
            .iter()
            .flat_map(|segment| {
                self.split_text(&segment.page_content)
                    .into_iter()
                    .map(|chunk| Segment {
                        page_content: chunk,
                        metadata: segment.metadata.clone(),
                    })
            })
            .collect()
    }

    fn split_recursive(&self, text: &str, separators: &[&str]) -> Vec<String> {
        // Pick the first separator present in the text; "" always matches
        let position = separators
            .iter()
            .position(|sep| sep.is_empty() || text.contains(sep))
            .unwrap_or(separators.len().saturating_sub(1));
        let separator = separators.get(position).copied().unwrap_or("");
        let finer = separators.get(position + 1..).unwrap_or(&[]);

        let pieces: Vec<&str> = if separator.is_empty() {
            text.char_indices()
                .map(|(i, c)| &text[i..i + c.len_utf8()])
                .collect()
        } else {
            text.split(separator).filter(|p| !p.is_empty()).collect()
        };

        let mut chunks = Vec::new();
        let mut pending: Vec<&str> = Vec::new();

        for piece in pieces {
            if char_len(piece) < self.chunk_size {
                pending.push(piece);
                continue;
            }

            if !pending.is_empty() {
                chunks.extend(self.merge(&pending, separator));
                pending.clear();
            }

            if finer.is_empty() {
                let trimmed = piece.trim();
                if !trimmed.is_empty() {
                    chunks.push(trimmed.to_string());
                }
            } else {
                chunks.extend(self.split_recursive(piece, finer));
            }
        }

        if !pending.is_empty() {
            chunks.extend(self.merge(&pending, separator));
        }

        chunks
    }

    /// Greedily join small pieces into chunks, carrying overlap forward
    fn merge(&self, pieces: &[&str], separator: &str) -> Vec<String> {
        let sep_len = char_len(separator);
        let mut chunks = Vec::new();
        let mut window: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for &piece in pieces {
            let len = char_len(piece);
            let joint = if window.is_empty() { 0 } else { sep_len };

            if total + len + joint > self.chunk_size && !window.is_empty() {
                push_joined(&mut chunks, &window, separator);

                // Shrink to the overlap, and until the next piece fits
                loop {
                    let joint = if window.is_empty() { 0 } else { sep_len };
                    let oversized = total > 0 && total + len + joint > self.chunk_size;
                    if total <= self.chunk_overlap && !oversized {
                        break;
                    }
                    let Some(front) = window.pop_front() else {
                        break;
                    };
                    let joint = if window.is_empty() { 0 } else { sep_len };
                    total -= char_len(front) + joint;
                }
            }

            let joint = if window.is_empty() { 0 } else { sep_len };
            window.push_back(piece);
            total += len + joint;
        }

        push_joined(&mut chunks, &window, separator);
        chunks
    }
}

fn push_joined(chunks: &mut Vec<String>, window: &VecDeque<&str>, separator: &str) {
    let joined = window.iter().copied().collect::<Vec<_>>().join(separator);
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_one_chunk() {
        let splitter = TextSplitter::default();
        assert_eq!(splitter.split_text("hello world"), vec!["hello world"]);
    }

    #[test]
    fn test_empty_text() {
        let splitter = TextSplitter::default();
        assert!(splitter.split_text("").is_empty());
        assert!(splitter.split_text("  \n\n  ").is_empty());
    }

    #[test]
    fn test_repeated_sentence_splits() {
        let splitter = TextSplitter::new(100, 10).unwrap();
        let text = "This is a test document. ".repeat(20);
        let chunks = splitter.split_text(&text);

        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.chars().count() <= 100));
    }

    #[test]
    fn test_chunks_overlap() {
        let splitter = TextSplitter::new(20, 8).unwrap();
        let chunks = splitter.split_text("one two three four five six seven eight nine ten");

        assert!(chunks.len() > 1);
        for pair in chunks.windows(2) {
            let last_word = pair[0].split(' ').next_back().unwrap();
            assert!(
                pair[1].starts_with(last_word),
                "{:?} should start with {last_word:?}",
                pair[1]
            );
        }
    }

    #[test]
    fn test_prefers_paragraph_boundaries() {
        let splitter = TextSplitter::new(30, 0).unwrap();
        let text = "First paragraph here.\n\nSecond paragraph here.";
        assert_eq!(
            splitter.split_text(text),
            vec!["First paragraph here.", "Second paragraph here."]
        );
    }

    #[test]
    fn test_long_word_falls_back_to_characters() {
        let splitter = TextSplitter::new(10, 0).unwrap();
        let chunks = splitter.split_text(&"x".repeat(25));
        assert_eq!(chunks, vec!["xxxxxxxxxx", "xxxxxxxxxx", "xxxxx"]);
    }

    #[test]
    fn test_multibyte_text() {
        let splitter = TextSplitter::new(5, 0).unwrap();
        let chunks = splitter.split_text("ಕನ್ನಡ ಭಾಷೆ");
        assert!(!chunks.is_empty());
        assert!(chunks.iter().all(|c| c.chars().count() <= 5));
    }

    #[test]
    fn test_invalid_settings() {
        assert!(TextSplitter::new(0, 0).is_err());
        assert!(TextSplitter::new(100, 100).is_err());
        assert!(TextSplitter::new(100, 150).is_err());
    }

    #[test]
    fn test_split_documents_keeps_metadata() {
        let splitter = TextSplitter::new(20, 0).unwrap();
        let segments = vec![
            Segment::new("alpha beta gamma delta epsilon zeta", "a.pdf").with_page(1),
            Segment::new("short", "a.pdf").with_page(2),
        ];

        let chunks = splitter.split_documents(&segments);
        assert!(chunks.len() >= 3);
        assert_eq!(chunks.last().unwrap().page_content, "short");
        assert_eq!(chunks.last().unwrap().metadata.page, Some(2));
        assert!(chunks[..chunks.len() - 1]
            .iter()
            .all(|c| c.metadata.page == Some(1)));
    }
}
