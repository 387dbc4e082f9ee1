//! Document question-answering session
//!
//! Ties the pipeline together: extracted segments are chunked and indexed
//! once, then each question is translated, answered through the retrieval
//! chain, normalized, and translated back.

use std::sync::Arc;

use crate::answer::{FallbackMode, extract_answer_with};
use crate::chain::{DEFAULT_TOP_K, RetrievalQa};
use crate::documents::Segment;
use crate::llm::ChatModel;
use crate::rag::{Embed, TextSplitter, VectorStore};
use crate::translate::{self, Language};
use crate::{Error, Result};

/// Characters of document text shown in a preview
pub const PREVIEW_CHARS: usize = 1000;

/// Segments included in a preview
pub const PREVIEW_SEGMENTS: usize = 2;

/// Tunables for indexing and answering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssistantSettings {
    /// Chunking applied before indexing
    pub splitter: TextSplitter,
    /// Chunks retrieved per question
    pub top_k: usize,
    /// How the chain's output is reduced to an answer
    pub fallback: FallbackMode,
}

impl Default for AssistantSettings {
    fn default() -> Self {
        Self {
            splitter: TextSplitter::default(),
            top_k: DEFAULT_TOP_K,
            fallback: FallbackMode::default(),
        }
    }
}

/// Builds indexes and answers questions against them
#[derive(Clone)]
pub struct Assistant {
    llm: Arc<dyn ChatModel>,
    embedder: Arc<dyn Embed>,
    settings: AssistantSettings,
}

impl Assistant {
    /// Create an assistant
    #[must_use]
    pub fn new(
        llm: Arc<dyn ChatModel>,
        embedder: Arc<dyn Embed>,
        settings: AssistantSettings,
    ) -> Self {
        Self {
            llm,
            embedder,
            settings,
        }
    }

    /// Chunk and embed `segments`
    ///
    /// # Errors
    ///
    /// Returns `Error::EmptyDocument` if no text survives chunking, or the
    /// embedding error
    pub async fn index(&self, segments: &[Segment]) -> Result<IndexedDocument> {
        let chunks = self.settings.splitter.split_documents(segments);
        if chunks.is_empty() {
            return Err(Error::EmptyDocument);
        }

        tracing::info!(
            segments = segments.len(),
            chunks = chunks.len(),
            chunk_size = self.settings.splitter.chunk_size(),
            "split document"
        );

        let store = VectorStore::from_segments(chunks, Arc::clone(&self.embedder)).await?;

        Ok(IndexedDocument {
            chain: RetrievalQa::new(store, Arc::clone(&self.llm), self.settings.top_k),
            llm: Arc::clone(&self.llm),
            fallback: self.settings.fallback,
        })
    }
}

impl std::fmt::Debug for Assistant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Assistant")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

/// An indexed document ready for questions
pub struct IndexedDocument {
    chain: RetrievalQa,
    llm: Arc<dyn ChatModel>,
    fallback: FallbackMode,
}

impl IndexedDocument {
    /// Number of indexed chunks
    #[must_use]
    pub fn chunk_count(&self) -> usize {
        self.chain.store().len()
    }

    /// Answer `question` in `language`
    ///
    /// # Errors
    ///
    /// Returns `Error::EmptyQuestion` for a blank question, or any
    /// translation, retrieval, or model error
    pub async fn ask(&self, question: &str, language: Language) -> Result<String> {
        let question = question.trim();
        if question.is_empty() {
            return Err(Error::EmptyQuestion);
        }

        let query = translate::question_for_retrieval(self.llm.as_ref(), language, question).await?;
        tracing::info!(%language, %query, "answering question");

        let result = self.chain.invoke(&query).await?;
        let answer = extract_answer_with(&result, self.fallback);

        translate::answer_for_display(self.llm.as_ref(), language, &answer).await
    }
}

impl std::fmt::Debug for IndexedDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexedDocument")
            .field("chain", &self.chain)
            .field("fallback", &self.fallback)
            .finish_non_exhaustive()
    }
}

/// Preview text: the first segments joined by blank lines, truncated, with
/// a trailing ellipsis
#[must_use]
pub fn preview_text(segments: &[Segment]) -> String {
    let joined = segments
        .iter()
        .take(PREVIEW_SEGMENTS)
        .map(|s| s.page_content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    let mut preview: String = joined.chars().take(PREVIEW_CHARS).collect();
    preview.push_str("...");
    preview
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_first_two_segments() {
        let segments = vec![
            Segment::new("page one", "a.pdf"),
            Segment::new("page two", "a.pdf"),
            Segment::new("page three", "a.pdf"),
        ];
        assert_eq!(preview_text(&segments), "page one\n\npage two...");
    }

    #[test]
    fn test_preview_truncates() {
        let segments = vec![Segment::new("é".repeat(1500), "a.pdf")];
        let preview = preview_text(&segments);
        assert_eq!(preview.chars().count(), PREVIEW_CHARS + 3);
        assert!(preview.ends_with("..."));
    }

    #[test]
    fn test_preview_empty() {
        assert_eq!(preview_text(&[]), "...");
    }
}
