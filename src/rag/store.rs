//! In-memory vector index over document chunks

use std::sync::Arc;

use super::embedder::Embed;
use crate::documents::Segment;
use crate::{Error, Result};

/// Chunks paired with their embeddings, searched by cosine similarity
pub struct VectorStore {
    embedder: Arc<dyn Embed>,
    entries: Vec<(Segment, Vec<f32>)>,
}

impl VectorStore {
    /// Embed `segments` in one batch and index them
    ///
    /// # Errors
    ///
    /// Returns error if embedding fails or the embedder returns a different
    /// number of vectors than there are segments
    pub async fn from_segments(segments: Vec<Segment>, embedder: Arc<dyn Embed>) -> Result<Self> {
        let texts: Vec<String> = segments.iter().map(|s| s.page_content.clone()).collect();
        let embeddings = embedder.embed_batch(&texts).await?;

        if embeddings.len() != segments.len() {
            return Err(Error::Embedding(format!(
                "expected {} embeddings, got {}",
                segments.len(),
                embeddings.len()
            )));
        }

        tracing::info!(chunks = segments.len(), "indexed document chunks");

        Ok(Self {
            embedder,
            entries: segments.into_iter().zip(embeddings).collect(),
        })
    }

    /// Number of indexed chunks
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Return the `k` chunks most similar to `query`, best first
    ///
    /// # Errors
    ///
    /// Returns error if embedding the query fails
    pub async fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<Segment>> {
        if self.entries.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed(query).await?;

        let mut scored: Vec<(&Segment, f32)> = self
            .entries
            .iter()
            .map(|(segment, embedding)| (segment, cosine_similarity(embedding, &query_embedding)))
            .collect();

        // Stable sort keeps insertion order among equal scores
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        tracing::debug!(
            k,
            best = scored.first().map(|(_, s)| *s),
            "similarity search"
        );

        Ok(scored
            .into_iter()
            .take(k)
            .map(|(segment, _)| segment.clone())
            .collect())
    }
}

impl std::fmt::Debug for VectorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorStore")
            .field("entries", &self.entries.len())
            .finish_non_exhaustive()
    }
}

/// Cosine similarity of two vectors; 0.0 for mismatched or zero vectors
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let mut dot = 0.0_f32;
    let mut norm_a = 0.0_f32;
    let mut norm_b = 0.0_f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 {
        return 0.0;
    }

    dot / denom
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;

    /// Returns one vector fewer than requested
    struct ShortEmbedder;

    #[async_trait]
    impl Embed for ShortEmbedder {
        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts.iter().skip(1).map(|_| vec![1.0, 0.0]).collect())
        }
    }

    #[tokio::test]
    async fn test_embedding_count_mismatch_is_an_error() {
        let segments = vec![
            Segment::new("first chunk", "doc.pdf"),
            Segment::new("second chunk", "doc.pdf"),
        ];

        let result = VectorStore::from_segments(segments, Arc::new(ShortEmbedder)).await;

        match result {
            Err(Error::Embedding(message)) => assert!(message.contains("expected 2")),
            other => panic!("expected embedding error, got {other:?}"),
        }
    }

    #[test]
    fn test_cosine_similarity_identical() {
        let sim = cosine_similarity(&[1.0, 0.0, 0.0], &[1.0, 0.0, 0.0]);
        assert!((sim - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_cosine_similarity_orthogonal() {
        let sim = cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]);
        assert!(sim.abs() < f32::EPSILON);
    }

    #[test]
    fn test_cosine_similarity_mismatched() {
        assert!(cosine_similarity(&[1.0], &[1.0, 0.0]).abs() < f32::EPSILON);
        assert!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]).abs() < f32::EPSILON);
    }
}
