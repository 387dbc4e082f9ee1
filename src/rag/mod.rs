//! Retrieval over uploaded documents
//!
//! Segments are split into overlapping chunks, embedded, and kept in an
//! in-memory index for the lifetime of a question-answering session.

mod embedder;
mod splitter;
mod store;

pub use embedder::{DEFAULT_EMBED_MODEL, Embed, OllamaEmbedder};
pub use splitter::{DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE, TextSplitter};
pub use store::{VectorStore, cosine_similarity};
