//! docqa - Voice-enabled question answering over PDF and Word documents
//!
//! This library provides:
//! - Document extraction from uploaded PDF/DOCX bytes
//! - Chunking, embedding, and in-memory retrieval
//! - Retrieval question answering through an Ollama chat model
//! - Answer normalization and English/Kannada translation
//! - Interruptible text-to-speech output
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                       CLI                             │
//! │      preview  │  ask  │  say  │  stop (Enter)         │
//! └───────────────────────┬──────────────────────────────┘
//!                         │
//! ┌───────────────────────▼──────────────────────────────┐
//! │                    Assistant                          │
//! │  documents │ rag │ chain │ answer │ translate │ voice │
//! └───────────────────────┬──────────────────────────────┘
//!                         │
//! ┌───────────────────────▼──────────────────────────────┐
//! │        Ollama (chat, embeddings)  │  TTS API          │
//! └──────────────────────────────────────────────────────┘
//! ```

pub mod answer;
pub mod assistant;
pub mod chain;
pub mod config;
pub mod documents;
pub mod error;
pub mod llm;
pub mod rag;
pub mod translate;
pub mod voice;

pub use answer::{FallbackMode, ResultValue, extract_answer, extract_answer_with};
pub use assistant::{Assistant, AssistantSettings, IndexedDocument, preview_text};
pub use chain::RetrievalQa;
pub use config::Config;
pub use documents::{
    DocumentLoader, DocxLoader, Format, PdfLoader, Segment, SegmentMetadata, extract_text,
    extract_text_from_docx, extract_text_from_pdf, extract_text_with,
};
pub use error::{Error, Result};
pub use llm::{ChatModel, OllamaChat};
pub use rag::{Embed, OllamaEmbedder, TextSplitter, VectorStore};
pub use translate::Language;
pub use voice::{AudioSink, SpeakOutcome, SpeechControl, Speaker, Synthesizer, TextToSpeech};
