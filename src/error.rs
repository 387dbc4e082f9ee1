//! Error types for docqa

use thiserror::Error;

/// Result type alias for docqa operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while ingesting documents or answering questions
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error (temporary files, stdin, config files)
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Upload has an extension we have no loader for
    #[error("unsupported document format: {0}")]
    UnsupportedFormat(String),

    /// PDF parser failure
    #[error("pdf error: {0}")]
    Pdf(String),

    /// DOCX parser failure
    #[error("docx error: {0}")]
    Docx(String),

    /// Document produced no indexable text
    #[error("document contains no extractable text")]
    EmptyDocument,

    /// Question was blank after trimming
    #[error("question is empty")]
    EmptyQuestion,

    /// Embedding error
    #[error("embedding error: {0}")]
    Embedding(String),

    /// Chat model error
    #[error("llm error: {0}")]
    Llm(String),

    /// Text-to-speech error
    #[error("TTS error: {0}")]
    Tts(String),

    /// Audio error
    #[error("audio error: {0}")]
    Audio(String),
}
