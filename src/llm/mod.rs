//! Chat model access

mod ollama;

use async_trait::async_trait;

pub use ollama::{DEFAULT_CHAT_MODEL, DEFAULT_OLLAMA_URL, OllamaChat};

use crate::Result;

/// A model that answers a single prompt
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Send `prompt` as one user message and return the reply text
    ///
    /// # Errors
    ///
    /// Returns error if the model call fails
    async fn invoke(&self, prompt: &str) -> Result<String>;
}
