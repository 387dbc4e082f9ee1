//! Ollama chat client

use async_trait::async_trait;

use super::ChatModel;
use crate::{Error, Result};

/// Default Ollama server
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Default chat model
pub const DEFAULT_CHAT_MODEL: &str = "llama3.1";

/// Chat model served by a local Ollama instance
#[derive(Debug, Clone)]
pub struct OllamaChat {
    client: reqwest::Client,
    base_url: String,
    model: String,
    temperature: f32,
}

impl OllamaChat {
    /// Create a client for `model` on the server at `base_url`
    #[must_use]
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            temperature: 0.0,
        }
    }

    /// Set the sampling temperature
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Model identifier
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ChatModel for OllamaChat {
    async fn invoke(&self, prompt: &str) -> Result<String> {
        #[derive(serde::Serialize)]
        struct ChatRequest<'a> {
            model: &'a str,
            messages: [Message<'a>; 1],
            stream: bool,
            options: Options,
        }

        #[derive(serde::Serialize)]
        struct Message<'a> {
            role: &'a str,
            content: &'a str,
        }

        #[derive(serde::Serialize)]
        struct Options {
            temperature: f32,
        }

        #[derive(serde::Deserialize)]
        struct ChatResponse {
            message: ResponseMessage,
        }

        #[derive(serde::Deserialize)]
        struct ResponseMessage {
            content: String,
        }

        let request = ChatRequest {
            model: &self.model,
            messages: [Message {
                role: "user",
                content: prompt,
            }],
            stream: false,
            options: Options {
                temperature: self.temperature,
            },
        };

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Llm(format!("Ollama request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Llm(format!("Ollama chat error {status}: {body}")));
        }

        let reply: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::Llm(format!("Ollama parse error: {e}")))?;

        tracing::debug!(
            model = %self.model,
            prompt_chars = prompt.len(),
            reply_chars = reply.message.content.len(),
            "chat completion"
        );

        Ok(reply.message.content)
    }
}
