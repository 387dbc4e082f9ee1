//! Configuration management for docqa
//!
//! Values are resolved from defaults, then the TOML config file, then
//! environment variables.

mod file;

use std::str::FromStr;

pub use file::{
    ConfigFile, config_file_path, load_config_file, load_config_file_from, parse_config_file,
};

use crate::answer::FallbackMode;
use crate::assistant::AssistantSettings;
use crate::chain::DEFAULT_TOP_K;
use crate::llm::{DEFAULT_CHAT_MODEL, DEFAULT_OLLAMA_URL, OllamaChat};
use crate::rag::{
    DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE, DEFAULT_EMBED_MODEL, OllamaEmbedder, TextSplitter,
};
use crate::translate::Language;
use crate::voice::{DEFAULT_VOLUME, TextToSpeech, TtsProvider};
use crate::{Error, Result};

/// docqa configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Ollama server and models
    pub ollama: OllamaConfig,

    /// Chunking and retrieval
    pub retrieval: RetrievalConfig,

    /// Default interaction language
    pub language: Language,

    /// How chain output is reduced to an answer
    pub answer_fallback: FallbackMode,

    /// Speech output
    pub voice: VoiceConfig,

    /// API keys
    pub api_keys: ApiKeys,
}

/// Ollama configuration
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    /// Server URL
    pub url: String,

    /// Chat model for answers and translation
    pub chat_model: String,

    /// Embedding model for retrieval
    pub embed_model: String,

    /// Sampling temperature
    pub temperature: f32,
}

/// Chunking and retrieval configuration
#[derive(Debug, Clone, Copy)]
pub struct RetrievalConfig {
    /// Chunk size in characters
    pub chunk_size: usize,

    /// Overlap between chunks in characters
    pub chunk_overlap: usize,

    /// Chunks placed in each prompt
    pub top_k: usize,
}

/// Speech output configuration
#[derive(Debug, Clone)]
pub struct VoiceConfig {
    /// TTS backend
    pub provider: TtsProvider,

    /// TTS model
    pub tts_model: String,

    /// Voice identifier
    pub tts_voice: String,

    /// Speed multiplier (`OpenAI` only, 0.25 to 4.0)
    pub tts_speed: f32,

    /// Output gain (0.0 to 1.0)
    pub volume: f32,
}

/// API keys for external services
#[derive(Clone, Default)]
pub struct ApiKeys {
    /// `OpenAI` API key (TTS)
    pub openai: Option<String>,

    /// `ElevenLabs` API key (TTS)
    pub elevenlabs: Option<String>,
}

impl std::fmt::Debug for ApiKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeys")
            .field("openai", &self.openai.as_ref().map(|_| "<redacted>"))
            .field("elevenlabs", &self.elevenlabs.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Config {
    /// Load configuration from the config file and process environment
    ///
    /// # Errors
    ///
    /// Returns error if a configured value is invalid
    pub fn load() -> Result<Self> {
        Self::resolve(load_config_file(), |key| std::env::var(key).ok())
    }

    /// Resolve configuration from a parsed file and an environment lookup
    ///
    /// Environment values take precedence over the file.
    ///
    /// # Errors
    ///
    /// Returns error if a value fails to parse or is out of range
    pub fn resolve<F>(fc: ConfigFile, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let ollama = OllamaConfig {
            url: env("DOCQA_OLLAMA_URL")
                .or(fc.ollama.url)
                .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string()),
            chat_model: env("DOCQA_CHAT_MODEL")
                .or(fc.ollama.chat_model)
                .unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string()),
            embed_model: env("DOCQA_EMBED_MODEL")
                .or(fc.ollama.embed_model)
                .unwrap_or_else(|| DEFAULT_EMBED_MODEL.to_string()),
            temperature: parse_env(&env, "DOCQA_TEMPERATURE")?
                .or(fc.ollama.temperature)
                .unwrap_or(0.0),
        };

        let retrieval = RetrievalConfig {
            chunk_size: parse_env(&env, "DOCQA_CHUNK_SIZE")?
                .or(fc.retrieval.chunk_size)
                .unwrap_or(DEFAULT_CHUNK_SIZE),
            chunk_overlap: parse_env(&env, "DOCQA_CHUNK_OVERLAP")?
                .or(fc.retrieval.chunk_overlap)
                .unwrap_or(DEFAULT_CHUNK_OVERLAP),
            top_k: parse_env(&env, "DOCQA_TOP_K")?
                .or(fc.retrieval.top_k)
                .unwrap_or(DEFAULT_TOP_K),
        };

        if retrieval.top_k == 0 {
            return Err(Error::Config("top_k must be at least 1".to_string()));
        }
        // Validate chunking up front rather than on first upload
        TextSplitter::new(retrieval.chunk_size, retrieval.chunk_overlap)?;

        let language = match env("DOCQA_LANGUAGE").or(fc.language) {
            Some(s) => s.parse()?,
            None => Language::default(),
        };

        let answer_fallback = match env("DOCQA_ANSWER_FALLBACK").or(fc.answer_fallback) {
            Some(s) => s.parse()?,
            None => FallbackMode::default(),
        };

        let provider = match env("DOCQA_TTS_PROVIDER").or(fc.voice.provider) {
            Some(s) => s.parse()?,
            None => TtsProvider::OpenAI,
        };

        let (default_model, default_voice) = match provider {
            TtsProvider::OpenAI => ("tts-1", "alloy"),
            TtsProvider::ElevenLabs => ("eleven_multilingual_v2", "21m00Tcm4TlvDq8ikWAM"),
        };

        let voice = VoiceConfig {
            provider,
            tts_model: env("DOCQA_TTS_MODEL")
                .or(fc.voice.model)
                .unwrap_or_else(|| default_model.to_string()),
            tts_voice: env("DOCQA_TTS_VOICE")
                .or(fc.voice.voice)
                .unwrap_or_else(|| default_voice.to_string()),
            tts_speed: parse_env(&env, "DOCQA_TTS_SPEED")?
                .or(fc.voice.speed)
                .unwrap_or(1.0),
            volume: parse_env(&env, "DOCQA_TTS_VOLUME")?
                .or(fc.voice.volume)
                .unwrap_or(DEFAULT_VOLUME),
        };

        if !(0.25..=4.0).contains(&voice.tts_speed) {
            return Err(Error::Config(format!(
                "TTS speed must be between 0.25 and 4.0, got {}",
                voice.tts_speed
            )));
        }
        if !(0.0..=1.0).contains(&voice.volume) {
            return Err(Error::Config(format!(
                "TTS volume must be between 0.0 and 1.0, got {}",
                voice.volume
            )));
        }

        let api_keys = ApiKeys {
            openai: env("OPENAI_API_KEY").or(fc.api_keys.openai),
            elevenlabs: env("ELEVENLABS_API_KEY").or(fc.api_keys.elevenlabs),
        };

        Ok(Self {
            ollama,
            retrieval,
            language,
            answer_fallback,
            voice,
            api_keys,
        })
    }

    /// Indexing and answering settings
    ///
    /// # Errors
    ///
    /// Returns error if the chunking values are inconsistent
    pub fn assistant_settings(&self) -> Result<AssistantSettings> {
        Ok(AssistantSettings {
            splitter: TextSplitter::new(self.retrieval.chunk_size, self.retrieval.chunk_overlap)?,
            top_k: self.retrieval.top_k,
            fallback: self.answer_fallback,
        })
    }

    /// Chat client for the configured Ollama model
    #[must_use]
    pub fn chat_model(&self) -> OllamaChat {
        OllamaChat::new(&self.ollama.url, &self.ollama.chat_model)
            .with_temperature(self.ollama.temperature)
    }

    /// Embedder for the configured Ollama model
    #[must_use]
    pub fn embedder(&self) -> OllamaEmbedder {
        OllamaEmbedder::new(&self.ollama.url, &self.ollama.embed_model)
    }

    /// TTS client for the configured provider
    ///
    /// # Errors
    ///
    /// Returns error if the provider's API key is missing
    pub fn text_to_speech(&self) -> Result<TextToSpeech> {
        match self.voice.provider {
            TtsProvider::OpenAI => TextToSpeech::new_openai_with_model(
                self.api_keys.openai.clone().unwrap_or_default(),
                self.voice.tts_voice.clone(),
                self.voice.tts_speed,
                self.voice.tts_model.clone(),
            ),
            TtsProvider::ElevenLabs => TextToSpeech::new_elevenlabs_with_model(
                self.api_keys.elevenlabs.clone().unwrap_or_default(),
                self.voice.tts_voice.clone(),
                self.voice.tts_model.clone(),
            ),
        }
    }
}

/// Parse an optional environment value
fn parse_env<T, F>(env: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    env(key)
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|e| Error::Config(format!("invalid {key}={raw}: {e}")))
        })
        .transpose()
}
