//! TOML configuration file loading
//!
//! Supports `~/.config/docqa/config.toml` as a persistent config source.
//! All fields are optional; the file is a partial overlay on top of defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::Result;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    /// Interaction language ("en" or "kn")
    #[serde(default)]
    pub language: Option<String>,

    /// Answer fallback mode ("truthiness" or "key-presence")
    #[serde(default)]
    pub answer_fallback: Option<String>,

    /// Ollama server and models
    #[serde(default)]
    pub ollama: OllamaFileConfig,

    /// Chunking and retrieval
    #[serde(default)]
    pub retrieval: RetrievalFileConfig,

    /// Speech output
    #[serde(default)]
    pub voice: VoiceFileConfig,

    /// API keys for hosted TTS
    #[serde(default)]
    pub api_keys: ApiKeysFileConfig,
}

/// Ollama configuration
#[derive(Debug, Default, Deserialize)]
pub struct OllamaFileConfig {
    /// Server URL (e.g. "http://localhost:11434")
    pub url: Option<String>,

    /// Chat model (e.g. "llama3.1")
    pub chat_model: Option<String>,

    /// Embedding model (e.g. "paraphrase-multilingual")
    pub embed_model: Option<String>,

    /// Sampling temperature
    pub temperature: Option<f32>,
}

/// Chunking and retrieval configuration
#[derive(Debug, Default, Deserialize)]
pub struct RetrievalFileConfig {
    /// Chunk size in characters
    pub chunk_size: Option<usize>,

    /// Overlap between chunks in characters
    pub chunk_overlap: Option<usize>,

    /// Chunks placed in each prompt
    pub top_k: Option<usize>,
}

/// Speech output configuration
#[derive(Debug, Default, Deserialize)]
pub struct VoiceFileConfig {
    /// TTS provider ("openai" or "elevenlabs")
    pub provider: Option<String>,

    /// TTS model (e.g. "tts-1")
    pub model: Option<String>,

    /// Voice identifier (e.g. "alloy")
    pub voice: Option<String>,

    /// Speed multiplier
    pub speed: Option<f32>,

    /// Output gain (0.0 to 1.0)
    pub volume: Option<f32>,
}

/// API keys configuration
#[derive(Debug, Default, Deserialize)]
pub struct ApiKeysFileConfig {
    pub openai: Option<String>,
    pub elevenlabs: Option<String>,
}

/// Load the TOML config file from the standard path
///
/// Returns `ConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file() -> ConfigFile {
    config_file_path().map_or_else(ConfigFile::default, |path| load_config_file_from(&path))
}

/// Parse config file contents
///
/// # Errors
///
/// Returns `Error::Toml` if the contents are not valid TOML for the schema
pub fn parse_config_file(content: &str) -> Result<ConfigFile> {
    Ok(toml::from_str(content)?)
}

/// Load a TOML config file from `path`, falling back to defaults
pub fn load_config_file_from(path: &Path) -> ConfigFile {
    if !path.exists() {
        return ConfigFile::default();
    }

    match std::fs::read_to_string(path) {
        Ok(content) => match parse_config_file(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                ConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            ConfigFile::default()
        }
    }
}

/// Return the config file path: `~/.config/docqa/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("docqa").join("config.toml"))
}
