//! Interaction language handling
//!
//! Documents are indexed as-is and retrieval runs in English. Questions in
//! another language are translated to English first and answers translated
//! back, both through the chat model.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::llm::ChatModel;
use crate::{Error, Result};

/// Language the user asks and hears answers in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English
    #[default]
    English,
    /// Kannada
    Kannada,
}

impl Language {
    /// ISO 639-1 code
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Kannada => "kn",
        }
    }

    /// Human-readable name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::English => "English",
            Self::Kannada => "Kannada",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(Self::English),
            "kn" | "kannada" => Ok(Self::Kannada),
            other => Err(Error::Config(format!("unsupported language: {other}"))),
        }
    }
}

/// Turn the user's question into the English query used for retrieval
///
/// # Errors
///
/// Returns error if the translation call fails
pub async fn question_for_retrieval(
    llm: &dyn ChatModel,
    language: Language,
    question: &str,
) -> Result<String> {
    match language {
        Language::English => Ok(question.to_string()),
        Language::Kannada => {
            let prompt = format!(
                "Translate the following Kannada question to English. \
                 Reply ONLY with the English translation:\n\n{question}"
            );
            let translated = llm.invoke(&prompt).await?;
            tracing::debug!(%language, "translated question");
            Ok(translated.trim().to_string())
        }
    }
}

/// Turn an English answer into the user's language
///
/// # Errors
///
/// Returns error if the translation call fails
pub async fn answer_for_display(
    llm: &dyn ChatModel,
    language: Language,
    answer: &str,
) -> Result<String> {
    match language {
        Language::English => Ok(answer.to_string()),
        Language::Kannada => {
            let prompt = format!(
                "Translate the following answer to Kannada. \
                 Reply ONLY with the Kannada translation:\n\n{answer}"
            );
            let translated = llm.invoke(&prompt).await?;
            tracing::debug!(%language, "translated answer");
            Ok(translated.trim().to_string())
        }
    }
}
