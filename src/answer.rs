//! Answer normalization
//!
//! Answer chains hand back either a key/value mapping (`"result"`,
//! `"answer"`, plus whatever else the chain echoes) or a bare value. This
//! module reduces either shape to the single string shown and spoken to the
//! user.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Key holding the answer in retrieval-QA output
pub const RESULT_KEY: &str = "result";

/// Key holding the answer in conversational chain output
pub const ANSWER_KEY: &str = "answer";

/// Output of an answer-generation routine
///
/// Deserializes from any JSON value with the same rules as
/// `From<serde_json::Value>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged, from = "serde_json::Value")]
pub enum ResultValue {
    /// Key/value output
    Mapping(BTreeMap<String, String>),
    /// Any other value, already rendered as text
    Other(String),
}

impl ResultValue {
    /// Build a mapping from key/value pairs
    #[must_use]
    pub fn mapping<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self::Mapping(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Look up a key; always `None` for non-mappings
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        match self {
            Self::Mapping(map) => map.get(key).map(String::as_str),
            Self::Other(_) => None,
        }
    }
}

impl From<&str> for ResultValue {
    fn from(value: &str) -> Self {
        Self::Other(value.to_string())
    }
}

impl From<String> for ResultValue {
    fn from(value: String) -> Self {
        Self::Other(value)
    }
}

impl From<BTreeMap<String, String>> for ResultValue {
    fn from(value: BTreeMap<String, String>) -> Self {
        Self::Mapping(value)
    }
}

impl From<serde_json::Value> for ResultValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Object(object) => Self::Mapping(
                object
                    .into_iter()
                    .filter_map(|(k, v)| match v {
                        Value::Null => None,
                        Value::String(s) => Some((k, s)),
                        other => Some((k, other.to_string())),
                    })
                    .collect(),
            ),
            Value::String(s) => Self::Other(s),
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ResultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Other(s) => f.write_str(s),
            Self::Mapping(map) => {
                let json = serde_json::to_string(map).map_err(|_| fmt::Error)?;
                f.write_str(&json)
            }
        }
    }
}

/// How a mapping's keys are considered usable
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FallbackMode {
    /// An empty value counts as missing and falls through to the next key
    #[default]
    Truthiness,
    /// A present key wins even when its value is empty
    KeyPresence,
}

impl std::str::FromStr for FallbackMode {
    type Err = Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "truthiness" => Ok(Self::Truthiness),
            "key-presence" | "key_presence" => Ok(Self::KeyPresence),
            other => Err(Error::Config(format!("unknown answer fallback mode: {other}"))),
        }
    }
}

/// Extract the answer string, treating empty values as missing
#[must_use]
pub fn extract_answer(result: &ResultValue) -> String {
    extract_answer_with(result, FallbackMode::Truthiness)
}

/// Extract the answer string
///
/// Mappings yield `"result"`, then `"answer"`, then the empty string.
/// Anything else yields its text unchanged.
#[must_use]
pub fn extract_answer_with(result: &ResultValue, mode: FallbackMode) -> String {
    match result {
        ResultValue::Other(text) => text.clone(),
        ResultValue::Mapping(map) => {
            let usable = |key: &str| {
                map.get(key).filter(|v| match mode {
                    FallbackMode::Truthiness => !v.is_empty(),
                    FallbackMode::KeyPresence => true,
                })
            };

            usable(RESULT_KEY)
                .or_else(|| usable(ANSWER_KEY))
                .cloned()
                .unwrap_or_default()
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_result_key() {
        let result = ResultValue::mapping([("result", "Paris is the capital.")]);
        assert_eq!(extract_answer(&result), "Paris is the capital.");
    }

    #[test]
    fn test_answer_key_fallback() {
        let result = ResultValue::mapping([("answer", "42")]);
        assert_eq!(extract_answer(&result), "42");
    }

    #[test]
    fn test_result_wins_over_answer() {
        let result = ResultValue::mapping([("result", "first"), ("answer", "second")]);
        assert_eq!(extract_answer(&result), "first");
    }

    #[test]
    fn test_empty_mapping() {
        let result = ResultValue::Mapping(BTreeMap::new());
        assert_eq!(extract_answer(&result), "");
    }

    #[test]
    fn test_both_empty() {
        let result = ResultValue::mapping([("result", ""), ("answer", "")]);
        assert_eq!(extract_answer(&result), "");
    }

    #[test]
    fn test_empty_result_falls_through() {
        let result = ResultValue::mapping([("result", ""), ("answer", "fallback")]);
        assert_eq!(extract_answer(&result), "fallback");
    }

    #[test]
    fn test_key_presence_keeps_empty_result() {
        let result = ResultValue::mapping([("result", ""), ("answer", "fallback")]);
        assert_eq!(extract_answer_with(&result, FallbackMode::KeyPresence), "");

        let result = ResultValue::mapping([("answer", "fallback")]);
        assert_eq!(
            extract_answer_with(&result, FallbackMode::KeyPresence),
            "fallback"
        );
    }

    #[test]
    fn test_plain_string_is_identity() {
        let result = ResultValue::from("already a string");
        assert_eq!(extract_answer(&result), "already a string");
    }

    #[test]
    fn test_other_keys_ignored() {
        let result = ResultValue::mapping([("query", "what?"), ("source", "doc.pdf")]);
        assert_eq!(extract_answer(&result), "");
    }

    #[test]
    fn test_from_json_object() {
        let result = ResultValue::from(json!({
            "query": "capital?",
            "result": "Paris",
            "score": 0.5,
            "missing": null,
        }));
        assert_eq!(result.get("result"), Some("Paris"));
        assert_eq!(result.get("score"), Some("0.5"));
        assert_eq!(result.get("missing"), None);
        assert_eq!(extract_answer(&result), "Paris");
    }

    #[test]
    fn test_from_json_scalars() {
        assert_eq!(extract_answer(&ResultValue::from(json!(42))), "42");
        assert_eq!(extract_answer(&ResultValue::from(json!("text"))), "text");
        assert_eq!(extract_answer(&ResultValue::from(json!(null))), "null");
        assert_eq!(extract_answer(&ResultValue::from(json!([1, 2]))), "[1,2]");
    }

    #[test]
    fn test_deserialize_mixed_members() {
        let result: ResultValue =
            serde_json::from_str(r#"{"result":"x","score":0.5,"sources":null}"#).unwrap();
        assert_eq!(result.get("result"), Some("x"));
        assert_eq!(result.get("score"), Some("0.5"));
        assert_eq!(result.get("sources"), None);
        assert_eq!(extract_answer(&result), "x");

        let result: ResultValue = serde_json::from_str("7").unwrap();
        assert_eq!(result, ResultValue::from("7"));
    }

    #[test]
    fn test_fallback_mode_from_str() {
        assert_eq!(
            "key-presence".parse::<FallbackMode>().unwrap(),
            FallbackMode::KeyPresence
        );
        assert_eq!(
            "Truthiness".parse::<FallbackMode>().unwrap(),
            FallbackMode::Truthiness
        );
        assert!("strict".parse::<FallbackMode>().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(ResultValue::from("plain").to_string(), "plain");
        let result = ResultValue::mapping([("result", "x")]);
        assert_eq!(result.to_string(), r#"{"result":"x"}"#);
    }
}
