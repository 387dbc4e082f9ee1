//! Shared test utilities
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use docqa::{AudioSink, ChatModel, DocumentLoader, Embed, Error, Result, Segment, SpeechControl, Synthesizer};

/// Words the keyword embedder has dimensions for
const VOCABULARY: [&str; 8] = [
    "paris", "france", "capital", "river", "seine", "bread", "flour", "oven",
];

/// Embeds text as counts of vocabulary words, so retrieval is predictable
#[derive(Debug, Default)]
pub struct KeywordEmbedder {
    pub batches: Mutex<Vec<usize>>,
}

impl KeywordEmbedder {
    pub fn vector(text: &str) -> Vec<f32> {
        let lower = text.to_lowercase();
        VOCABULARY
            .iter()
            .map(|word| lower.matches(word).count() as f32)
            .collect()
    }
}

#[async_trait]
impl Embed for KeywordEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.batches.lock().unwrap().push(texts.len());
        Ok(texts.iter().map(|t| Self::vector(t)).collect())
    }
}

/// Embedder that always fails
pub struct FailingEmbedder;

#[async_trait]
impl Embed for FailingEmbedder {
    async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Err(Error::Embedding("backend unavailable".to_string()))
    }
}

type Reply = Box<dyn Fn(&str) -> String + Send + Sync>;

/// Chat model that records prompts and answers through a closure
pub struct ScriptedChat {
    reply: Reply,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedChat {
    pub fn new(reply: impl Fn(&str) -> String + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            reply: Box::new(reply),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn fixed(reply: &str) -> Arc<Self> {
        let reply = reply.to_string();
        Self::new(move |_| reply.clone())
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for ScriptedChat {
    async fn invoke(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok((self.reply)(prompt))
    }
}

/// Loader that records what it was given and returns canned segments
pub struct RecordingLoader {
    segments: Vec<Segment>,
    fail: bool,
    pub seen_path: Mutex<Option<PathBuf>>,
    pub seen_bytes: Mutex<Option<Vec<u8>>>,
}

impl RecordingLoader {
    pub fn returning(segments: Vec<Segment>) -> Self {
        Self {
            segments,
            fail: false,
            seen_path: Mutex::new(None),
            seen_bytes: Mutex::new(None),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::returning(Vec::new())
        }
    }

    pub fn path(&self) -> PathBuf {
        self.seen_path
            .lock()
            .unwrap()
            .clone()
            .expect("loader was not called")
    }

    pub fn bytes(&self) -> Vec<u8> {
        self.seen_bytes.lock().unwrap().clone().unwrap_or_default()
    }

    pub fn was_called(&self) -> bool {
        self.seen_path.lock().unwrap().is_some()
    }
}

impl DocumentLoader for RecordingLoader {
    fn load(&self, path: &Path) -> Result<Vec<Segment>> {
        *self.seen_path.lock().unwrap() = Some(path.to_path_buf());
        *self.seen_bytes.lock().unwrap() = Some(std::fs::read(path)?);

        if self.fail {
            return Err(Error::Pdf("malformed document".to_string()));
        }
        Ok(self.segments.clone())
    }
}

/// Sink that records everything written to it
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub written: Vec<f32>,
    pub writes: usize,
    pub halts: usize,
    pub finishes: usize,
    /// Request a stop on this control after `stop_after` writes
    pub stop_after: Option<(usize, SpeechControl)>,
    /// Delay per write, to emulate a real device
    pub write_delay: Option<std::time::Duration>,
}

impl AudioSink for RecordingSink {
    fn write(&mut self, samples: &[f32]) -> Result<()> {
        self.written.extend_from_slice(samples);
        self.writes += 1;

        if let Some((after, control)) = &self.stop_after {
            if self.writes >= *after {
                control.request_stop();
            }
        }
        if let Some(delay) = self.write_delay {
            std::thread::sleep(delay);
        }
        Ok(())
    }

    fn halt(&mut self) {
        self.halts += 1;
    }

    fn finish(&mut self) -> Result<()> {
        self.finishes += 1;
        Ok(())
    }
}

/// Synthesizer returning fixed samples and counting calls
#[derive(Debug, Default)]
pub struct StubSynth {
    pub samples: Vec<f32>,
    pub calls: Mutex<Vec<String>>,
}

#[async_trait]
impl Synthesizer for StubSynth {
    async fn synthesize(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.lock().unwrap().push(text.to_string());
        Ok(self.samples.clone())
    }
}
