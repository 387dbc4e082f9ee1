//! Voice output
//!
//! Answers are synthesized through a hosted TTS API and fed to an
//! [`AudioSink`] in short frames, so a [`SpeechControl`] stop request can cut
//! an utterance off mid-sentence.

#[cfg(feature = "audio")]
mod playback;
mod speaker;
mod speech;
mod tts;

#[cfg(feature = "audio")]
pub use playback::AudioPlayback;
pub use speaker::{DEFAULT_VOLUME, Speaker};
pub use speech::{AudioSink, FRAME_SAMPLES, SpeakOutcome, SpeechControl, speak_samples};
pub use tts::{Synthesizer, TTS_SAMPLE_RATE, TextToSpeech, TtsProvider, pcm16_to_f32};
