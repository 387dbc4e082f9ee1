//! Interruptible speech output
//!
//! A [`SpeechControl`] is shared between whoever may ask speech to stop and
//! the loop feeding audio to the speaker. The loop checks it before every
//! frame, so a stop takes effect within one frame.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::Result;

/// Samples per frame written between stop checks (100 ms at 24 kHz)
pub const FRAME_SAMPLES: usize = 2400;

/// Shared stop signal for an utterance
///
/// Clones observe the same flag. Starts cleared.
#[derive(Debug, Clone, Default)]
pub struct SpeechControl {
    stop: Arc<AtomicBool>,
}

impl SpeechControl {
    /// Create a cleared control
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the current utterance to stop
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    /// Clear the stop request before the next utterance
    pub fn reset(&self) {
        self.stop.store(false, Ordering::SeqCst);
    }

    /// Whether a stop has been requested since the last reset
    #[must_use]
    pub fn is_stop_requested(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }
}

/// Destination for synthesized audio
pub trait AudioSink {
    /// Queue samples for output, blocking while the device is behind
    ///
    /// # Errors
    ///
    /// Returns error if the device rejects the samples
    fn write(&mut self, samples: &[f32]) -> Result<()>;

    /// Drop any queued audio
    fn halt(&mut self) {}

    /// Wait for queued audio to finish
    ///
    /// # Errors
    ///
    /// Returns error if the device fails while draining
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// How an utterance ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeakOutcome {
    /// All samples were played
    Completed,
    /// A stop request cut the utterance short
    Interrupted,
}

/// Feed `samples` to `sink` frame by frame until done or stopped
///
/// # Errors
///
/// Returns error if the sink fails
pub fn speak_samples<S: AudioSink + ?Sized>(
    sink: &mut S,
    samples: &[f32],
    control: &SpeechControl,
) -> Result<SpeakOutcome> {
    for frame in samples.chunks(FRAME_SAMPLES) {
        if control.is_stop_requested() {
            sink.halt();
            tracing::debug!("speech interrupted");
            return Ok(SpeakOutcome::Interrupted);
        }
        sink.write(frame)?;
    }

    if control.is_stop_requested() {
        sink.halt();
        return Ok(SpeakOutcome::Interrupted);
    }

    sink.finish()?;
    tracing::debug!(samples = samples.len(), "speech complete");
    Ok(SpeakOutcome::Completed)
}
