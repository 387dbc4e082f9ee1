//! Answer narration

use std::sync::Arc;

use super::tts::Synthesizer;
use crate::Result;

/// Default output gain
pub const DEFAULT_VOLUME: f32 = 0.9;

/// Synthesizes answers and shapes the samples for playback
#[derive(Clone)]
pub struct Speaker {
    synthesizer: Arc<dyn Synthesizer>,
    volume: f32,
}

impl Speaker {
    /// Create a speaker with the given output gain (clamped to `[0.0, 1.0]`)
    #[must_use]
    pub fn new(synthesizer: Arc<dyn Synthesizer>, volume: f32) -> Self {
        Self {
            synthesizer,
            volume: volume.clamp(0.0, 1.0),
        }
    }

    /// Output gain applied to synthesized samples
    #[must_use]
    pub const fn volume(&self) -> f32 {
        self.volume
    }

    /// Sample rate of prepared audio
    #[must_use]
    pub fn sample_rate(&self) -> u32 {
        self.synthesizer.sample_rate()
    }

    /// Synthesize `text` and apply the output gain
    ///
    /// Blank text yields no samples without calling the synthesizer.
    ///
    /// # Errors
    ///
    /// Returns error if synthesis fails
    pub async fn prepare(&self, text: &str) -> Result<Vec<f32>> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(Vec::new());
        }

        let mut samples = self.synthesizer.synthesize(text).await?;
        for sample in &mut samples {
            *sample = (*sample * self.volume).clamp(-1.0, 1.0);
        }

        tracing::debug!(
            samples = samples.len(),
            sample_rate = self.sample_rate(),
            "prepared speech"
        );
        Ok(samples)
    }
}

impl std::fmt::Debug for Speaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Speaker")
            .field("volume", &self.volume)
            .finish_non_exhaustive()
    }
}
