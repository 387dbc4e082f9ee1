//! Audio playback to speakers

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleRate, Stream};

use super::speech::{AudioSink, FRAME_SAMPLES};
use super::tts::TTS_SAMPLE_RATE;
use crate::{Error, Result};

/// Interval between queue checks while waiting on the device
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Plays audio on the default output device
///
/// Samples are pushed into a shared queue drained by the cpal callback.
/// `write` blocks while more than two frames are queued, which keeps stop
/// latency close to one frame.
pub struct AudioPlayback {
    stream: Stream,
    queue: Arc<Mutex<VecDeque<f32>>>,
}

impl AudioPlayback {
    /// Open the default output device at the TTS sample rate
    ///
    /// # Errors
    ///
    /// Returns error if audio device cannot be opened
    pub fn new() -> Result<Self> {
        let host = cpal::default_host();

        let device = host
            .default_output_device()
            .ok_or_else(|| Error::Audio("no output device available".to_string()))?;

        let rate = SampleRate(TTS_SAMPLE_RATE);
        let supported_config = device
            .supported_output_configs()
            .map_err(|e| Error::Audio(e.to_string()))?
            .find(|c| c.channels() == 1 && c.min_sample_rate() <= rate && c.max_sample_rate() >= rate)
            .or_else(|| {
                // Fallback: try stereo
                device.supported_output_configs().ok()?.find(|c| {
                    c.channels() == 2 && c.min_sample_rate() <= rate && c.max_sample_rate() >= rate
                })
            })
            .ok_or_else(|| Error::Audio("no suitable output config found".to_string()))?;

        let config = supported_config.with_sample_rate(rate).config();
        let channels = config.channels as usize;

        let queue = Arc::new(Mutex::new(VecDeque::<f32>::new()));
        let queue_clone = Arc::clone(&queue);

        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    let Ok(mut queue) = queue_clone.lock() else {
                        data.fill(0.0);
                        return;
                    };
                    for frame in data.chunks_mut(channels) {
                        let sample = queue.pop_front().unwrap_or(0.0);
                        frame.fill(sample);
                    }
                },
                |err| {
                    tracing::error!(error = %err, "audio playback error");
                },
                None,
            )
            .map_err(|e| Error::Audio(e.to_string()))?;

        stream.play().map_err(|e| Error::Audio(e.to_string()))?;

        tracing::debug!(
            device = device.name().unwrap_or_default(),
            sample_rate = TTS_SAMPLE_RATE,
            channels,
            "audio playback initialized"
        );

        Ok(Self { stream, queue })
    }

    fn queued(&self) -> Result<usize> {
        self.queue
            .lock()
            .map(|q| q.len())
            .map_err(|_| Error::Audio("playback queue poisoned".to_string()))
    }
}

impl AudioSink for AudioPlayback {
    fn write(&mut self, samples: &[f32]) -> Result<()> {
        while self.queued()? > FRAME_SAMPLES * 2 {
            std::thread::sleep(POLL_INTERVAL);
        }

        self.queue
            .lock()
            .map_err(|_| Error::Audio("playback queue poisoned".to_string()))?
            .extend(samples.iter().copied());
        Ok(())
    }

    fn halt(&mut self) {
        if let Ok(mut queue) = self.queue.lock() {
            queue.clear();
        }
        let _ = self.stream.pause();
    }

    fn finish(&mut self) -> Result<()> {
        while self.queued()? > 0 {
            std::thread::sleep(POLL_INTERVAL);
        }
        // Let the device flush its own buffer
        std::thread::sleep(Duration::from_millis(100));
        Ok(())
    }
}
