use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::MediaSink;
use crate::audio::{downmix_to_mono, AudioChunk, LinearResampler, MicrophoneSource};
use crate::media::{encode_base64, pcm_from_float_samples};
use crate::protocol::OutboundFrame;

/// Configuration for the audio pump
#[derive(Debug, Clone)]
pub struct AudioPumpConfig {
    /// Time between buffered sends
    /// Default: 100ms
    pub send_interval: Duration,

    /// Outbound sample rate (mono PCM16)
    pub sample_rate: u32,

    /// Oldest audio is dropped once the buffer holds more than this
    /// (only reachable while the session is not active)
    pub max_buffered: Duration,
}

impl Default for AudioPumpConfig {
    fn default() -> Self {
        Self {
            send_interval: Duration::from_millis(100),
            sample_rate: 16000,
            max_buffered: Duration::from_secs(10),
        }
    }
}

/// Accumulates microphone audio and streams it at a fixed cadence
///
/// Chunks are converted to mono PCM16 at the outbound rate as they arrive
/// and buffered in arrival order. Resampling state carries across chunks
/// for the whole capture run. Each send concatenates the whole buffer
/// into one payload.
pub struct AudioPump {
    config: AudioPumpConfig,
    microphone: Option<Box<dyn MicrophoneSource>>,
    audio_rx: Option<mpsc::UnboundedReceiver<AudioChunk>>,
    buffer: Vec<Vec<u8>>,
    resampler: Option<LinearResampler>,
    capturing: bool,
    last_send: Option<Instant>,
}

impl AudioPump {
    pub fn new(config: AudioPumpConfig, microphone: Option<Box<dyn MicrophoneSource>>) -> Self {
        info!(
            "Audio pump initialized: {}Hz mono, send every {:?}",
            config.sample_rate, config.send_interval
        );

        Self {
            config,
            microphone,
            audio_rx: None,
            buffer: Vec::new(),
            resampler: None,
            capturing: false,
            last_send: None,
        }
    }

    /// Start capturing; a microphone failure is logged and chunks can still
    /// be pushed directly
    pub fn start(&mut self, now: Instant) {
        if self.capturing {
            debug!("Audio pump already capturing");
            return;
        }

        self.buffer.clear();
        self.resampler = None;
        self.last_send = Some(now);
        self.capturing = true;

        if let Some(microphone) = self.microphone.as_mut() {
            match microphone.start() {
                Ok(rx) => {
                    info!("Microphone started: {}", microphone.name());
                    self.audio_rx = Some(rx);
                }
                Err(e) => error!("Microphone provider not initialized: {:#}", e),
            }
        }

        info!("Started audio capture");
    }

    /// Stop capturing and flush everything buffered, even if the send
    /// interval has not elapsed
    pub fn stop(&mut self, sink: &mut dyn MediaSink) {
        if !self.capturing {
            return;
        }

        self.drain_microphone();
        self.flush(sink);
        self.buffer.clear();
        self.capturing = false;

        if let Some(microphone) = self.microphone.as_mut() {
            if let Err(e) = microphone.stop() {
                warn!("Failed to stop microphone: {:#}", e);
            }
        }
        self.audio_rx = None;

        info!("Stopped audio capture");
    }

    pub fn is_capturing(&self) -> bool {
        self.capturing
    }

    /// Bytes of PCM waiting for the next send
    pub fn buffered_bytes(&self) -> usize {
        self.buffer.iter().map(Vec::len).sum()
    }

    /// Buffer a captured chunk (any rate or channel count)
    pub fn push_chunk(&mut self, chunk: AudioChunk) {
        if !self.capturing || chunk.samples.is_empty() {
            return;
        }
        let mono = downmix_to_mono(chunk);
        let samples = self.resample(mono);
        self.push_pcm(pcm_from_float_samples(&samples));
    }

    fn resample(&mut self, chunk: AudioChunk) -> Vec<f32> {
        let target = self.config.sample_rate;
        if chunk.sample_rate == target {
            return chunk.samples;
        }

        // A source rate change starts a new stream
        if self
            .resampler
            .as_ref()
            .map_or(true, |r| r.source_rate() != chunk.sample_rate)
        {
            debug!("Resampling microphone audio {}Hz -> {}Hz", chunk.sample_rate, target);
            self.resampler = Some(LinearResampler::new(chunk.sample_rate, target));
        }

        match self.resampler.as_mut() {
            Some(resampler) => resampler.process(&chunk.samples),
            None => chunk.samples,
        }
    }

    /// Buffer already-encoded mono PCM16 at the outbound rate
    pub fn push_pcm(&mut self, pcm: Vec<u8>) {
        if !self.capturing || pcm.is_empty() {
            return;
        }
        self.buffer.push(pcm);

        let max_bytes = self.max_buffered_bytes();
        let mut buffered = self.buffered_bytes();
        while buffered > max_bytes && self.buffer.len() > 1 {
            let dropped = self.buffer.remove(0);
            buffered -= dropped.len();
            debug!("Audio buffer full; dropped {} oldest bytes", dropped.len());
        }
    }

    fn max_buffered_bytes(&self) -> usize {
        (self.config.max_buffered.as_secs_f64() * self.config.sample_rate as f64) as usize * 2
    }

    pub fn tick(&mut self, now: Instant, sink: &mut dyn MediaSink) {
        self.drain_microphone();

        if !self.capturing || !sink.is_session_active() {
            return;
        }

        let due = self
            .last_send
            .map_or(true, |last| now.saturating_duration_since(last) >= self.config.send_interval);
        if due {
            self.flush(sink);
            self.last_send = Some(now);
        }
    }

    fn drain_microphone(&mut self) {
        let Some(rx) = self.audio_rx.as_mut() else {
            return;
        };

        let mut chunks = Vec::new();
        while let Ok(chunk) = rx.try_recv() {
            chunks.push(chunk);
        }
        for chunk in chunks {
            self.push_chunk(chunk);
        }
    }

    /// Concatenate buffered chunks in arrival order and send them as one payload
    fn flush(&mut self, sink: &mut dyn MediaSink) {
        if self.buffer.is_empty() {
            return;
        }

        let pcm = self.buffer.concat();
        self.buffer.clear();

        let frame = OutboundFrame::audio_pcm(&encode_base64(&pcm), self.config.sample_rate);
        if !sink.send_media(frame) {
            debug!("Dropped {} bytes of buffered audio", pcm.len());
        }
    }
}
