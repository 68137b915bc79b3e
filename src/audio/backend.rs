use anyhow::Result;
use tokio::sync::mpsc;

/// A chunk of microphone samples (float, interleaved)
#[derive(Debug, Clone)]
pub struct AudioChunk {
    /// Raw samples in [-1, 1], interleaved when `channels > 1`
    pub samples: Vec<f32>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels
    pub channels: u16,
}

impl AudioChunk {
    pub fn mono(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
            channels: 1,
        }
    }
}

/// Configuration for microphone capture
#[derive(Debug, Clone)]
pub struct MicrophoneConfig {
    /// Duration of each delivered chunk in milliseconds (affects latency)
    pub chunk_duration_ms: u64,
}

impl Default for MicrophoneConfig {
    fn default() -> Self {
        Self {
            chunk_duration_ms: 20, // One chunk per 50 Hz host frame
        }
    }
}

/// Microphone capture provider
///
/// Implementations:
/// - Host capture devices push chunks from their callback
/// - `WavMicrophone`: replays a WAV file in real time (demo and testing)
pub trait MicrophoneSource: Send {
    /// Start capturing audio
    ///
    /// Returns a channel receiver that will receive audio chunks in capture order
    fn start(&mut self) -> Result<mpsc::UnboundedReceiver<AudioChunk>>;

    /// Stop capturing audio
    fn stop(&mut self) -> Result<()>;

    /// Check if the source is currently capturing
    fn is_capturing(&self) -> bool;

    /// Source name for logging
    fn name(&self) -> &str;
}
