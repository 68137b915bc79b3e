use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;

use crate::pump::{AudioPumpConfig, CameraPumpConfig};
use crate::session::SessionConfig;

/// Environment variable prefix for overrides, e.g. `LENS_LIVE__SESSION__API_KEY`
pub const ENV_PREFIX: &str = "LENS_LIVE";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub session: SessionConfig,
    pub camera: CameraConfig,
    pub audio: AudioConfig,
    pub speech: SpeechConfig,
    pub scheduler: SchedulerConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Seconds between frames sent to the model
    pub frame_interval_secs: f32,
    /// JPEG quality (1-100)
    pub jpeg_quality: u8,
    /// Test-pattern camera resolution
    pub width: u32,
    pub height: u32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            frame_interval_secs: 1.0,
            jpeg_quality: 40,
            width: 320,
            height: 240,
        }
    }
}

impl CameraConfig {
    pub fn pump_config(&self) -> CameraPumpConfig {
        CameraPumpConfig {
            frame_interval: Duration::from_secs_f32(self.frame_interval_secs.max(0.0)),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Seconds between buffered audio sends
    pub send_interval_secs: f32,
    /// Duration of each chunk delivered by the microphone, in milliseconds
    pub chunk_duration_ms: u64,
    /// WAV file replayed as microphone input
    pub wav_path: Option<String>,
    /// WAV file receiving audio responses from the model
    pub response_path: Option<String>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            send_interval_secs: 0.1,
            chunk_duration_ms: 20,
            wav_path: None,
            response_path: None,
        }
    }
}

impl AudioConfig {
    pub fn pump_config(&self, sample_rate: u32) -> AudioPumpConfig {
        AudioPumpConfig {
            send_interval: Duration::from_secs_f32(self.send_interval_secs.max(0.0)),
            sample_rate,
            ..AudioPumpConfig::default()
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Speak text responses with the TTS fallback
    pub enabled: bool,
    pub api_key: String,
    pub voice: String,
    pub model: String,
    /// WAV file receiving synthesized speech
    pub output_path: String,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: String::new(),
            voice: "alloy".to_string(),
            model: "tts-1".to_string(),
            output_path: "speech.wav".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Scheduler tick period in milliseconds
    pub tick_interval_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 20, // 50 Hz, like a host frame update
        }
    }
}

impl SchedulerConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}

impl Config {
    /// Load from an optional config file (any format the `config` crate
    /// recognises by extension) plus `LENS_LIVE__*` environment overrides
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()
            .with_context(|| format!("Failed to read configuration from {}", path))?;

        settings
            .try_deserialize()
            .context("Invalid configuration")
    }
}
