use anyhow::{bail, Context, Result};
use hound::{SampleFormat, WavReader};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::backend::{AudioChunk, MicrophoneConfig, MicrophoneSource};

/// Microphone that replays a WAV file at real-time pace
pub struct WavMicrophone {
    pub path: String,
    pub duration_seconds: f64,
    pub sample_rate: u32,
    pub channels: u16,
    samples: Arc<[f32]>,
    config: MicrophoneConfig,
    task: Option<JoinHandle<()>>,
}

impl WavMicrophone {
    pub fn open(path: impl AsRef<Path>, config: MicrophoneConfig) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening audio file: {}", path.display());

        let reader = WavReader::open(path).context("Failed to open WAV file")?;

        let spec = reader.spec();
        let samples: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
            (SampleFormat::Int, 16) => reader
                .into_samples::<i16>()
                .map(|s| s.map(|v| v as f32 / 32768.0))
                .collect::<Result<Vec<_>, _>>()
                .context("Failed to read audio samples")?,
            (SampleFormat::Float, 32) => reader
                .into_samples::<f32>()
                .collect::<Result<Vec<_>, _>>()
                .context("Failed to read audio samples")?,
            (format, bits) => bail!("Unsupported WAV format: {:?} {}-bit", format, bits),
        };

        let duration_seconds =
            samples.len() as f64 / (spec.sample_rate as f64 * spec.channels as f64);

        info!(
            "Audio file loaded: {:.1}s, {}Hz, {} channels, {} samples",
            duration_seconds,
            spec.sample_rate,
            spec.channels,
            samples.len()
        );

        Ok(Self {
            path: path.display().to_string(),
            duration_seconds,
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            samples: samples.into(),
            config,
            task: None,
        })
    }

    /// Number of interleaved samples in one delivered chunk
    fn samples_per_chunk(&self) -> usize {
        let frames = self.sample_rate as u64 * self.config.chunk_duration_ms / 1000;
        (frames.max(1) * self.channels as u64) as usize
    }
}

impl MicrophoneSource for WavMicrophone {
    fn start(&mut self) -> Result<mpsc::UnboundedReceiver<AudioChunk>> {
        if self.task.is_some() {
            bail!("Already capturing");
        }

        let handle = tokio::runtime::Handle::try_current()
            .context("WAV microphone requires a tokio runtime")?;

        let (tx, rx) = mpsc::unbounded_channel();
        let samples = Arc::clone(&self.samples);
        let chunk_len = self.samples_per_chunk();
        let sample_rate = self.sample_rate;
        let channels = self.channels;
        let period = Duration::from_millis(self.config.chunk_duration_ms.max(1));

        info!("Replaying {} as microphone input", self.path);

        self.task = Some(handle.spawn(async move {
            let mut interval = tokio::time::interval(period);
            for chunk in samples.chunks(chunk_len) {
                interval.tick().await;
                let chunk = AudioChunk {
                    samples: chunk.to_vec(),
                    sample_rate,
                    channels,
                };
                if tx.send(chunk).is_err() {
                    debug!("Microphone receiver dropped");
                    return;
                }
            }
            info!("WAV microphone reached end of file");
        }));

        Ok(rx)
    }

    fn stop(&mut self) -> Result<()> {
        if let Some(task) = self.task.take() {
            task.abort();
            info!("Stopped WAV microphone");
        }
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    fn name(&self) -> &str {
        "wav-file"
    }
}

impl Drop for WavMicrophone {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
