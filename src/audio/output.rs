use anyhow::{Context, Result};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use tracing::{info, warn};

/// Audio playback sink (model audio responses, synthesized speech)
pub trait AudioOutput: Send {
    /// Queue float samples in [-1, 1] for playback
    fn play(&mut self, samples: &[f32], sample_rate: u32);
}

/// Writes everything played into a single mono WAV file
///
/// The file is created on the first `play` call with that call's sample rate;
/// later audio at a different rate is dropped.
pub struct WavAudioOutput {
    path: PathBuf,
    writer: Option<hound::WavWriter<BufWriter<File>>>,
    sample_rate: Option<u32>,
    sample_count: usize,
}

impl WavAudioOutput {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            writer: None,
            sample_rate: None,
            sample_count: 0,
        }
    }

    /// Number of samples written so far
    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    fn open(&mut self, sample_rate: u32) -> Result<()> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let writer = hound::WavWriter::create(&self.path, spec)
            .with_context(|| format!("Failed to create WAV file: {:?}", self.path))?;

        info!("Writing audio output to {:?} ({}Hz)", self.path, sample_rate);

        self.writer = Some(writer);
        self.sample_rate = Some(sample_rate);
        Ok(())
    }

    fn write(&mut self, samples: &[f32]) -> Result<()> {
        if let Some(writer) = &mut self.writer {
            for &sample in samples {
                let value = (sample.clamp(-1.0, 1.0) * 32767.0) as i16;
                writer
                    .write_sample(value)
                    .context("Failed to write sample to WAV")?;
            }
            writer.flush().context("Failed to flush WAV file")?;
            self.sample_count += samples.len();
        }
        Ok(())
    }

    /// Finalize the WAV header; called automatically on drop
    pub fn finish(&mut self) -> Result<()> {
        if let Some(writer) = self.writer.take() {
            writer.finalize().context("Failed to finalize WAV file")?;
        }
        Ok(())
    }
}

impl AudioOutput for WavAudioOutput {
    fn play(&mut self, samples: &[f32], sample_rate: u32) {
        match self.sample_rate {
            None => {
                if let Err(e) = self.open(sample_rate) {
                    warn!("Audio output unavailable: {:#}", e);
                    return;
                }
            }
            Some(rate) if rate != sample_rate => {
                warn!(
                    "Dropping {} samples at {}Hz (output is {}Hz)",
                    samples.len(),
                    sample_rate,
                    rate
                );
                return;
            }
            Some(_) => {}
        }

        if let Err(e) = self.write(samples) {
            warn!("Failed to write audio output: {:#}", e);
        }
    }
}

impl Drop for WavAudioOutput {
    fn drop(&mut self) {
        if let Err(e) = self.finish() {
            warn!("Failed to finalize WAV writer on drop: {}", e);
        }
    }
}
