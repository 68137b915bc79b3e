// Tests for WAV microphone replay, WAV output and chunk preparation

use anyhow::Result;
use lens_live::audio::{
    downmix_to_mono, resample_linear, AudioChunk, AudioOutput, LinearResampler,
    MicrophoneConfig, MicrophoneSource, WavAudioOutput, WavMicrophone,
};
use std::path::Path;
use tempfile::TempDir;

fn write_wav(path: &Path, sample_rate: u32, channels: u16, frames: usize) -> Result<()> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)?;
    for i in 0..frames * channels as usize {
        writer.write_sample(((i % 100) as i16) * 100)?;
    }
    writer.finalize()?;
    Ok(())
}

#[test]
fn test_downmix_averages_channels() {
    let chunk = AudioChunk {
        samples: vec![1.0, 0.0, 0.5, -0.5],
        sample_rate: 16000,
        channels: 2,
    };

    let mono = downmix_to_mono(chunk);

    assert_eq!(mono.channels, 1);
    assert_eq!(mono.samples, vec![0.5, 0.0]);
}

#[test]
fn test_resample_halves_length() {
    let chunk = AudioChunk::mono(vec![0.0; 480], 48000);

    let resampled = resample_linear(chunk, 16000);

    assert_eq!(resampled.sample_rate, 16000);
    assert_eq!(resampled.samples.len(), 160);
}

#[test]
fn test_resample_same_rate_passthrough() {
    let chunk = AudioChunk::mono(vec![0.1, 0.2, 0.3], 16000);

    let resampled = resample_linear(chunk, 16000);

    assert_eq!(resampled.samples, vec![0.1, 0.2, 0.3]);
}

#[test]
fn test_streaming_resample_matches_whole_signal() {
    let signal: Vec<f32> = (0..1000).map(|i| (i as f32 * 0.01).sin()).collect();

    let whole = LinearResampler::new(44100, 16000).process(&signal);

    let mut resampler = LinearResampler::new(44100, 16000);
    let mut chunked = Vec::new();
    let mut offset = 0;
    for size in [37, 113, 250, 1, 599] {
        chunked.extend(resampler.process(&signal[offset..offset + size]));
        offset += size;
    }

    assert_eq!(offset, signal.len());
    assert_eq!(chunked, whole, "Chunk boundaries must not change the output");
}

#[test]
fn test_streaming_resample_does_not_drift() {
    let mut resampler = LinearResampler::new(44100, 16000);

    // 44 chunks of 100 samples: per-chunk rounding would lose ~12 samples
    let total: usize = (0..44)
        .map(|_| resampler.process(&[0.0; 100]).len())
        .sum();

    let ideal = 4400.0 * 16000.0 / 44100.0;
    assert!(
        (total as f64 - ideal).abs() <= 1.0,
        "{} samples, expected about {:.1}",
        total,
        ideal
    );
}

#[test]
fn test_streaming_resample_interpolates_across_boundary() {
    let mut resampler = LinearResampler::new(3, 2);

    // Positions 0, 1.5, 3.0, 4.5 on a ramp 0..6
    let mut out = resampler.process(&[0.0, 1.0]);
    out.extend(resampler.process(&[2.0, 3.0, 4.0, 5.0]));

    assert_eq!(out, vec![0.0, 1.5, 3.0, 4.5]);
}

#[test]
fn test_wav_microphone_open_missing_file() {
    let result = WavMicrophone::open("/nonexistent/input.wav", MicrophoneConfig::default());
    assert!(result.is_err());
}

#[tokio::test]
async fn test_wav_microphone_replays_chunks() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("input.wav");
    write_wav(&path, 16000, 1, 1600)?;

    let mut microphone = WavMicrophone::open(&path, MicrophoneConfig { chunk_duration_ms: 20 })?;
    let mut rx = microphone.start()?;
    assert!(microphone.is_capturing());

    let first = rx.recv().await.expect("first chunk");
    assert_eq!(first.sample_rate, 16000);
    assert_eq!(first.channels, 1);
    assert_eq!(first.samples.len(), 320);

    microphone.stop()?;
    assert!(!microphone.is_capturing());
    Ok(())
}

#[test]
fn test_wav_output_writes_on_first_play() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("responses.wav");

    let mut output = WavAudioOutput::new(&path);
    assert!(!path.exists(), "File is created lazily");

    output.play(&[0.0, 0.5, -0.5], 24000);
    output.play(&[0.25; 10], 24000);
    // Different rate than the open file: dropped
    output.play(&[0.25; 10], 16000);
    assert_eq!(output.sample_count(), 13);
    output.finish()?;

    let reader = hound::WavReader::open(&path)?;
    assert_eq!(reader.spec().sample_rate, 24000);
    assert_eq!(reader.spec().channels, 1);
    assert_eq!(reader.len(), 13);
    Ok(())
}
