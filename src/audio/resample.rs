use super::backend::AudioChunk;

/// Convert interleaved multi-channel audio to mono by averaging channels
pub fn downmix_to_mono(chunk: AudioChunk) -> AudioChunk {
    if chunk.channels <= 1 {
        return chunk;
    }

    let channels = chunk.channels as usize;
    let mono_samples = chunk
        .samples
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect();

    AudioChunk {
        samples: mono_samples,
        sample_rate: chunk.sample_rate,
        channels: 1,
    }
}

/// Resample a single mono chunk by linear interpolation.
///
/// For a continuous stream use [`LinearResampler`], which keeps position
/// across chunks.
pub fn resample_linear(chunk: AudioChunk, target_rate: u32) -> AudioChunk {
    if chunk.sample_rate == target_rate || chunk.samples.is_empty() || target_rate == 0 {
        return chunk;
    }

    let samples = LinearResampler::new(chunk.sample_rate, target_rate).process(&chunk.samples);

    AudioChunk {
        samples,
        sample_rate: target_rate,
        channels: chunk.channels,
    }
}

/// Streaming linear resampler for mono audio.
///
/// Output sample `k` sits at source position `k * source_rate / target_rate`,
/// computed in integers from the start of the stream, so chunk boundaries
/// neither drift nor leave seams. The last sample of each chunk is kept to
/// interpolate into the next one.
#[derive(Debug, Clone)]
pub struct LinearResampler {
    source_rate: u32,
    target_rate: u32,
    /// Output samples produced so far
    emitted: u64,
    /// Source samples consumed so far
    consumed: u64,
    last: Option<f32>,
}

impl LinearResampler {
    pub fn new(source_rate: u32, target_rate: u32) -> Self {
        Self {
            source_rate,
            target_rate,
            emitted: 0,
            consumed: 0,
            last: None,
        }
    }

    pub fn source_rate(&self) -> u32 {
        self.source_rate
    }

    pub fn target_rate(&self) -> u32 {
        self.target_rate
    }

    /// Resample the next chunk of the stream
    pub fn process(&mut self, input: &[f32]) -> Vec<f32> {
        if self.source_rate == self.target_rate || self.source_rate == 0 || self.target_rate == 0 {
            return input.to_vec();
        }

        let source = self.source_rate as u64;
        let target = self.target_rate as u64;
        let end = self.consumed + input.len() as u64;

        let mut out = Vec::with_capacity((input.len() as u64 * target / source + 1) as usize);
        loop {
            let position = self.emitted * source;
            let idx = position / target;
            // Both neighbours must be available
            if idx + 1 >= end {
                break;
            }
            let frac = (position % target) as f32 / target as f32;
            let a = self.sample_at(idx, input);
            let b = self.sample_at(idx + 1, input);
            out.push(a + (b - a) * frac);
            self.emitted += 1;
        }

        if let Some(&last) = input.last() {
            self.last = Some(last);
        }
        self.consumed = end;
        out
    }

    /// Restart at the beginning of a new stream
    pub fn reset(&mut self) {
        self.emitted = 0;
        self.consumed = 0;
        self.last = None;
    }

    fn sample_at(&self, idx: u64, input: &[f32]) -> f32 {
        if idx < self.consumed {
            // Only the previous chunk's final sample is ever behind the window
            self.last.unwrap_or(0.0)
        } else {
            input[(idx - self.consumed) as usize]
        }
    }
}
