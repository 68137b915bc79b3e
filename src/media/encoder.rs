use base64::Engine;

/// Convert float samples in [-1, 1] to 16-bit little-endian PCM.
///
/// Positive samples scale by 32767 and negative samples by 32768; the result
/// is truncated toward zero. Out-of-range input is clamped first.
pub fn pcm_from_float_samples(samples: &[f32]) -> Vec<u8> {
    samples
        .iter()
        .flat_map(|&s| float_to_i16(s).to_le_bytes())
        .collect()
}

fn float_to_i16(sample: f32) -> i16 {
    if sample.is_nan() {
        return 0;
    }
    let s = sample.clamp(-1.0, 1.0);
    let scaled = if s < 0.0 { s * 32768.0 } else { s * 32767.0 };
    scaled as i16
}

/// Reconstruct float samples from PCM16 for playback (int16 / 32768).
///
/// A trailing odd byte is ignored.
pub fn pcm16_to_float(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]) as f32 / 32768.0)
        .collect()
}

/// Reconstruct float samples that re-encode to exactly the same bytes.
///
/// Each sample maps to the middle of the float interval that
/// [`pcm_from_float_samples`] truncates to it, using the same asymmetric
/// scale, clamped to [-1, 1].
pub fn dequantize_pcm16(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(2)
        .map(|pair| {
            let v = i16::from_le_bytes([pair[0], pair[1]]) as f32;
            let s = if v > 0.0 {
                (v + 0.5) / 32767.0
            } else if v < 0.0 {
                (v - 0.5) / 32768.0
            } else {
                0.0
            };
            s.clamp(-1.0, 1.0)
        })
        .collect()
}

/// Base64-encode a payload for the JSON envelope
pub fn encode_base64(bytes: &[u8]) -> String {
    sanitize_base64(&base64::engine::general_purpose::STANDARD.encode(bytes))
}

/// Strip control characters (CR, LF, ...) that would corrupt the envelope.
pub fn sanitize_base64(data: &str) -> String {
    if !data.chars().any(char::is_control) {
        return data.to_string();
    }
    data.chars().filter(|c| !c.is_control()).collect()
}
