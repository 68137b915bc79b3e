//! Conversion of raw camera frames and microphone samples into wire payloads
//!
//! - Float samples → little-endian PCM16 bytes
//! - PCM16 bytes → float samples for playback
//! - Base64 encoding with control-character sanitation
//! - Asynchronous JPEG encoding of camera frames

pub mod encoder;
pub mod jpeg;

pub use encoder::{
    dequantize_pcm16, encode_base64, pcm16_to_float, pcm_from_float_samples, sanitize_base64,
};
pub use jpeg::{FrameEncoder, JpegFrameEncoder};
