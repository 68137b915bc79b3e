use anyhow::{Context, Result};
use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;
use tracing::debug;

use super::encoder::encode_base64;
use crate::camera::CameraFrame;

/// Asynchronous camera frame encoder
///
/// Implementations resolve to a sanitized base64 string ready for the
/// realtime input envelope. Encoding cannot be cancelled once started.
#[async_trait::async_trait]
pub trait FrameEncoder: Send + Sync {
    async fn encode(&self, frame: CameraFrame) -> Result<String>;

    /// MIME type of the encoded payload
    fn mime_type(&self) -> &'static str {
        "image/jpeg"
    }
}

/// JPEG encoder backed by the `image` crate.
///
/// Compression runs on the blocking pool so the tick loop never waits on it.
#[derive(Debug, Clone)]
pub struct JpegFrameEncoder {
    quality: u8,
}

impl JpegFrameEncoder {
    /// Create an encoder with the given JPEG quality (1-100)
    pub fn new(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }

    /// Encode a frame synchronously to raw JPEG bytes
    pub fn encode_jpeg(frame: &CameraFrame, quality: u8) -> Result<Vec<u8>> {
        let image = RgbImage::from_raw(frame.width, frame.height, frame.pixels.to_vec())
            .with_context(|| {
                format!(
                    "Frame buffer of {} bytes does not match {}x{} RGB8",
                    frame.pixels.len(),
                    frame.width,
                    frame.height
                )
            })?;

        let mut jpeg = Vec::new();
        JpegEncoder::new_with_quality(&mut jpeg, quality)
            .encode_image(&image)
            .context("Failed to compress camera frame")?;

        Ok(jpeg)
    }
}

impl Default for JpegFrameEncoder {
    fn default() -> Self {
        // Low quality keeps frames small enough for a 1 fps stream
        Self::new(40)
    }
}

#[async_trait::async_trait]
impl FrameEncoder for JpegFrameEncoder {
    async fn encode(&self, frame: CameraFrame) -> Result<String> {
        let quality = self.quality;
        let jpeg = tokio::task::spawn_blocking(move || Self::encode_jpeg(&frame, quality))
            .await
            .context("JPEG encode task panicked")??;

        debug!("Encoded camera frame ({} bytes JPEG)", jpeg.len());

        Ok(encode_base64(&jpeg))
    }
}
