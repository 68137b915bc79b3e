//! Camera frame types and sources
//!
//! The camera is pull-based: a pump asks for the latest frame at its own
//! cadence instead of receiving every frame the device produces.

use std::sync::Arc;
use std::time::Instant;

/// A single RGB8 camera frame
#[derive(Debug, Clone)]
pub struct CameraFrame {
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Packed RGB8 pixels, row-major, `width * height * 3` bytes
    pub pixels: Arc<[u8]>,
    /// Milliseconds since the source started
    pub timestamp_ms: u64,
}

/// Camera capture provider
pub trait CameraSource: Send {
    /// Latest available frame, or `None` if the camera has not produced one yet
    fn latest_frame(&mut self) -> Option<CameraFrame>;

    /// Source name for logging
    fn name(&self) -> &str;
}

/// Synthetic camera producing a moving gradient.
///
/// Used by the demo binary when no real camera is attached.
pub struct TestPatternCamera {
    width: u32,
    height: u32,
    started: Instant,
}

impl TestPatternCamera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            started: Instant::now(),
        }
    }
}

impl CameraSource for TestPatternCamera {
    fn latest_frame(&mut self) -> Option<CameraFrame> {
        let elapsed_ms = self.started.elapsed().as_millis() as u64;
        let shift = (elapsed_ms / 20) as u32;

        let mut pixels = Vec::with_capacity((self.width * self.height * 3) as usize);
        for y in 0..self.height {
            for x in 0..self.width {
                pixels.push(((x + shift) % 256) as u8);
                pixels.push(((y + shift / 2) % 256) as u8);
                pixels.push(((x + y) % 256) as u8);
            }
        }

        Some(CameraFrame {
            width: self.width,
            height: self.height,
            pixels: pixels.into(),
            timestamp_ms: elapsed_ms,
        })
    }

    fn name(&self) -> &str {
        "test-pattern"
    }
}
