use anyhow::Result;
use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::MediaSink;
use crate::camera::CameraSource;
use crate::media::FrameEncoder;
use crate::protocol::OutboundFrame;

/// Configuration for the camera pump
#[derive(Debug, Clone)]
pub struct CameraPumpConfig {
    /// Minimum time between sampled frames
    /// Default: 1 second (the endpoint recommends 1 fps)
    pub frame_interval: Duration,
}

impl Default for CameraPumpConfig {
    fn default() -> Self {
        Self {
            frame_interval: Duration::from_secs(1),
        }
    }
}

struct EncodedFrame {
    generation: u64,
    result: Result<String>,
}

/// Samples the camera at a bounded cadence and streams JPEG frames
///
/// Encodes complete asynchronously. Each capture run has a generation
/// token; an encode that resolves after `stop()` (or after a restart)
/// carries a stale token and is discarded instead of transmitted.
pub struct CameraPump {
    config: CameraPumpConfig,
    camera: Box<dyn CameraSource>,
    encoder: Arc<dyn FrameEncoder>,
    capturing: bool,
    generation: u64,
    last_frame: Option<Instant>,
    pending: FuturesUnordered<BoxFuture<'static, EncodedFrame>>,
    frames_encoded: usize,
    frames_discarded: usize,
}

impl CameraPump {
    pub fn new(
        config: CameraPumpConfig,
        camera: Box<dyn CameraSource>,
        encoder: Arc<dyn FrameEncoder>,
    ) -> Self {
        info!(
            "Camera pump initialized: {} (every {:?})",
            camera.name(),
            config.frame_interval
        );

        Self {
            config,
            camera,
            encoder,
            capturing: false,
            generation: 0,
            last_frame: None,
            pending: FuturesUnordered::new(),
            frames_encoded: 0,
            frames_discarded: 0,
        }
    }

    /// Start sampling; the first frame is taken one interval after `now`
    pub fn start(&mut self, now: Instant) {
        if self.capturing {
            debug!("Camera pump already capturing");
            return;
        }
        self.capturing = true;
        self.generation += 1;
        self.last_frame = Some(now);
        info!("Started frame capture");
    }

    /// Stop sampling. Encodes still in flight will be discarded.
    pub fn stop(&mut self) {
        if !self.capturing {
            return;
        }
        self.capturing = false;
        self.generation += 1;
        info!("Stopped frame capture");
    }

    pub fn is_capturing(&self) -> bool {
        self.capturing
    }

    /// Encodes started but not yet delivered
    pub fn in_flight(&self) -> usize {
        self.pending.len()
    }

    /// Frames whose encode completed (delivered or discarded)
    pub fn frames_encoded(&self) -> usize {
        self.frames_encoded
    }

    /// Completed encodes dropped because they belonged to a stopped capture
    pub fn frames_discarded(&self) -> usize {
        self.frames_discarded
    }

    pub fn tick(&mut self, now: Instant, sink: &mut dyn MediaSink) {
        self.deliver_completed(sink);

        if !self.capturing || !sink.is_session_active() {
            return;
        }

        let due = self
            .last_frame
            .map_or(true, |last| now.saturating_duration_since(last) >= self.config.frame_interval);
        if !due {
            return;
        }
        self.last_frame = Some(now);

        let Some(frame) = self.camera.latest_frame() else {
            debug!("Camera texture not available");
            return;
        };

        let encoder = Arc::clone(&self.encoder);
        let generation = self.generation;
        self.pending.push(
            async move {
                EncodedFrame {
                    generation,
                    result: encoder.encode(frame).await,
                }
            }
            .boxed(),
        );
    }

    /// Poll finished encodes without blocking and forward the current ones
    fn deliver_completed(&mut self, sink: &mut dyn MediaSink) {
        while let Some(Some(done)) = self.pending.next().now_or_never() {
            self.frames_encoded += 1;

            if done.generation != self.generation || !self.capturing {
                debug!("Discarding frame encoded for a stopped capture");
                self.frames_discarded += 1;
                continue;
            }

            match done.result {
                Ok(data) => {
                    sink.send_media(OutboundFrame::video_jpeg(&data));
                }
                Err(e) => warn!("Error encoding camera frame: {:#}", e),
            }
        }
    }
}
