//! Periodic producers that sample a device and forward encoded media
//!
//! Pumps never own the session. They borrow it for the duration of a tick
//! through [`MediaSink`], query whether it is active and submit frames.

pub mod audio;
pub mod camera;

pub use audio::{AudioPump, AudioPumpConfig};
pub use camera::{CameraPump, CameraPumpConfig};

use crate::protocol::OutboundFrame;

/// Destination for pump output
pub trait MediaSink {
    /// The single gate every pump checks before sampling
    fn is_session_active(&self) -> bool;

    /// Submit a frame. Returns false if it was dropped.
    fn send_media(&mut self, frame: OutboundFrame) -> bool;
}
