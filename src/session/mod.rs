//! Live session management
//!
//! This module provides the `SessionClient` abstraction that manages:
//! - The socket connection to the live endpoint
//! - The setup handshake gating media transmission
//! - Fixed-interval reconnection after unexpected closures
//! - Inbound message dispatch to text, speech and audio collaborators
//! - Session statistics and state management

mod client;
mod config;
mod reconnect;
mod state;
mod stats;

pub use client::{SessionClient, SessionClientBuilder, RESPONSE_AUDIO_SAMPLE_RATE};
pub use config::{SessionConfig, DEFAULT_ENDPOINT};
pub use reconnect::{ReconnectPolicy, ReconnectStep};
pub use state::SessionState;
pub use stats::{ResponseSegment, SessionStats};
