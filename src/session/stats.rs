use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::state::SessionState;

/// Statistics about a live session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStats {
    /// Client-side session identifier
    pub session_id: String,

    /// Current session state
    pub state: SessionState,

    /// When the current socket opened, if it is open
    pub connected_at: Option<DateTime<Utc>>,

    /// Reconnection attempts made in the current reconnect cycle
    pub reconnect_attempts: u32,

    /// Camera frames transmitted
    pub video_frames_sent: usize,

    /// Audio payloads transmitted
    pub audio_chunks_sent: usize,

    /// PCM bytes transmitted (before base64)
    pub audio_bytes_sent: usize,

    /// Text inputs transmitted
    pub text_messages_sent: usize,

    /// Outbound frames dropped because the session was not active or the send failed
    pub frames_dropped: usize,

    /// Model utterances received
    pub responses_received: usize,
}

/// One combined model utterance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseSegment {
    /// Concatenated text of all parts in the message
    pub text: String,

    /// When this segment was received
    pub timestamp: DateTime<Utc>,

    /// Whether the server marked the turn complete with this message
    pub turn_complete: bool,
}
