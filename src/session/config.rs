use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::protocol::ResponseModality;

/// Default live endpoint (BidiGenerateContent over WebSocket)
pub const DEFAULT_ENDPOINT: &str = "wss://generativelanguage.googleapis.com/ws/google.ai.generativelanguage.v1beta.GenerativeService.BidiGenerateContent";

/// Configuration for a live streaming session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Client-side session identifier used in logs (e.g., "live-3f2c...")
    pub session_id: String,

    /// API key for the live endpoint; empty means not configured
    pub api_key: String,

    /// WebSocket endpoint, without the key query parameter
    pub endpoint: String,

    /// Model identifier, with or without the "models/" prefix
    pub model: String,

    /// Requested response modalities
    /// Default: ["TEXT"]
    pub response_modalities: Vec<ResponseModality>,

    /// Sampling temperature
    pub temperature: f32,

    /// Cap on generated tokens per turn
    pub max_output_tokens: u32,

    /// Prebuilt voice name for audio responses
    pub voice: Option<String>,

    /// System instruction (assistant personality)
    pub system_instruction: String,

    /// Reconnection attempts before giving up
    pub max_reconnect_attempts: u32,

    /// Fixed delay between reconnection attempts, in seconds
    pub reconnect_interval_secs: f32,

    /// Sample rate of outbound PCM audio (the endpoint expects 16kHz)
    pub audio_sample_rate: u32,
}

impl SessionConfig {
    pub fn reconnect_interval(&self) -> Duration {
        Duration::from_secs_f32(self.reconnect_interval_secs.max(0.0))
    }

    /// Model name as sent in the setup frame
    pub fn qualified_model(&self) -> String {
        if self.model.starts_with("models/") {
            self.model.clone()
        } else {
            format!("models/{}", self.model)
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_id: format!("live-{}", uuid::Uuid::new_v4()),
            api_key: String::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: "gemini-2.0-flash-live-001".to_string(),
            response_modalities: vec![ResponseModality::Text],
            temperature: 0.2,
            max_output_tokens: 1024,
            voice: None,
            system_instruction: "You are a helpful AI assistant for Snap Spectacles. \
                Keep responses concise and under 30 words. Be a little funny and keep it positive."
                .to_string(),
            max_reconnect_attempts: 5,
            reconnect_interval_secs: 3.0,
            audio_sample_rate: 16000, // Live endpoint input rate
        }
    }
}
