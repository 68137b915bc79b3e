use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::media::sanitize_base64;

/// Response modality requested in the setup frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResponseModality {
    Text,
    Audio,
}

/// Setup frame sent once the socket opens
#[derive(Debug, Serialize)]
pub struct SetupMessage {
    pub setup: Setup,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Setup {
    pub model: String,
    pub generation_config: GenerationConfig,
    pub system_instruction: Content,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_modalities: Vec<ResponseModality>,
    pub temperature: f32,
    pub max_output_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speech_config: Option<SpeechConfig>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechConfig {
    pub voice_config: VoiceConfig,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceConfig {
    pub prebuilt_voice_config: PrebuiltVoiceConfig,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrebuiltVoiceConfig {
    pub voice_name: String,
}

impl SpeechConfig {
    pub fn voice(name: impl Into<String>) -> Self {
        Self {
            voice_config: VoiceConfig {
                prebuilt_voice_config: PrebuiltVoiceConfig {
                    voice_name: name.into(),
                },
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    pub parts: Vec<TextPart>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextPart {
    pub text: String,
}

impl Content {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            parts: vec![TextPart { text: text.into() }],
        }
    }
}

/// Kind of payload carried by an outbound frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Audio,
    Text,
}

/// A payload produced by a pump, consumed immediately by the session
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundFrame {
    pub kind: MediaKind,
    /// Base64 payload for media, plain text for `MediaKind::Text`
    pub data: String,
    pub mime_type: String,
}

impl OutboundFrame {
    /// Base64 JPEG camera frame
    pub fn video_jpeg(data: &str) -> Self {
        Self {
            kind: MediaKind::Video,
            data: sanitize_base64(data),
            mime_type: "image/jpeg".to_string(),
        }
    }

    /// Base64 little-endian PCM16 mono audio
    pub fn audio_pcm(data: &str, sample_rate: u32) -> Self {
        Self {
            kind: MediaKind::Audio,
            data: sanitize_base64(data),
            mime_type: format!("audio/pcm;rate={}", sample_rate),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: MediaKind::Text,
            data: text.into(),
            mime_type: "text/plain".to_string(),
        }
    }

    /// Wrap in the realtime input envelope
    pub fn into_message(self) -> RealtimeInputMessage {
        let realtime_input = match self.kind {
            MediaKind::Video => RealtimeInput::Video(Blob {
                mime_type: self.mime_type,
                data: self.data,
            }),
            MediaKind::Audio => RealtimeInput::Audio(Blob {
                mime_type: self.mime_type,
                data: self.data,
            }),
            MediaKind::Text => RealtimeInput::Text(self.data),
        };
        RealtimeInputMessage { realtime_input }
    }
}

/// `{ "realtimeInput": { "video" | "audio" | "text": ... } }`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RealtimeInputMessage {
    pub realtime_input: RealtimeInput,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RealtimeInput {
    Video(Blob),
    Audio(Blob),
    Text(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blob {
    #[serde(alias = "mime_type")]
    pub mime_type: String,
    pub data: String,
}

/// Raw server frame. Keys drifted between protocol iterations, so both
/// spellings are accepted.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServerMessage {
    #[serde(alias = "setup_complete")]
    setup_complete: Option<Value>,
    #[serde(alias = "server_content")]
    server_content: Option<ServerContent>,
    state: Option<StateUpdate>,
    error: Option<ErrorBody>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServerContent {
    #[serde(alias = "model_turn")]
    model_turn: Option<Turn>,
    /// Older iterations put parts directly under serverContent
    parts: Option<Vec<Part>>,
    #[serde(default, alias = "turn_complete")]
    turn_complete: bool,
}

#[derive(Debug, Default, Deserialize)]
struct Turn {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    text: Option<String>,
    #[serde(alias = "inline_data", alias = "audio_part")]
    inline_data: Option<Blob>,
}

#[derive(Debug, Deserialize)]
struct StateUpdate {
    state: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/// A parsed server frame
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    /// Setup acknowledged; media may now be sent
    SetupAck,
    /// Model output for the current turn
    ContentDelta {
        /// Text parts in index order
        texts: Vec<String>,
        /// Base64 PCM16 audio parts in index order
        audio: Vec<String>,
        turn_complete: bool,
    },
    /// Server ended the session; the socket stays open
    SessionEnded,
    /// Protocol-level error reported by the server
    Error { message: String },
    /// Anything else (usage metadata, other state updates, ...)
    Ignored,
}

impl InboundMessage {
    /// Parse a server frame
    pub fn parse(raw: &str) -> serde_json::Result<Self> {
        let msg: ServerMessage = serde_json::from_str(raw)?;
        Ok(Self::from_server(msg))
    }

    fn from_server(msg: ServerMessage) -> Self {
        if let Some(ack) = msg.setup_complete {
            if !matches!(ack, Value::Null | Value::Bool(false)) {
                return Self::SetupAck;
            }
        }

        if let Some(content) = msg.server_content {
            let parts = content
                .model_turn
                .map(|turn| turn.parts)
                .or(content.parts)
                .unwrap_or_default();

            let mut texts = Vec::new();
            let mut audio = Vec::new();
            for part in parts {
                if let Some(text) = part.text.filter(|t| !t.is_empty()) {
                    texts.push(text);
                }
                if let Some(blob) = part.inline_data {
                    if blob.mime_type.starts_with("audio/") {
                        audio.push(blob.data);
                    }
                }
            }

            return Self::ContentDelta {
                texts,
                audio,
                turn_complete: content.turn_complete,
            };
        }

        if let Some(state) = msg.state {
            if state.state == "ENDED" {
                return Self::SessionEnded;
            }
            return Self::Ignored;
        }

        if let Some(error) = msg.error {
            return Self::Error {
                message: error.message,
            };
        }

        Self::Ignored
    }

    /// All text parts concatenated into one utterance
    pub fn combined_text(&self) -> Option<String> {
        match self {
            Self::ContentDelta { texts, .. } if !texts.is_empty() => Some(texts.concat()),
            _ => None,
        }
    }
}
