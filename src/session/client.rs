use base64::Engine;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use url::Url;

use super::config::SessionConfig;
use super::reconnect::{ReconnectPolicy, ReconnectStep};
use super::state::SessionState;
use super::stats::{ResponseSegment, SessionStats};
use crate::audio::AudioOutput;
use crate::clock::Tick;
use crate::error::ClientError;
use crate::media::pcm16_to_float;
use crate::protocol::messages::{Content, Setup, SpeechConfig};
use crate::protocol::{
    GenerationConfig, InboundMessage, MediaKind, OutboundFrame, ResponseModality, SetupMessage,
};
use crate::pump::MediaSink;
use crate::sinks::{LogTextSink, SpeechSink, TextSink};
use crate::transport::{Socket, SocketEvent, SocketFactory};

/// Sample rate of audio parts returned by the live endpoint
pub const RESPONSE_AUDIO_SAMPLE_RATE: u32 = 24000;

#[derive(Debug, Default, Clone, Copy)]
struct Counters {
    video_frames_sent: usize,
    audio_chunks_sent: usize,
    audio_bytes_sent: usize,
    text_messages_sent: usize,
    frames_dropped: usize,
    responses_received: usize,
}

/// Client for one logical live streaming session with automatic recovery.
///
/// All methods run on the scheduler thread. Socket events are drained in
/// [`SessionClient::tick`] (or pushed directly with
/// [`SessionClient::handle_event`]), so no handler ever re-enters another.
pub struct SessionClient {
    config: SessionConfig,
    transport: Option<Arc<dyn SocketFactory>>,
    socket: Option<Box<dyn Socket>>,
    state: SessionState,
    policy: ReconnectPolicy,
    status: Box<dyn TextSink>,
    output: Box<dyn TextSink>,
    speech: Option<Box<dyn SpeechSink>>,
    audio_output: Option<Box<dyn AudioOutput>>,
    status_text: String,
    connected_at: Option<chrono::DateTime<Utc>>,
    counters: Counters,
    responses: Vec<ResponseSegment>,
}

/// Wires collaborators into a [`SessionClient`]
pub struct SessionClientBuilder {
    config: SessionConfig,
    transport: Option<Arc<dyn SocketFactory>>,
    status: Option<Box<dyn TextSink>>,
    output: Option<Box<dyn TextSink>>,
    speech: Option<Box<dyn SpeechSink>>,
    audio_output: Option<Box<dyn AudioOutput>>,
}

impl SessionClientBuilder {
    pub fn transport(mut self, factory: Arc<dyn SocketFactory>) -> Self {
        self.transport = Some(factory);
        self
    }

    pub fn status_sink(mut self, sink: Box<dyn TextSink>) -> Self {
        self.status = Some(sink);
        self
    }

    pub fn output_sink(mut self, sink: Box<dyn TextSink>) -> Self {
        self.output = Some(sink);
        self
    }

    pub fn speech_sink(mut self, sink: Box<dyn SpeechSink>) -> Self {
        self.speech = Some(sink);
        self
    }

    pub fn audio_output(mut self, output: Box<dyn AudioOutput>) -> Self {
        self.audio_output = Some(output);
        self
    }

    pub fn build(self) -> SessionClient {
        let policy = ReconnectPolicy::new(
            self.config.max_reconnect_attempts,
            self.config.reconnect_interval(),
        );

        info!("Creating live session client: {}", self.config.session_id);

        SessionClient {
            config: self.config,
            transport: self.transport,
            socket: None,
            state: SessionState::Disconnected,
            policy,
            status: self
                .status
                .unwrap_or_else(|| Box::new(LogTextSink::new("status"))),
            output: self
                .output
                .unwrap_or_else(|| Box::new(LogTextSink::new("assistant"))),
            speech: self.speech,
            audio_output: self.audio_output,
            status_text: String::new(),
            connected_at: None,
            counters: Counters::default(),
            responses: Vec::new(),
        }
    }
}

impl SessionClient {
    pub fn builder(config: SessionConfig) -> SessionClientBuilder {
        SessionClientBuilder {
            config,
            transport: None,
            status: None,
            output: None,
            speech: None,
            audio_output: None,
        }
    }

    /// Open the session. No-op while a socket already exists.
    ///
    /// Configuration errors are reported through the status text and
    /// returned; they never schedule a reconnection. Transport failures are
    /// handled by the reconnection policy and return `Ok`.
    pub fn connect(&mut self) -> Result<(), ClientError> {
        if self.state.has_socket() {
            debug!("Already connected to live endpoint");
            return Ok(());
        }

        if self.state == SessionState::Failed {
            info!("Retrying after exhausted reconnection");
            self.policy.reset();
            self.transition(SessionState::Disconnected);
        } else if self.policy.is_reconnecting() {
            // Explicit attempt replaces the pending one
            info!("Connecting now; pending reconnection cancelled");
            self.policy.reset();
        }

        self.open_socket()
    }

    /// Close the session and cancel any pending reconnection. Idempotent.
    pub fn disconnect(&mut self) {
        self.policy.reset();

        match self.socket.take() {
            Some(mut socket) => {
                info!("Disconnecting from live endpoint");
                socket.close();
            }
            None if self.state == SessionState::Disconnected => {
                debug!("Not connected to live endpoint");
                return;
            }
            None => {}
        }

        self.connected_at = None;
        self.transition(SessionState::Disconnected);
        self.set_status("Disconnected");
    }

    /// Drain socket events, then advance the reconnect countdown
    pub fn tick(&mut self, tick: Tick) {
        while let Some(event) = self.socket.as_mut().and_then(|s| s.poll_event()) {
            self.handle_event(event);
        }

        match self.policy.tick(tick.delta) {
            ReconnectStep::Idle | ReconnectStep::Waiting => {}
            ReconnectStep::Attempt(attempt) => self.attempt_reconnect(attempt),
            ReconnectStep::Exhausted => self.fail(),
        }
    }

    /// Dispatch one socket event
    pub fn handle_event(&mut self, event: SocketEvent) {
        match event {
            SocketEvent::Open => self.on_open(),
            SocketEvent::Message(raw) => self.on_message(&raw),
            SocketEvent::Error(message) => self.on_error(&message),
            SocketEvent::Closed => self.on_close(),
        }
    }

    /// Send user text through the realtime input envelope
    pub fn send_text(&mut self, text: &str) -> bool {
        self.send_media(OutboundFrame::text(text))
    }

    /// True only when the socket is open and setup was acknowledged
    pub fn is_session_active(&self) -> bool {
        self.state == SessionState::Active
    }

    /// True while the socket is open
    pub fn is_connected(&self) -> bool {
        self.state.is_open()
    }

    /// True while a socket exists (opening or open)
    pub fn has_socket(&self) -> bool {
        self.socket.is_some()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_reconnecting(&self) -> bool {
        self.policy.is_reconnecting()
    }

    pub fn reconnect_attempts(&self) -> u32 {
        self.policy.attempts()
    }

    /// Last status text reported
    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Model utterances received so far, in arrival order
    pub fn responses(&self) -> &[ResponseSegment] {
        &self.responses
    }

    pub fn stats(&self) -> SessionStats {
        SessionStats {
            session_id: self.config.session_id.clone(),
            state: self.state,
            connected_at: self.connected_at,
            reconnect_attempts: self.policy.attempts(),
            video_frames_sent: self.counters.video_frames_sent,
            audio_chunks_sent: self.counters.audio_chunks_sent,
            audio_bytes_sent: self.counters.audio_bytes_sent,
            text_messages_sent: self.counters.text_messages_sent,
            frames_dropped: self.counters.frames_dropped,
            responses_received: self.counters.responses_received,
        }
    }

    pub(crate) fn set_status(&mut self, status: &str) {
        self.status_text = status.to_string();
        self.status.set_text(status);
    }

    fn transition(&mut self, next: SessionState) {
        if self.state != next {
            debug!(
                session = %self.config.session_id,
                "Session state {} -> {}", self.state, next
            );
            self.state = next;
        }
    }

    fn endpoint_url(&self) -> Result<Url, ClientError> {
        Url::parse_with_params(
            &self.config.endpoint,
            &[("key", self.config.api_key.as_str())],
        )
        .map_err(|e| ClientError::InvalidEndpoint(e.to_string()))
    }

    fn open_socket(&mut self) -> Result<(), ClientError> {
        if self.config.api_key.trim().is_empty() {
            error!("API key is missing. Please provide a valid API key.");
            return Err(self.report(ClientError::MissingApiKey));
        }

        let Some(factory) = self.transport.clone() else {
            error!("No socket factory configured");
            return Err(self.report(ClientError::MissingTransport));
        };

        let url = match self.endpoint_url() {
            Ok(url) => url,
            Err(e) => {
                error!("{}", e);
                return Err(self.report(e));
            }
        };

        info!("Connecting to live endpoint: {}", self.config.model);
        self.set_status("Connecting...");

        match factory.open(url.as_str()) {
            Ok(socket) => {
                self.socket = Some(socket);
                self.transition(SessionState::Connecting);
            }
            Err(e) => {
                error!("Error creating socket: {:#}", e);
                self.set_status("Connection failed");
                self.schedule_reconnect();
            }
        }

        Ok(())
    }

    fn report(&mut self, error: ClientError) -> ClientError {
        self.set_status(&error.status_text());
        error
    }

    fn on_open(&mut self) {
        info!("Live endpoint connection established");
        self.policy.reset();
        self.connected_at = Some(Utc::now());
        self.set_status("Connected");
        self.send_setup();
    }

    fn send_setup(&mut self) {
        let speech_config = match (&self.config.voice, self.wants_audio()) {
            (Some(voice), true) => Some(SpeechConfig::voice(voice.clone())),
            _ => None,
        };

        let setup = SetupMessage {
            setup: Setup {
                model: self.config.qualified_model(),
                generation_config: GenerationConfig {
                    response_modalities: self.config.response_modalities.clone(),
                    temperature: self.config.temperature,
                    max_output_tokens: self.config.max_output_tokens,
                    speech_config,
                },
                system_instruction: Content::text(self.config.system_instruction.clone()),
            },
        };

        let sent = serde_json::to_string(&setup)
            .map_err(anyhow::Error::from)
            .and_then(|text| match self.socket.as_mut() {
                Some(socket) => socket.send_text(text),
                None => Err(anyhow::anyhow!("socket missing")),
            });

        match sent {
            Ok(()) => {
                debug!("Sent setup message");
                self.transition(SessionState::SetupSent);
                self.set_status("Session setup");
            }
            Err(e) => {
                error!("Error setting up session: {:#}", e);
                if let Some(mut socket) = self.socket.take() {
                    socket.close();
                }
                self.on_close();
                if self.state != SessionState::Failed {
                    self.set_status("Setup failed");
                }
            }
        }
    }

    fn wants_audio(&self) -> bool {
        self.config
            .response_modalities
            .contains(&ResponseModality::Audio)
    }

    fn on_message(&mut self, raw: &str) {
        if raw.trim().is_empty() {
            return;
        }

        match InboundMessage::parse(raw) {
            Ok(message) => self.dispatch(message),
            Err(e) => warn!("Error processing message: {}", e),
        }
    }

    fn dispatch(&mut self, message: InboundMessage) {
        match message {
            InboundMessage::SetupAck => {
                if self.state != SessionState::SetupSent {
                    warn!("setupComplete received while {}", self.state);
                    return;
                }
                info!("Setup acknowledged; session active");
                self.transition(SessionState::Active);
                self.set_status("Session active");
            }
            InboundMessage::ContentDelta {
                ref audio,
                turn_complete,
                ..
            } => {
                if let Some(text) = message.combined_text() {
                    debug!("Model response: {}", text);
                    self.output.set_text(&text);
                    if let Some(speech) = self.speech.as_mut() {
                        speech.speak(&text);
                    }
                    self.counters.responses_received += 1;
                    self.responses.push(ResponseSegment {
                        text,
                        timestamp: Utc::now(),
                        turn_complete,
                    });
                }
                self.play_audio(audio);
            }
            InboundMessage::SessionEnded => {
                if matches!(self.state, SessionState::Active | SessionState::SetupSent) {
                    info!("Session ended by server");
                    self.transition(SessionState::Ended);
                    self.set_status("Session ended");
                }
            }
            InboundMessage::Error { message } => {
                error!("Live endpoint error: {}", message);
                self.set_status(&format!("Error: {}", message));
            }
            InboundMessage::Ignored => debug!("Ignoring server message"),
        }
    }

    fn play_audio(&mut self, parts: &[String]) {
        let Some(output) = self.audio_output.as_mut() else {
            if !parts.is_empty() {
                debug!("No audio output; dropping {} audio parts", parts.len());
            }
            return;
        };

        for data in parts {
            match base64::engine::general_purpose::STANDARD.decode(data) {
                Ok(pcm) => output.play(&pcm16_to_float(&pcm), RESPONSE_AUDIO_SAMPLE_RATE),
                Err(e) => warn!("Error decoding audio response: {}", e),
            }
        }
    }

    fn on_error(&mut self, message: &str) {
        error!("Socket error: {}", message);
        self.set_status("Connection error");
    }

    fn on_close(&mut self) {
        info!("Live endpoint connection closed");
        self.socket = None;
        self.connected_at = None;
        self.transition(SessionState::Disconnected);
        self.set_status("Disconnected");
        self.schedule_reconnect();
    }

    fn schedule_reconnect(&mut self) {
        if self.policy.is_reconnecting() {
            if self.policy.is_exhausted() {
                self.fail();
            }
            return;
        }

        self.policy.begin();
        info!(
            "Starting reconnection process (every {:?}, max {} attempts)",
            self.policy.interval(),
            self.policy.max_attempts()
        );
        self.set_status("Reconnecting...");
    }

    fn attempt_reconnect(&mut self, attempt: u32) {
        if self.state.is_open() {
            return;
        }

        if self.socket.take().is_some() {
            debug!("Abandoning stalled connection attempt");
            self.transition(SessionState::Disconnected);
        }

        let max = self.policy.max_attempts();
        info!("Attempting to reconnect ({}/{})...", attempt, max);
        self.set_status(&format!("Reconnecting ({}/{})...", attempt, max));

        if let Err(e) = self.open_socket() {
            warn!("Reconnect attempt failed: {}", e);
        }
    }

    fn fail(&mut self) {
        warn!("Maximum reconnection attempts reached");
        self.policy.cancel();
        if let Some(mut socket) = self.socket.take() {
            socket.close();
        }
        self.transition(SessionState::Failed);
        self.set_status("Reconnection failed");
    }
}

impl MediaSink for SessionClient {
    fn is_session_active(&self) -> bool {
        SessionClient::is_session_active(self)
    }

    fn send_media(&mut self, frame: OutboundFrame) -> bool {
        let kind = frame.kind;

        if self.state != SessionState::Active {
            debug!("Cannot send {:?} frame: session not ready", kind);
            self.counters.frames_dropped += 1;
            return false;
        }

        let Some(socket) = self.socket.as_mut() else {
            self.counters.frames_dropped += 1;
            return false;
        };

        let payload_bytes = decoded_len(&frame.data);
        let result = serde_json::to_string(&frame.into_message())
            .map_err(anyhow::Error::from)
            .and_then(|text| socket.send_text(text));

        if let Err(e) = result {
            error!("Error sending {:?} frame: {:#}", kind, e);
            self.counters.frames_dropped += 1;
            return false;
        }

        match kind {
            MediaKind::Video => self.counters.video_frames_sent += 1,
            MediaKind::Audio => {
                self.counters.audio_chunks_sent += 1;
                self.counters.audio_bytes_sent += payload_bytes;
            }
            MediaKind::Text => self.counters.text_messages_sent += 1,
        }
        true
    }
}

/// Byte length of a padded base64 payload once decoded
fn decoded_len(data: &str) -> usize {
    let padding = data.bytes().rev().take_while(|&b| b == b'=').count();
    (data.len() / 4 * 3).saturating_sub(padding)
}
