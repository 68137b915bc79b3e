use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{info, warn};

use crate::clock::Tick;
use crate::pump::{AudioPump, CameraPump};
use crate::session::{SessionClient, SessionStats};

/// Externally visible assistant lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssistantState {
    Idle,
    /// Pumps running, waiting for the session handshake
    Starting,
    Active,
    Stopped,
}

/// Binds the user-facing toggle to the pumps and the session
pub struct Controller {
    session: SessionClient,
    camera: CameraPump,
    audio: AudioPump,
    state: AssistantState,
}

impl Controller {
    pub fn new(session: SessionClient, camera: CameraPump, audio: AudioPump) -> Self {
        Self {
            session,
            camera,
            audio,
            state: AssistantState::Idle,
        }
    }

    /// Connect if needed and start both pumps without waiting for the
    /// handshake; the pumps gate themselves on the session
    pub fn start(&mut self, now: Instant) {
        if matches!(self.state, AssistantState::Starting | AssistantState::Active) {
            self.session.set_status("Assistant already running");
            return;
        }

        info!("Starting assistant");

        if !self.session.has_socket() {
            if let Err(e) = self.session.connect() {
                warn!("Assistant starting without a session: {}", e);
            }
        }

        self.camera.start(now);
        self.audio.start(now);

        self.state = if self.session.is_session_active() {
            AssistantState::Active
        } else {
            AssistantState::Starting
        };
    }

    /// Stop both pumps. The session stays open so a later start is fast.
    pub fn stop(&mut self) {
        if !matches!(self.state, AssistantState::Starting | AssistantState::Active) {
            self.session.set_status("Assistant already stopped");
            return;
        }

        info!("Stopping assistant");

        self.camera.stop();
        self.audio.stop(&mut self.session);

        self.state = AssistantState::Stopped;
        self.session.set_status("Assistant stopped");
    }

    /// Flip between running and stopped
    pub fn toggle(&mut self, now: Instant) {
        match self.state {
            AssistantState::Starting | AssistantState::Active => self.stop(),
            AssistantState::Idle | AssistantState::Stopped => self.start(now),
        }
    }

    /// Advance the session, then both pumps
    pub fn tick(&mut self, tick: Tick) {
        self.session.tick(tick);
        self.camera.tick(tick.now, &mut self.session);
        self.audio.tick(tick.now, &mut self.session);

        if self.state == AssistantState::Starting && self.session.is_session_active() {
            info!("Assistant active");
            self.state = AssistantState::Active;
        }
    }

    /// Send typed user text to the model
    pub fn send_text(&mut self, text: &str) -> bool {
        self.session.send_text(text)
    }

    /// Stop the pumps and close the session
    pub fn shutdown(&mut self) -> SessionStats {
        if matches!(self.state, AssistantState::Starting | AssistantState::Active) {
            self.stop();
        }
        self.session.disconnect();
        self.session.stats()
    }

    pub fn state(&self) -> AssistantState {
        self.state
    }

    pub fn session(&self) -> &SessionClient {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut SessionClient {
        &mut self.session
    }

    pub fn camera(&self) -> &CameraPump {
        &self.camera
    }

    pub fn audio(&self) -> &AudioPump {
        &self.audio
    }
}
