// Shared test doubles for the session, pumps and controller tests
#![allow(dead_code)]

use anyhow::{bail, Result};
use async_trait::async_trait;
use lens_live::audio::{AudioChunk, AudioOutput, MicrophoneSource};
use lens_live::camera::{CameraFrame, CameraSource};
use lens_live::clock::Tick;
use lens_live::media::FrameEncoder;
use lens_live::protocol::OutboundFrame;
use lens_live::pump::MediaSink;
use lens_live::session::{SessionClient, SessionConfig};
use lens_live::sinks::{SpeechSink, TextSink};
use lens_live::transport::{Socket, SocketEvent, SocketFactory};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, Semaphore};

pub const SETUP_COMPLETE: &str = r#"{"setupComplete":{}}"#;

/// Everything the fake network has observed
#[derive(Default)]
pub struct NetLog {
    pub urls: Vec<String>,
    pub sent: Vec<String>,
    pub closes: usize,
    /// Events queued on every socket as soon as it is opened
    pub script: Vec<SocketEvent>,
    pub fail_open: bool,
    pub fail_send: bool,
    queues: Vec<Arc<Mutex<VecDeque<SocketEvent>>>>,
}

#[derive(Clone, Default)]
pub struct MockNet {
    log: Arc<Mutex<NetLog>>,
}

impl MockNet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every new socket starts with these events
    pub fn with_script(self, script: Vec<SocketEvent>) -> Self {
        self.set_script(script);
        self
    }

    pub fn set_script(&self, script: Vec<SocketEvent>) {
        self.log.lock().unwrap().script = script;
    }

    pub fn set_fail_open(&self, fail: bool) {
        self.log.lock().unwrap().fail_open = fail;
    }

    /// Every `send_text` on any socket fails
    pub fn set_fail_send(&self, fail: bool) {
        self.log.lock().unwrap().fail_send = fail;
    }

    pub fn factory(&self) -> Arc<dyn SocketFactory> {
        Arc::new(MockSocketFactory { net: self.clone() })
    }

    /// Queue an event on the most recently opened socket
    pub fn push(&self, event: SocketEvent) {
        let log = self.log.lock().unwrap();
        let queue = log.queues.last().expect("no socket opened");
        queue.lock().unwrap().push_back(event);
    }

    pub fn opened(&self) -> usize {
        self.log.lock().unwrap().urls.len()
    }

    pub fn urls(&self) -> Vec<String> {
        self.log.lock().unwrap().urls.clone()
    }

    pub fn sent(&self) -> Vec<String> {
        self.log.lock().unwrap().sent.clone()
    }

    pub fn sent_json(&self) -> Vec<serde_json::Value> {
        self.sent()
            .iter()
            .map(|s| serde_json::from_str(s).unwrap())
            .collect()
    }

    pub fn closes(&self) -> usize {
        self.log.lock().unwrap().closes
    }
}

struct MockSocketFactory {
    net: MockNet,
}

impl SocketFactory for MockSocketFactory {
    fn open(&self, url: &str) -> Result<Box<dyn Socket>> {
        let mut log = self.net.log.lock().unwrap();
        log.urls.push(url.to_string());
        if log.fail_open {
            bail!("connection refused");
        }

        let queue = Arc::new(Mutex::new(log.script.iter().cloned().collect::<VecDeque<_>>()));
        log.queues.push(Arc::clone(&queue));

        Ok(Box::new(MockSocket {
            net: self.net.clone(),
            queue,
            closed: false,
        }))
    }
}

struct MockSocket {
    net: MockNet,
    queue: Arc<Mutex<VecDeque<SocketEvent>>>,
    closed: bool,
}

impl Socket for MockSocket {
    fn send_text(&mut self, text: String) -> Result<()> {
        if self.closed {
            bail!("socket closed");
        }
        let mut log = self.net.log.lock().unwrap();
        if log.fail_send {
            bail!("write failed");
        }
        log.sent.push(text);
        Ok(())
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.net.log.lock().unwrap().closes += 1;
        }
    }

    fn poll_event(&mut self) -> Option<SocketEvent> {
        self.queue.lock().unwrap().pop_front()
    }
}

/// Text sink recording every update
#[derive(Clone, Default)]
pub struct RecordingText {
    pub lines: Arc<Mutex<Vec<String>>>,
}

impl RecordingText {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<String> {
        self.lines.lock().unwrap().last().cloned()
    }
}

impl TextSink for RecordingText {
    fn set_text(&mut self, text: &str) {
        self.lines.lock().unwrap().push(text.to_string());
    }
}

impl SpeechSink for RecordingText {
    fn speak(&mut self, text: &str) {
        self.lines.lock().unwrap().push(text.to_string());
    }
}

/// Audio output recording (sample count, rate) per play call
#[derive(Clone, Default)]
pub struct RecordingAudio {
    pub plays: Arc<Mutex<Vec<(usize, u32)>>>,
}

impl AudioOutput for RecordingAudio {
    fn play(&mut self, samples: &[f32], sample_rate: u32) {
        self.plays.lock().unwrap().push((samples.len(), sample_rate));
    }
}

/// Session wired to a mock network, with recording sinks
pub struct Harness {
    pub session: SessionClient,
    pub net: MockNet,
    pub status: RecordingText,
    pub output: RecordingText,
    pub speech: RecordingText,
    pub audio: RecordingAudio,
    pub clock: Instant,
}

impl Harness {
    pub fn new(config: SessionConfig, net: MockNet) -> Self {
        let status = RecordingText::default();
        let output = RecordingText::default();
        let speech = RecordingText::default();
        let audio = RecordingAudio::default();

        let session = SessionClient::builder(config)
            .transport(net.factory())
            .status_sink(Box::new(status.clone()))
            .output_sink(Box::new(output.clone()))
            .speech_sink(Box::new(speech.clone()))
            .audio_output(Box::new(audio.clone()))
            .build();

        Self {
            session,
            net,
            status,
            output,
            speech,
            audio,
            clock: Instant::now(),
        }
    }

    /// Advance the session by `delta`
    pub fn tick(&mut self, delta: Duration) {
        self.clock += delta;
        self.session.tick(Tick {
            now: self.clock,
            delta,
        });
    }

    /// Connect and complete the handshake
    pub fn activate(&mut self) {
        self.session.connect().unwrap();
        self.net.push(SocketEvent::Open);
        self.net.push(SocketEvent::Message(SETUP_COMPLETE.to_string()));
        self.tick(Duration::from_millis(10));
        assert!(self.session.is_session_active());
    }
}

pub fn test_config() -> SessionConfig {
    SessionConfig {
        session_id: "live-test".to_string(),
        api_key: "test-key".to_string(),
        endpoint: "wss://live.example.test/ws".to_string(),
        max_reconnect_attempts: 3,
        reconnect_interval_secs: 3.0,
        ..SessionConfig::default()
    }
}

/// Media sink recording frames, with a switchable activity gate
#[derive(Default)]
pub struct RecordingSink {
    pub active: bool,
    pub frames: Vec<OutboundFrame>,
}

impl RecordingSink {
    pub fn active() -> Self {
        Self {
            active: true,
            frames: Vec::new(),
        }
    }
}

impl MediaSink for RecordingSink {
    fn is_session_active(&self) -> bool {
        self.active
    }

    fn send_media(&mut self, frame: OutboundFrame) -> bool {
        if !self.active {
            return false;
        }
        self.frames.push(frame);
        true
    }
}

/// Camera returning a tiny solid frame
pub struct StaticCamera;

impl CameraSource for StaticCamera {
    fn latest_frame(&mut self) -> Option<CameraFrame> {
        Some(CameraFrame {
            width: 2,
            height: 2,
            pixels: vec![128u8; 12].into(),
            timestamp_ms: 0,
        })
    }

    fn name(&self) -> &str {
        "static"
    }
}

/// Encoder whose completions are released by the test
pub struct GatedEncoder {
    pub gate: Arc<Semaphore>,
}

impl GatedEncoder {
    pub fn new() -> (Arc<Self>, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        (
            Arc::new(Self {
                gate: Arc::clone(&gate),
            }),
            gate,
        )
    }
}

#[async_trait]
impl FrameEncoder for GatedEncoder {
    async fn encode(&self, _frame: CameraFrame) -> Result<String> {
        self.gate.acquire().await?.forget();
        Ok("ZnJhbWU=".to_string())
    }
}

/// Encoder that completes on first poll
pub struct InstantEncoder;

#[async_trait]
impl FrameEncoder for InstantEncoder {
    async fn encode(&self, _frame: CameraFrame) -> Result<String> {
        Ok("ZnJhbWU=".to_string())
    }
}

/// Microphone whose chunks are pushed by the test
#[derive(Clone, Default)]
pub struct ChannelMicrophone {
    pub tx: Arc<Mutex<Option<mpsc::UnboundedSender<AudioChunk>>>>,
}

impl ChannelMicrophone {
    pub fn send(&self, chunk: AudioChunk) {
        if let Some(tx) = self.tx.lock().unwrap().as_ref() {
            tx.send(chunk).unwrap();
        }
    }
}

impl MicrophoneSource for ChannelMicrophone {
    fn start(&mut self) -> Result<mpsc::UnboundedReceiver<AudioChunk>> {
        let (tx, rx) = mpsc::unbounded_channel();
        *self.tx.lock().unwrap() = Some(tx);
        Ok(rx)
    }

    fn stop(&mut self) -> Result<()> {
        self.tx.lock().unwrap().take();
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.tx.lock().unwrap().is_some()
    }

    fn name(&self) -> &str {
        "channel"
    }
}
