pub mod audio;
pub mod camera;
pub mod clock;
pub mod config;
pub mod controller;
pub mod error;
pub mod media;
pub mod protocol;
pub mod pump;
pub mod session;
pub mod sinks;
pub mod speech;
pub mod transport;

pub use audio::{AudioChunk, AudioOutput, MicrophoneConfig, MicrophoneSource, WavAudioOutput, WavMicrophone};
pub use camera::{CameraFrame, CameraSource, TestPatternCamera};
pub use clock::{Tick, Ticker};
pub use config::Config;
pub use controller::{AssistantState, Controller};
pub use error::ClientError;
pub use media::{FrameEncoder, JpegFrameEncoder};
pub use protocol::{InboundMessage, MediaKind, OutboundFrame, ResponseModality};
pub use pump::{AudioPump, AudioPumpConfig, CameraPump, CameraPumpConfig, MediaSink};
pub use session::{SessionClient, SessionConfig, SessionState, SessionStats};
pub use sinks::{LogTextSink, SpeechSink, StdoutTextSink, TextSink};
pub use speech::OpenAiSpeech;
pub use transport::{Socket, SocketEvent, SocketFactory, WebSocketFactory};
