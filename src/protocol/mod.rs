pub mod messages;

pub use messages::{
    GenerationConfig, InboundMessage, MediaKind, OutboundFrame, RealtimeInputMessage,
    ResponseModality, SetupMessage,
};
