//! Socket abstraction between the session client and the network
//!
//! The client never awaits the network. A socket handle queues outgoing text
//! frames and exposes received events for the client to drain on each tick.

pub mod socket;
pub mod websocket;

pub use socket::{Socket, SocketEvent, SocketFactory};
pub use websocket::WebSocketFactory;
