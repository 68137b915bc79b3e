use anyhow::Result;

/// Event reported by a socket, in the order it happened
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketEvent {
    /// Connection established
    Open,
    /// A text frame (binary frames are delivered as UTF-8 text)
    Message(String),
    /// Transport error; usually followed by `Closed`
    Error(String),
    /// Connection closed or could not be established
    Closed,
}

/// Handle to one socket connection
pub trait Socket: Send {
    /// Queue a text frame for transmission
    fn send_text(&mut self, text: String) -> Result<()>;

    /// Close the connection. Events already queued may still be drained.
    fn close(&mut self);

    /// Next pending event, if any. Never blocks.
    fn poll_event(&mut self) -> Option<SocketEvent>;
}

/// Creates socket handles for a URL
///
/// `open` returns immediately; the outcome of the connection attempt is
/// reported later through `SocketEvent::Open` or `SocketEvent::Closed`.
pub trait SocketFactory: Send + Sync {
    fn open(&self, url: &str) -> Result<Box<dyn Socket>>;
}
