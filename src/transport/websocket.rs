use anyhow::{anyhow, Context, Result};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

use super::socket::{Socket, SocketEvent, SocketFactory};

enum Outgoing {
    Text(String),
    Close,
}

/// Socket factory backed by tokio-tungstenite
///
/// Each socket runs on its own tokio task, so `open` must be called from
/// within a tokio runtime.
#[derive(Debug, Default, Clone)]
pub struct WebSocketFactory;

impl WebSocketFactory {
    pub fn new() -> Self {
        Self
    }
}

impl SocketFactory for WebSocketFactory {
    fn open(&self, url: &str) -> Result<Box<dyn Socket>> {
        let handle = tokio::runtime::Handle::try_current()
            .context("WebSocket transport requires a tokio runtime")?;

        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let task = handle.spawn(run_socket(url.to_string(), outbound_rx, event_tx));

        Ok(Box::new(WebSocketHandle {
            outbound: outbound_tx,
            events: event_rx,
            task,
        }))
    }
}

struct WebSocketHandle {
    outbound: mpsc::UnboundedSender<Outgoing>,
    events: mpsc::UnboundedReceiver<SocketEvent>,
    task: JoinHandle<()>,
}

impl Socket for WebSocketHandle {
    fn send_text(&mut self, text: String) -> Result<()> {
        self.outbound
            .send(Outgoing::Text(text))
            .map_err(|_| anyhow!("WebSocket task is no longer running"))
    }

    fn close(&mut self) {
        // Ignored if the task already exited
        let _ = self.outbound.send(Outgoing::Close);
    }

    fn poll_event(&mut self) -> Option<SocketEvent> {
        self.events.try_recv().ok()
    }
}

impl Drop for WebSocketHandle {
    fn drop(&mut self) {
        if !self.task.is_finished() {
            let _ = self.outbound.send(Outgoing::Close);
        }
    }
}

async fn run_socket(
    url: String,
    mut outbound: mpsc::UnboundedReceiver<Outgoing>,
    events: mpsc::UnboundedSender<SocketEvent>,
) {
    let stream = match connect_async(url.as_str()).await {
        Ok((stream, _response)) => stream,
        Err(e) => {
            warn!("WebSocket connect error: {}", e);
            let _ = events.send(SocketEvent::Error(e.to_string()));
            let _ = events.send(SocketEvent::Closed);
            return;
        }
    };

    info!("WebSocket connection established");
    let _ = events.send(SocketEvent::Open);

    let (mut sink, mut source) = stream.split();

    loop {
        tokio::select! {
            outgoing = outbound.recv() => match outgoing {
                Some(Outgoing::Text(text)) => {
                    if let Err(e) = sink.send(Message::Text(text.into())).await {
                        error!("Failed to send WebSocket frame: {}", e);
                        let _ = events.send(SocketEvent::Error(e.to_string()));
                        break;
                    }
                }
                Some(Outgoing::Close) | None => {
                    debug!("Closing WebSocket connection");
                    let _ = sink.close().await;
                    break;
                }
            },
            incoming = source.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    let _ = events.send(SocketEvent::Message(text.as_str().to_owned()));
                }
                Some(Ok(Message::Binary(bytes))) => match String::from_utf8(bytes.to_vec()) {
                    Ok(text) => {
                        let _ = events.send(SocketEvent::Message(text));
                    }
                    Err(e) => warn!("Dropping non UTF-8 binary frame: {}", e),
                },
                Some(Ok(Message::Close(frame))) => {
                    info!("WebSocket closed by server: {:?}", frame);
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    error!("WebSocket receive error: {}", e);
                    let _ = events.send(SocketEvent::Error(e.to_string()));
                    break;
                }
                None => break,
            },
        }
    }

    let _ = events.send(SocketEvent::Closed);
}
