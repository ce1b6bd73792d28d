//! WebSocket implementation of the message channel
//!
//! Owns a spawned I/O task per connection: outbound text is queued through
//! an mpsc channel, inbound frames and lifecycle changes fan out to
//! subscribers. No automatic reconnection - once the socket closes or
//! fails, the channel stays down.

use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};

use super::{ChannelError, ChannelEvent, ConnectionState, MessageChannel};

/// Connection state and subscriber list, kept under one lock so a
/// subscriber registered mid-transition never misses the event.
struct Inner {
    state: ConnectionState,
    subscribers: Vec<mpsc::UnboundedSender<ChannelEvent>>,
}

struct Shared {
    inner: Mutex<Inner>,
}

impl Shared {
    fn state(&self) -> ConnectionState {
        self.inner.lock().state
    }

    /// Deliver an event to every live subscriber, pruning dropped ones
    fn emit(&self, event: ChannelEvent) {
        self.inner
            .lock()
            .subscribers
            .retain(|tx| tx.send(event.clone()).is_ok());
    }

    /// Move to `state` and deliver `event` atomically
    fn transition(&self, state: ConnectionState, event: ChannelEvent) {
        let mut inner = self.inner.lock();
        inner.state = state;
        inner.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    fn subscribe(&self) -> mpsc::UnboundedReceiver<ChannelEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut inner = self.inner.lock();
        // Late subscribers still learn the connection outcome
        let replay = match inner.state {
            ConnectionState::Connecting => None,
            ConnectionState::Open => Some(ChannelEvent::Open),
            ConnectionState::Closed => Some(ChannelEvent::Closed),
            ConnectionState::Failed => Some(ChannelEvent::Error("channel failed".to_string())),
        };
        if let Some(event) = replay {
            let _ = tx.send(event);
        }
        inner.subscribers.push(tx);
        rx
    }
}

/// Message channel over a WebSocket connection
pub struct WebSocketChannel {
    outbound_tx: mpsc::UnboundedSender<String>,
    shared: Arc<Shared>,
}

impl WebSocketChannel {
    /// Start connecting to `url` (e.g. `ws://localhost:8080/ws`).
    ///
    /// Returns immediately; subscribers learn the outcome through
    /// `ChannelEvent::Open` or `ChannelEvent::Error`.
    pub fn connect(url: impl Into<String>) -> Self {
        let url = url.into();
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let shared = Arc::new(Shared {
            inner: Mutex::new(Inner {
                state: ConnectionState::Connecting,
                subscribers: Vec::new(),
            }),
        });

        tokio::spawn(run_connection(url, outbound_rx, Arc::clone(&shared)));

        Self {
            outbound_tx,
            shared,
        }
    }

    /// Current connection state
    pub fn state(&self) -> ConnectionState {
        self.shared.state()
    }
}

impl MessageChannel for WebSocketChannel {
    fn send(&self, text: String) -> Result<(), ChannelError> {
        if self.state() != ConnectionState::Open {
            return Err(ChannelError::NotOpen);
        }
        self.outbound_tx
            .send(text)
            .map_err(|e| ChannelError::Send(e.to_string()))
    }

    fn subscribe(&self) -> mpsc::UnboundedReceiver<ChannelEvent> {
        self.shared.subscribe()
    }
}

/// I/O task: dial, then pump outbound and inbound until the socket dies
async fn run_connection(
    url: String,
    mut outbound_rx: mpsc::UnboundedReceiver<String>,
    shared: Arc<Shared>,
) {
    let stream = match connect_async(&url).await {
        Ok((stream, _)) => stream,
        Err(e) => {
            warn!("failed to connect to {}: {}", url, e);
            shared.transition(ConnectionState::Failed, ChannelEvent::Error(e.to_string()));
            return;
        }
    };

    info!("connected to {}", url);
    shared.transition(ConnectionState::Open, ChannelEvent::Open);

    let (mut sink, mut source) = stream.split();

    loop {
        tokio::select! {
            outbound = outbound_rx.recv() => match outbound {
                Some(text) => {
                    debug!("sending: {}", text);
                    if let Err(e) = sink.send(Message::Text(text)).await {
                        warn!("send failed: {}", e);
                        shared.transition(
                            ConnectionState::Failed,
                            ChannelEvent::Error(e.to_string()),
                        );
                        break;
                    }
                }
                // Channel handle dropped; close the socket politely
                None => {
                    let _ = sink.send(Message::Close(None)).await;
                    shared.transition(ConnectionState::Closed, ChannelEvent::Closed);
                    break;
                }
            },
            inbound = source.next() => match inbound {
                Some(Ok(Message::Text(text))) => {
                    debug!("received: {}", text);
                    shared.emit(ChannelEvent::Message(text));
                }
                Some(Ok(Message::Close(_))) | None => {
                    info!("peer closed the connection");
                    shared.transition(ConnectionState::Closed, ChannelEvent::Closed);
                    break;
                }
                // Ping/pong are answered by tungstenite; binary is not
                // part of the protocol
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!("receive failed: {}", e);
                    shared.transition(
                        ConnectionState::Failed,
                        ChannelEvent::Error(e.to_string()),
                    );
                    break;
                }
            },
        }
    }
}
