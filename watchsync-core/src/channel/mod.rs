//! Message channel consumed by the synchronizer
//!
//! A bidirectional, ordered, text-message transport. The session only ever
//! sends serialized events and reacts to the lifecycle events below;
//! endpoint configuration and connection setup live in the implementation.

mod ws;

pub use ws::WebSocketChannel;

use thiserror::Error;
use tokio::sync::mpsc;

/// Lifecycle of the channel, owned by the channel implementation.
/// The core reacts to `Open` (begin operating) and `Closed`/`Failed`
/// (stop sending, surface a notification).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    Closed,
    Failed,
}

/// Events delivered to channel subscribers
#[derive(Debug, Clone)]
pub enum ChannelEvent {
    /// The transport is connected and messages may flow
    Open,
    /// A text message arrived from the peer
    Message(String),
    /// The transport closed; no reconnection is attempted
    Closed,
    /// The transport failed
    Error(String),
}

/// Errors produced by the send path
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("channel is not open")]
    NotOpen,

    #[error("send failed: {0}")]
    Send(String),
}

/// Narrow capability interface over the transport
pub trait MessageChannel: Send + Sync {
    /// Queue a text message for the peer. Fire-and-forget; ordering is
    /// preserved by the transport.
    fn send(&self, text: String) -> Result<(), ChannelError>;

    /// Subscribe to channel lifecycle and message events. Dropping the
    /// receiver unsubscribes.
    fn subscribe(&self) -> mpsc::UnboundedReceiver<ChannelEvent>;
}
