//! Watch Together - Core Library
//!
//! Keeps a media playback position and play/pause state synchronized
//! between a local player and a remote peer over a persistent message
//! channel, without the propagation re-triggering an infinite feedback
//! loop of echoed events.

pub mod autoplay;
pub mod channel;
pub mod player;
pub mod session;
pub mod sync;

#[cfg(test)]
mod testing;

// Re-exports for convenience
pub use autoplay::{AutoplayGate, AutoplayState, PlayAttempt};
pub use channel::{
    ChannelError, ChannelEvent, ConnectionState, MessageChannel, WebSocketChannel,
};
pub use player::{PlaybackSource, PlayerError, PlayerNotification};
pub use session::{SessionCallback, SessionConfig, SessionHandle, SyncSession};
pub use sync::{
    DecodeError, EventKind, FeedbackSuppressor, PlaybackEvent, SuppressionPolicy,
};
