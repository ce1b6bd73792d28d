//! Media playback surface consumed by the synchronizer
//!
//! The session never talks to a concrete player; it talks to this
//! capability interface, which keeps the core testable against fakes.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

/// Notifications emitted by the media surface, delivered without payload.
/// The current position is read back synchronously when one arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerNotification {
    /// Playback started or resumed
    Play,
    /// Playback paused
    Pause,
    /// Playback stopped because the media ran out of data
    Stalled,
    /// A seek completed
    Seeked,
}

/// Errors surfaced by the playback surface
#[derive(Debug, Error)]
pub enum PlayerError {
    /// The platform refused to start playback without a user gesture
    #[error("playback start requires a user gesture")]
    PermissionDenied,

    /// Any other playback failure; fatal for the attempt, not retried
    #[error("playback failed: {0}")]
    Failed(String),
}

/// A controllable media object: play/pause/seek plus a notification stream.
#[async_trait]
pub trait PlaybackSource: Send + Sync {
    /// Attempt to start playback. May suspend while the platform resolves
    /// a user-permission prompt; the suspension must not block delivery of
    /// other notifications (they queue behind it).
    async fn play(&self) -> Result<(), PlayerError>;

    /// Pause playback.
    fn pause(&self);

    /// Current playback position in seconds.
    fn position(&self) -> f64;

    /// Absolute seek to `seconds`.
    fn set_position(&self, seconds: f64);

    /// Media duration in seconds, if known. Used to clamp incoming
    /// positions to the media-valid range.
    fn duration(&self) -> Option<f64>;

    /// Subscribe to playback notifications. Dropping the receiver
    /// unsubscribes.
    fn subscribe(&self) -> mpsc::UnboundedReceiver<PlayerNotification>;
}
