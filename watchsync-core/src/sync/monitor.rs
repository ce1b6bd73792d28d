//! Local playback monitor
//!
//! Classifies notifications from the media surface into outward sync
//! events and offers each to the suppressor before transmission.

use std::time::Instant;

use tracing::debug;

use crate::player::PlayerNotification;
use crate::sync::protocol::PlaybackEvent;
use crate::sync::suppressor::{Direction, FeedbackSuppressor};

/// Map a raw media notification to the event propagated to the peer.
///
/// A stall collapses into a pause: for synchronization purposes it is an
/// involuntary pause, even though it carries no user intent.
pub fn classify(notification: PlayerNotification, position: f64) -> PlaybackEvent {
    match notification {
        PlayerNotification::Play => PlaybackEvent::play(position),
        PlayerNotification::Pause | PlayerNotification::Stalled => PlaybackEvent::pause(position),
        PlayerNotification::Seeked => PlaybackEvent::sync_time(position),
    }
}

/// Classify a local notification and offer it to the suppressor.
///
/// `Some` means the event is fresh and should be encoded and transmitted;
/// `None` means it was dropped as a probable echo of a command this
/// process just applied.
pub fn outbound_event(
    notification: PlayerNotification,
    position: f64,
    suppressor: &mut FeedbackSuppressor,
    now: Instant,
) -> Option<PlaybackEvent> {
    let event = classify(notification, position);
    if suppressor.admit(Direction::Outbound, now) {
        Some(event)
    } else {
        debug!(?notification, "dropped local event inside suppression window");
        None
    }
}
