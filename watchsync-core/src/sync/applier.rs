//! Remote command applier
//!
//! Decodes wire messages from the peer and, when the suppressor admits
//! them, mutates local playback state. The position is always applied
//! before the play/pause action so that resuming starts from the correct
//! offset.

use std::time::Instant;

use tracing::debug;

use crate::autoplay::{AutoplayGate, PlayAttempt};
use crate::player::PlaybackSource;
use crate::sync::protocol::{DecodeError, EventKind, PlaybackEvent};
use crate::sync::suppressor::{Direction, FeedbackSuppressor};

/// Apply a raw wire message to the local player.
///
/// Decode failures return `DecodeError` before the suppressor is even
/// consulted and cause no mutation. A suppressed message is not an error:
/// it is an intentionally ignored, too-recent duplicate, and the result is
/// `Ok(None)`. `Some(PlayAttempt)` is returned when a play command drove
/// the autoplay gate, so the caller can surface the outcome.
pub async fn apply_remote(
    raw: &str,
    suppressor: &mut FeedbackSuppressor,
    now: Instant,
    player: &dyn PlaybackSource,
    gate: &mut AutoplayGate,
) -> Result<Option<PlayAttempt>, DecodeError> {
    let event = PlaybackEvent::decode(raw)?;

    if !suppressor.admit(Direction::Inbound, now) {
        debug!(kind = ?event.kind, "dropped remote command inside suppression window");
        return Ok(None);
    }

    if let Some(time) = event.time {
        let clamped = match player.duration() {
            Some(duration) => time.min(duration),
            None => time,
        };
        player.set_position(clamped);
    }

    match event.kind {
        EventKind::Pause => {
            player.pause();
            Ok(None)
        }
        EventKind::Play => Ok(Some(gate.request_play(player).await)),
        EventKind::SyncTime => Ok(None),
    }
}
