//! Wire protocol for playback synchronization
//!
//! One JSON object per channel message: `{"type": "...", "time": <seconds>}`.
//! Fire-and-forget - no versioning, no acknowledgements, no sequence numbers.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Kind of playback change being propagated to the peer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    /// Playback started or resumed
    Play,
    /// Playback paused (voluntarily or through a stall)
    Pause,
    /// A seek occurred; the receiver should resynchronize its position
    SyncTime,
}

/// A playback state change observed on one side of the session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackEvent {
    /// What happened
    #[serde(rename = "type")]
    pub kind: EventKind,
    /// Playback position in seconds at the moment of observation.
    /// `None` on decoded play/pause messages means "no reposition".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<f64>,
}

/// Errors produced while decoding a wire message
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed wire message: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("sync-time message is missing its time field")]
    MissingTime,

    #[error("invalid playback time: {0}")]
    InvalidTime(f64),
}

impl PlaybackEvent {
    /// A locally observed play, carrying the current position
    pub fn play(time: f64) -> Self {
        Self {
            kind: EventKind::Play,
            time: Some(time),
        }
    }

    /// A locally observed pause, carrying the current position
    pub fn pause(time: f64) -> Self {
        Self {
            kind: EventKind::Pause,
            time: Some(time),
        }
    }

    /// A locally observed seek to `time`
    pub fn sync_time(time: f64) -> Self {
        Self {
            kind: EventKind::SyncTime,
            time: Some(time),
        }
    }

    /// Serialize to the wire form.
    pub fn encode(&self) -> String {
        serde_json::to_string(self).expect("playback event serializes to JSON")
    }

    /// Parse and structurally validate a wire message.
    ///
    /// `time` is optional for play/pause but required for sync-time, and
    /// must be a finite, non-negative number of seconds when present. No
    /// upper bound is enforced here; receivers clamp to the media duration
    /// when applying.
    pub fn decode(raw: &str) -> Result<Self, DecodeError> {
        let event: PlaybackEvent = serde_json::from_str(raw)?;

        if let Some(time) = event.time {
            if !time.is_finite() || time < 0.0 {
                return Err(DecodeError::InvalidTime(time));
            }
        } else if event.kind == EventKind::SyncTime {
            return Err(DecodeError::MissingTime);
        }

        Ok(event)
    }
}
