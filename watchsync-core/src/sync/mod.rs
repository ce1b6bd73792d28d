//! Sync engine
//!
//! The synchronization state machine: wire protocol, feedback-loop
//! suppression, and the two halves of the event flow (local monitor
//! outward, remote applier inward).

pub mod applier;
pub mod monitor;
mod protocol;
mod suppressor;

pub use protocol::{DecodeError, EventKind, PlaybackEvent};
pub use suppressor::{
    Direction, FeedbackSuppressor, SuppressionPolicy, DEFAULT_SUPPRESSION_WINDOW,
};
