//! Autoplay gate
//!
//! Platforms may refuse programmatic playback until the user has
//! interacted with the page. The gate tracks that permission as a small
//! state machine: once a play attempt succeeds the grant is permanent for
//! the rest of the session.

use tracing::{debug, warn};

use crate::player::{PlaybackSource, PlayerError};

/// Permission state, monotonic once it reaches `Granted`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AutoplayState {
    /// No play attempt has been made yet
    #[default]
    Idle,
    /// A play attempt was refused; waiting for a user gesture to retry
    AwaitingGesture,
    /// Playback has started at least once; no further permission checks
    Granted,
}

/// Outcome of driving the gate with a play request or a user gesture
#[derive(Debug)]
pub enum PlayAttempt {
    /// Playback is running
    Started,
    /// A user gesture is required first. `prompt` is true exactly once
    /// per session, when the user notification should be shown.
    AwaitingGesture { prompt: bool },
    /// Playback start failed for a reason other than a permission denial;
    /// fatal for this attempt, not retried
    Failed(PlayerError),
}

/// State machine gating programmatic play behind the platform's
/// user-gesture requirement
#[derive(Debug, Default)]
pub struct AutoplayGate {
    state: AutoplayState,
    /// Whether the gesture notification has already been surfaced
    prompted: bool,
}

impl AutoplayGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> AutoplayState {
        self.state
    }

    /// Attempt to start playback on behalf of a remote play command.
    ///
    /// While a gesture is pending no new attempt is made; the eventual
    /// gesture retry covers it.
    pub async fn request_play(&mut self, player: &dyn PlaybackSource) -> PlayAttempt {
        if self.state == AutoplayState::AwaitingGesture {
            debug!("play request while awaiting user gesture");
            return PlayAttempt::AwaitingGesture { prompt: false };
        }
        self.attempt(player).await
    }

    /// Retry hook for the next user interaction anywhere on the page.
    /// Returns `None` when no retry is pending.
    pub async fn on_user_gesture(&mut self, player: &dyn PlaybackSource) -> Option<PlayAttempt> {
        if self.state != AutoplayState::AwaitingGesture {
            return None;
        }
        Some(self.attempt(player).await)
    }

    async fn attempt(&mut self, player: &dyn PlaybackSource) -> PlayAttempt {
        match player.play().await {
            Ok(()) => {
                debug!("playback started, autoplay granted");
                self.state = AutoplayState::Granted;
                PlayAttempt::Started
            }
            Err(PlayerError::PermissionDenied) => {
                self.state = AutoplayState::AwaitingGesture;
                let prompt = !self.prompted;
                self.prompted = true;
                PlayAttempt::AwaitingGesture { prompt }
            }
            Err(e) => {
                warn!("playback start failed: {}", e);
                PlayAttempt::Failed(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakePlayer;

    #[tokio::test]
    async fn test_successful_play_grants_permanently() {
        let player = FakePlayer::new();
        let mut gate = AutoplayGate::new();

        assert!(matches!(
            gate.request_play(&player).await,
            PlayAttempt::Started
        ));
        assert_eq!(gate.state(), AutoplayState::Granted);

        // Subsequent requests never re-enter the gesture flow
        assert!(matches!(
            gate.request_play(&player).await,
            PlayAttempt::Started
        ));
        assert_eq!(gate.state(), AutoplayState::Granted);
    }

    #[tokio::test]
    async fn test_denial_then_gesture_recovers() {
        let player = FakePlayer::new();
        player.fail_next_play(PlayerError::PermissionDenied);
        let mut gate = AutoplayGate::new();

        // Denied: move to AwaitingGesture and prompt once
        match gate.request_play(&player).await {
            PlayAttempt::AwaitingGesture { prompt } => assert!(prompt),
            other => panic!("expected gesture wait, got {:?}", other),
        }
        assert_eq!(gate.state(), AutoplayState::AwaitingGesture);

        // Another request while waiting does not prompt again
        match gate.request_play(&player).await {
            PlayAttempt::AwaitingGesture { prompt } => assert!(!prompt),
            other => panic!("expected gesture wait, got {:?}", other),
        }

        // The next user interaction retries and succeeds
        assert!(matches!(
            gate.on_user_gesture(&player).await,
            Some(PlayAttempt::Started)
        ));
        assert_eq!(gate.state(), AutoplayState::Granted);
        assert!(*player.playing.lock());
    }

    #[tokio::test]
    async fn test_gesture_outside_waiting_state_is_ignored() {
        let player = FakePlayer::new();
        let mut gate = AutoplayGate::new();

        assert!(gate.on_user_gesture(&player).await.is_none());
        assert_eq!(gate.state(), AutoplayState::Idle);
        assert!(!*player.playing.lock());
    }

    #[tokio::test]
    async fn test_other_failures_do_not_change_state() {
        let player = FakePlayer::new();
        player.fail_next_play(PlayerError::Failed("decoder error".to_string()));
        let mut gate = AutoplayGate::new();

        assert!(matches!(
            gate.request_play(&player).await,
            PlayAttempt::Failed(_)
        ));
        assert_eq!(gate.state(), AutoplayState::Idle);
    }

    #[tokio::test]
    async fn test_repeated_denial_on_gesture_keeps_waiting() {
        let player = FakePlayer::new();
        player.fail_next_play(PlayerError::PermissionDenied);
        let mut gate = AutoplayGate::new();
        gate.request_play(&player).await;

        player.fail_next_play(PlayerError::PermissionDenied);
        match gate.on_user_gesture(&player).await {
            Some(PlayAttempt::AwaitingGesture { prompt }) => assert!(!prompt),
            other => panic!("expected gesture wait, got {:?}", other),
        }
        assert_eq!(gate.state(), AutoplayState::AwaitingGesture);
    }
}
