//! Feedback suppression for echoed playback events
//!
//! Applying a remote command mutates the local player, which re-fires the
//! same notification locally and would echo it straight back over the
//! channel. The suppressor approximates echo detection with a minimum time
//! interval between admitted events instead of causal tagging: anything
//! arriving inside the window of the last admitted event is presumed to be
//! an echo and dropped.

use std::time::{Duration, Instant};

/// Default minimum interval between two admitted events
pub const DEFAULT_SUPPRESSION_WINDOW: Duration = Duration::from_millis(500);

/// Which path is offering an event to the suppressor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// A locally observed event about to be transmitted
    Outbound,
    /// A remote command about to be applied
    Inbound,
}

/// How admitted-event timestamps are shared between the two directions.
///
/// `Shared` is the original behavior: one window across both paths, which
/// also prevents ping-pong amplification between exactly two peers. Its
/// known cost is that a legitimate remote command arriving just after a
/// legitimate local action is dropped even though it is not an echo.
/// `PerDirection` trades that drop for independent windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SuppressionPolicy {
    /// One window counted across inbound and outbound combined (default)
    #[default]
    Shared,
    /// Independent windows per direction
    PerDirection,
}

/// Time-windowed admit gate shared by the send and receive paths
#[derive(Debug)]
pub struct FeedbackSuppressor {
    window: Duration,
    policy: SuppressionPolicy,
    /// Last admitted timestamp per slot; `Shared` only uses slot 0
    last_admitted: [Option<Instant>; 2],
}

impl FeedbackSuppressor {
    pub fn new(window: Duration, policy: SuppressionPolicy) -> Self {
        Self {
            window,
            policy,
            last_admitted: [None, None],
        }
    }

    /// Offer an event observed at `now`. Returns `true` and records the
    /// timestamp iff more than the window has elapsed since the last
    /// admitted event on the relevant slot; otherwise returns `false` and
    /// leaves state untouched. The first offer always admits.
    pub fn admit(&mut self, direction: Direction, now: Instant) -> bool {
        let slot = self.slot(direction);
        let fresh = match self.last_admitted[slot] {
            None => true,
            Some(last) => now.duration_since(last) > self.window,
        };
        if fresh {
            self.last_admitted[slot] = Some(now);
            tracing::debug!(?direction, "suppressor admitted event");
        } else {
            tracing::debug!(?direction, "suppressor dropped probable echo");
        }
        fresh
    }

    /// Timestamp of the last admitted event on the slot `direction` maps to
    pub fn last_admitted(&self, direction: Direction) -> Option<Instant> {
        self.last_admitted[self.slot(direction)]
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn policy(&self) -> SuppressionPolicy {
        self.policy
    }

    fn slot(&self, direction: Direction) -> usize {
        match (self.policy, direction) {
            (SuppressionPolicy::Shared, _) => 0,
            (SuppressionPolicy::PerDirection, Direction::Outbound) => 0,
            (SuppressionPolicy::PerDirection, Direction::Inbound) => 1,
        }
    }
}

impl Default for FeedbackSuppressor {
    fn default() -> Self {
        Self::new(DEFAULT_SUPPRESSION_WINDOW, SuppressionPolicy::Shared)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(base: Instant, ms: u64) -> Instant {
        base + Duration::from_millis(ms)
    }

    #[test]
    fn test_first_offer_always_admits() {
        let mut suppressor = FeedbackSuppressor::default();
        assert!(suppressor.admit(Direction::Outbound, Instant::now()));
    }

    #[test]
    fn test_window_scenario() {
        // admit(0) -> true; admit(200) -> false; admit(600) -> true (500ms window)
        let base = Instant::now();
        let mut suppressor = FeedbackSuppressor::default();

        assert!(suppressor.admit(Direction::Outbound, at(base, 0)));
        assert!(!suppressor.admit(Direction::Outbound, at(base, 200)));
        assert!(suppressor.admit(Direction::Outbound, at(base, 600)));
    }

    #[test]
    fn test_exact_window_boundary_is_rejected() {
        // The contract is strictly greater than the window
        let base = Instant::now();
        let mut suppressor = FeedbackSuppressor::default();

        assert!(suppressor.admit(Direction::Outbound, at(base, 0)));
        assert!(!suppressor.admit(Direction::Outbound, at(base, 500)));
        assert!(suppressor.admit(Direction::Outbound, at(base, 501)));
    }

    #[test]
    fn test_rejection_leaves_state_untouched() {
        let base = Instant::now();
        let mut suppressor = FeedbackSuppressor::default();

        suppressor.admit(Direction::Outbound, at(base, 0));
        let recorded = suppressor.last_admitted(Direction::Outbound);

        assert!(!suppressor.admit(Direction::Outbound, at(base, 100)));
        assert_eq!(suppressor.last_admitted(Direction::Outbound), recorded);
    }

    #[test]
    fn test_shared_policy_gates_across_directions() {
        let base = Instant::now();
        let mut suppressor = FeedbackSuppressor::default();

        assert!(suppressor.admit(Direction::Outbound, at(base, 0)));
        // The remote echo of that action arrives inside the window
        assert!(!suppressor.admit(Direction::Inbound, at(base, 50)));
    }

    #[test]
    fn test_per_direction_policy_is_independent() {
        let base = Instant::now();
        let mut suppressor =
            FeedbackSuppressor::new(DEFAULT_SUPPRESSION_WINDOW, SuppressionPolicy::PerDirection);

        assert!(suppressor.admit(Direction::Outbound, at(base, 0)));
        assert!(suppressor.admit(Direction::Inbound, at(base, 50)));
        assert!(!suppressor.admit(Direction::Outbound, at(base, 100)));
        assert!(!suppressor.admit(Direction::Inbound, at(base, 100)));
    }

    #[test]
    fn test_custom_window() {
        let base = Instant::now();
        let mut suppressor =
            FeedbackSuppressor::new(Duration::from_millis(100), SuppressionPolicy::Shared);

        assert!(suppressor.admit(Direction::Inbound, at(base, 0)));
        assert!(suppressor.admit(Direction::Inbound, at(base, 101)));
    }
}
