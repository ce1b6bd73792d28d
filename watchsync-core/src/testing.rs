//! Fake collaborators for unit tests

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::channel::{ChannelError, ChannelEvent, MessageChannel};
use crate::player::{PlaybackSource, PlayerError, PlayerNotification};
use crate::session::SessionCallback;

/// Scriptable in-memory playback surface.
///
/// Records every mutation in `ops` ("seek:12.5", "pause", "play") so tests
/// can assert on ordering, and lets tests queue failures for upcoming
/// `play()` calls.
pub(crate) struct FakePlayer {
    pub position: Mutex<f64>,
    pub playing: Mutex<bool>,
    pub ops: Mutex<Vec<String>>,
    duration: Option<f64>,
    play_failures: Mutex<VecDeque<PlayerError>>,
    notification_txs: Mutex<Vec<mpsc::UnboundedSender<PlayerNotification>>>,
}

impl FakePlayer {
    pub fn new() -> Self {
        Self {
            position: Mutex::new(0.0),
            playing: Mutex::new(false),
            ops: Mutex::new(Vec::new()),
            duration: None,
            play_failures: Mutex::new(VecDeque::new()),
            notification_txs: Mutex::new(Vec::new()),
        }
    }

    pub fn with_duration(mut self, seconds: f64) -> Self {
        self.duration = Some(seconds);
        self
    }

    /// Queue a failure for the next `play()` call
    pub fn fail_next_play(&self, error: PlayerError) {
        self.play_failures.lock().push_back(error);
    }

    /// Emit a playback notification to all subscribers
    pub fn notify(&self, notification: PlayerNotification) {
        self.notification_txs
            .lock()
            .retain(|tx| tx.send(notification).is_ok());
    }
}

#[async_trait]
impl PlaybackSource for FakePlayer {
    async fn play(&self) -> Result<(), PlayerError> {
        if let Some(error) = self.play_failures.lock().pop_front() {
            return Err(error);
        }
        *self.playing.lock() = true;
        self.ops.lock().push("play".to_string());
        Ok(())
    }

    fn pause(&self) {
        *self.playing.lock() = false;
        self.ops.lock().push("pause".to_string());
    }

    fn position(&self) -> f64 {
        *self.position.lock()
    }

    fn set_position(&self, seconds: f64) {
        *self.position.lock() = seconds;
        self.ops.lock().push(format!("seek:{}", seconds));
    }

    fn duration(&self) -> Option<f64> {
        self.duration
    }

    fn subscribe(&self) -> mpsc::UnboundedReceiver<PlayerNotification> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.notification_txs.lock().push(tx);
        rx
    }
}

/// In-memory message channel: records sent frames, lets tests inject
/// channel events.
pub(crate) struct FakeChannel {
    pub sent: Mutex<Vec<String>>,
    event_txs: Mutex<Vec<mpsc::UnboundedSender<ChannelEvent>>>,
}

impl FakeChannel {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            event_txs: Mutex::new(Vec::new()),
        }
    }

    /// Inject a channel event as if the transport produced it
    pub fn emit(&self, event: ChannelEvent) {
        self.event_txs
            .lock()
            .retain(|tx| tx.send(event.clone()).is_ok());
    }
}

impl MessageChannel for FakeChannel {
    fn send(&self, text: String) -> Result<(), ChannelError> {
        self.sent.lock().push(text);
        Ok(())
    }

    fn subscribe(&self) -> mpsc::UnboundedReceiver<ChannelEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.event_txs.lock().push(tx);
        rx
    }
}

/// Callback sink that records every notification it receives
#[derive(Default)]
pub(crate) struct RecordingCallback {
    pub events: Mutex<Vec<String>>,
}

impl SessionCallback for RecordingCallback {
    fn on_connected(&self) {
        self.events.lock().push("connected".to_string());
    }

    fn on_disconnected(&self, reason: String) {
        self.events.lock().push(format!("disconnected:{}", reason));
    }

    fn on_gesture_required(&self) {
        self.events.lock().push("gesture-required".to_string());
    }

    fn on_error(&self, message: String) {
        self.events.lock().push(format!("error:{}", message));
    }
}
