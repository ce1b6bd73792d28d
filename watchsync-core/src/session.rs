//! Synchronization session
//!
//! Owns the suppressor, the autoplay gate, and references to the two
//! collaborators, and drives everything from a single event loop so the
//! admit check-and-update is naturally atomic. Local and remote events
//! racing inside one suppression window are resolved by arrival order:
//! whichever the loop sees first wins.

use std::sync::{Arc, Once};
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::autoplay::{AutoplayGate, PlayAttempt};
use crate::channel::{ChannelEvent, ConnectionState, MessageChannel};
use crate::player::{PlaybackSource, PlayerNotification};
use crate::sync::{
    applier, monitor, FeedbackSuppressor, SuppressionPolicy, DEFAULT_SUPPRESSION_WINDOW,
};

static TRACING_INIT: Once = Once::new();

/// Session configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Minimum interval between two admitted events
    pub suppression_window: Duration,
    /// Whether both directions share one suppression window
    pub suppression_policy: SuppressionPolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            suppression_window: DEFAULT_SUPPRESSION_WINDOW,
            suppression_policy: SuppressionPolicy::Shared,
        }
    }
}

/// Side-effect sink for user-facing notifications
pub trait SessionCallback: Send + Sync {
    /// The channel is open and synchronization is active
    fn on_connected(&self);
    /// The channel closed; the session will not send again
    fn on_disconnected(&self, reason: String);
    /// One-time request to interact with the page so playback may start
    fn on_gesture_required(&self);
    /// A non-recoverable problem worth telling the user about
    fn on_error(&self, message: String);
}

/// Commands accepted by a running session
#[derive(Debug)]
pub enum SessionCommand {
    /// The user interacted with the page (autoplay gesture retry)
    UserGesture,
    /// Tear the session down
    Shutdown,
}

/// Handle to a running session loop
#[derive(Clone)]
pub struct SessionHandle {
    command_tx: mpsc::UnboundedSender<SessionCommand>,
}

impl SessionHandle {
    /// Report a user interaction anywhere on the page
    pub fn user_gesture(&self) {
        let _ = self.command_tx.send(SessionCommand::UserGesture);
    }

    /// Stop the session loop, dropping all subscriptions
    pub fn shutdown(&self) {
        let _ = self.command_tx.send(SessionCommand::Shutdown);
    }
}

/// Everything the event loop mutates, separated from the subscriptions so
/// the handlers can borrow it mutably while the receivers are polled
struct SessionState {
    player: Arc<dyn PlaybackSource>,
    channel: Arc<dyn MessageChannel>,
    callback: Arc<dyn SessionCallback>,
    suppressor: FeedbackSuppressor,
    gate: AutoplayGate,
    connection: ConnectionState,
}

impl SessionState {
    /// Local notification path: classify, offer to the suppressor,
    /// transmit on admission
    fn handle_player_notification(&mut self, notification: PlayerNotification) {
        if self.connection != ConnectionState::Open {
            debug!(?notification, "ignoring local event, channel not open");
            return;
        }

        let position = self.player.position();
        if let Some(event) =
            monitor::outbound_event(notification, position, &mut self.suppressor, Instant::now())
        {
            if let Err(e) = self.channel.send(event.encode()) {
                warn!("failed to send {:?} event: {}", event.kind, e);
            }
        }
    }

    /// Channel path: lifecycle transitions and remote command application
    async fn handle_channel_event(&mut self, event: ChannelEvent) {
        match event {
            ChannelEvent::Open => {
                info!("channel open, synchronization active");
                self.connection = ConnectionState::Open;
                self.callback.on_connected();
            }
            ChannelEvent::Message(raw) => {
                if self.connection != ConnectionState::Open {
                    debug!("ignoring message, channel not open");
                    return;
                }
                match applier::apply_remote(
                    &raw,
                    &mut self.suppressor,
                    Instant::now(),
                    self.player.as_ref(),
                    &mut self.gate,
                )
                .await
                {
                    Ok(Some(attempt)) => self.surface_attempt(attempt),
                    Ok(None) => {}
                    Err(e) => warn!("dropping malformed message: {}", e),
                }
            }
            ChannelEvent::Closed => {
                info!("channel closed, stopping synchronization");
                self.connection = ConnectionState::Closed;
                self.callback
                    .on_disconnected("connection closed; reload to re-establish".to_string());
            }
            ChannelEvent::Error(message) => {
                warn!("channel error: {}", message);
                self.connection = ConnectionState::Failed;
                self.callback.on_error(message);
            }
        }
    }

    async fn handle_user_gesture(&mut self) {
        if let Some(attempt) = self.gate.on_user_gesture(self.player.as_ref()).await {
            self.surface_attempt(attempt);
        }
    }

    fn surface_attempt(&self, attempt: PlayAttempt) {
        match attempt {
            PlayAttempt::Started => {}
            PlayAttempt::AwaitingGesture { prompt: true } => self.callback.on_gesture_required(),
            PlayAttempt::AwaitingGesture { prompt: false } => {}
            PlayAttempt::Failed(e) => self.callback.on_error(e.to_string()),
        }
    }
}

/// A two-party synchronization session between the local player and the
/// remote authority behind the channel
pub struct SyncSession {
    state: SessionState,
    notifications: mpsc::UnboundedReceiver<PlayerNotification>,
    channel_events: mpsc::UnboundedReceiver<ChannelEvent>,
}

impl SyncSession {
    /// Wire a session to its collaborators. Subscriptions are taken here,
    /// so no event is lost between construction and `run`.
    pub fn new(
        player: Arc<dyn PlaybackSource>,
        channel: Arc<dyn MessageChannel>,
        callback: Arc<dyn SessionCallback>,
        config: SessionConfig,
    ) -> Self {
        TRACING_INIT.call_once(|| {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| "watchsync_core=info".into()),
                )
                .try_init();
        });

        info!(
            window_ms = config.suppression_window.as_millis() as u64,
            policy = ?config.suppression_policy,
            "initializing session"
        );

        let notifications = player.subscribe();
        let channel_events = channel.subscribe();

        Self {
            state: SessionState {
                player,
                channel,
                callback,
                suppressor: FeedbackSuppressor::new(
                    config.suppression_window,
                    config.suppression_policy,
                ),
                gate: AutoplayGate::new(),
                connection: ConnectionState::Connecting,
            },
            notifications,
            channel_events,
        }
    }

    /// Spawn the event loop and return a handle to it
    pub fn start(self) -> SessionHandle {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        tokio::spawn(self.run(command_rx));
        SessionHandle { command_tx }
    }

    /// Drive the event loop on the current task. Ends on `Shutdown` or
    /// when the command sender is dropped; ending drops both
    /// subscriptions.
    pub async fn run(self, mut command_rx: mpsc::UnboundedReceiver<SessionCommand>) {
        let SyncSession {
            mut state,
            mut notifications,
            mut channel_events,
        } = self;

        loop {
            tokio::select! {
                Some(notification) = notifications.recv() => {
                    state.handle_player_notification(notification);
                }
                Some(event) = channel_events.recv() => {
                    state.handle_channel_event(event).await;
                }
                command = command_rx.recv() => match command {
                    Some(SessionCommand::UserGesture) => state.handle_user_gesture().await,
                    Some(SessionCommand::Shutdown) | None => break,
                },
            }
        }

        info!("session ended");
    }
}
