//! Shared relay state
//!
//! Registry of connected clients plus the fan-out path: every valid frame
//! from one client goes to every other client, never back to its sender.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::extract::ws::Message;
use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use watchsync_core::PlaybackEvent;

use crate::metrics::Metrics;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    /// Outbound queues of connected clients, keyed by client id
    clients: Mutex<HashMap<u64, mpsc::UnboundedSender<Message>>>,
    next_client_id: AtomicU64,
    pub metrics: RwLock<Metrics>,
}

impl AppState {
    pub fn new() -> SharedState {
        Arc::new(Self {
            clients: Mutex::new(HashMap::new()),
            next_client_id: AtomicU64::new(1),
            metrics: RwLock::new(Metrics::new()),
        })
    }

    /// Register a client's outbound queue; returns its id
    pub fn register(&self, tx: mpsc::UnboundedSender<Message>) -> u64 {
        let id = self.next_client_id.fetch_add(1, Ordering::Relaxed);
        self.clients.lock().insert(id, tx);
        self.metrics.write().client_connected();
        id
    }

    /// Remove a client. Safe to call twice; pruned clients are a no-op.
    pub fn deregister(&self, id: u64) {
        if self.clients.lock().remove(&id).is_some() {
            self.metrics.write().client_disconnected();
        }
    }

    pub fn client_count(&self) -> usize {
        self.clients.lock().len()
    }

    /// Validate a frame and forward it to every client except its sender.
    /// Clients whose socket task is gone are pruned on the way.
    pub fn relay_message(&self, from: u64, text: &str) {
        let event = match PlaybackEvent::decode(text) {
            Ok(event) => event,
            Err(e) => {
                warn!(client = from, "dropping invalid frame: {}", e);
                self.metrics.write().decode_failure();
                return;
            }
        };
        debug!(client = from, kind = ?event.kind, "relaying frame");

        let mut delivered = 0;
        let mut pruned = 0;
        self.clients.lock().retain(|&id, tx| {
            if id == from {
                return true;
            }
            if tx.send(Message::Text(text.to_string())).is_ok() {
                delivered += 1;
                true
            } else {
                pruned += 1;
                false
            }
        });

        let mut metrics = self.metrics.write();
        metrics.message_relayed(text.len(), delivered);
        for _ in 0..pruned {
            metrics.client_disconnected();
        }
    }
}
