//! Metrics tracking for the relay server

use chrono::{DateTime, Local};

/// Server metrics
pub struct Metrics {
    /// Server start time
    pub start_time: DateTime<Local>,

    /// Current number of connected clients
    pub connected_clients: usize,

    /// Total connections since start
    pub total_connections: u64,

    /// Peak simultaneous connections
    pub peak_connections: usize,

    /// Frames accepted and fanned out
    pub messages_relayed: u64,

    /// Bytes relayed (payload bytes times recipients)
    pub bytes_relayed: u64,

    /// Frames dropped because they failed validation
    pub decode_failures: u64,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            start_time: Local::now(),
            connected_clients: 0,
            total_connections: 0,
            peak_connections: 0,
            messages_relayed: 0,
            bytes_relayed: 0,
            decode_failures: 0,
        }
    }

    /// Record a new client connection
    pub fn client_connected(&mut self) {
        self.connected_clients += 1;
        self.total_connections += 1;
        if self.connected_clients > self.peak_connections {
            self.peak_connections = self.connected_clients;
        }
    }

    /// Record a client going away
    pub fn client_disconnected(&mut self) {
        self.connected_clients = self.connected_clients.saturating_sub(1);
    }

    /// Record one accepted frame fanned out to `recipients` clients
    pub fn message_relayed(&mut self, payload_bytes: usize, recipients: usize) {
        self.messages_relayed += 1;
        self.bytes_relayed += (payload_bytes * recipients) as u64;
    }

    /// Record a frame dropped by validation
    pub fn decode_failure(&mut self) {
        self.decode_failures += 1;
    }

    /// Seconds since the server started
    pub fn uptime_seconds(&self) -> i64 {
        (Local::now() - self.start_time).num_seconds()
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
