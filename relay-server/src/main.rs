//! Watch Together - Relay Server
//!
//! A WebSocket fan-out relay: every valid playback event received from
//! one client is forwarded to every other connected client.
//!
//! Usage:
//!   cargo run --release
//!   cargo run --release -- --port 9090

mod handlers;
mod metrics;
mod state;

use std::net::SocketAddr;
use std::time::Duration;

use axum::{routing::get, Router};
use tracing::info;

/// Default listen port
const DEFAULT_PORT: u16 = 8080;

/// How often to log a metrics summary
const METRICS_LOG_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "watchsync_relay=info".into()),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let port = port_from_args(&args);

    let state = state::AppState::new();

    // Periodic metrics summary
    {
        let state = state.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(METRICS_LOG_INTERVAL);
            interval.tick().await;
            loop {
                interval.tick().await;
                let summary = {
                    let m = state.metrics.read();
                    format!(
                        "up {}s: {} connected (peak {}), {} frames relayed, {} invalid",
                        m.uptime_seconds(),
                        m.connected_clients,
                        m.peak_connections,
                        m.messages_relayed,
                        m.decode_failures,
                    )
                };
                info!("{}", summary);
            }
        });
    }

    let app = Router::new()
        .route("/ws", get(handlers::ws_handler))
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("relay listening on ws://{}/ws", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// `--port N`, falling back to the default on anything missing or bogus
fn port_from_args(args: &[String]) -> u16 {
    args.iter()
        .position(|a| a == "--port")
        .and_then(|i| args.get(i + 1))
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT)
}
