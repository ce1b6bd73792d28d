//! WebSocket connection handling

use std::net::SocketAddr;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        ConnectInfo, State,
    },
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::state::SharedState;

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(state): State<SharedState>,
) -> impl IntoResponse {
    info!("client connecting: {}", addr);
    ws.on_upgrade(move |socket| handle_socket(socket, addr, state))
}

pub async fn handle_socket(socket: WebSocket, addr: SocketAddr, state: SharedState) {
    let (mut sender, mut receiver) = socket.split();

    // Register this client's outbound queue
    let (tx, mut rx) = mpsc::unbounded_channel();
    let client_id = state.register(tx);
    info!(
        "client {} connected from {} ({} online)",
        client_id,
        addr,
        state.client_count()
    );

    loop {
        tokio::select! {
            // Frames relayed from other clients
            outbound = rx.recv() => match outbound {
                Some(message) => {
                    if sender.send(message).await.is_err() {
                        break;
                    }
                }
                None => break,
            },

            // Frames from this client
            inbound = receiver.next() => match inbound {
                Some(Ok(Message::Text(text))) => state.relay_message(client_id, &text),
                Some(Ok(Message::Close(_))) | None => break,
                // Ping/pong are answered by axum; binary is not part of
                // the protocol
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!("client {} socket error: {}", client_id, e);
                    break;
                }
            },
        }
    }

    state.deregister(client_id);
    info!(
        "client {} disconnected ({} online)",
        client_id,
        state.client_count()
    );
}
