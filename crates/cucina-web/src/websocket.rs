//! WebSocket handler for the live dashboard channel.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::dispatch::handle_client_message;
use crate::registry::FramePayload;
use crate::state::AppState;

/// Frames buffered per connection before the send timeout starts biting.
const OUTBOUND_BUFFER: usize = 8;

/// WebSocket upgrade handler.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Handle one dashboard connection for its whole lifetime.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();

    // First frame goes out immediately so a fresh client (or one that just
    // reconnected) never waits a full tick for its state.
    let initial = state.current_frame().await;
    match serde_json::to_string(&initial) {
        Ok(json) => {
            if sender.send(Message::Text(json.into())).await.is_err() {
                debug!("client disconnected before the initial frame");
                return;
            }
        }
        Err(err) => {
            debug!(error = %err, "failed to serialize initial frame");
        }
    }

    let (tx, mut rx) = mpsc::channel::<FramePayload>(OUTBOUND_BUFFER);
    let id = state.registry.register(tx);
    info!(connection = %id, clients = state.registry.len(), "dashboard client connected");

    // Forward broadcast payloads to this client until its channel closes.
    let mut send_task = tokio::spawn(async move {
        while let Some(payload) = rx.recv().await {
            if sender
                .send(Message::Text(payload.to_string().into()))
                .await
                .is_err()
            {
                debug!("websocket send failed, client disconnected");
                break;
            }
        }
    });

    // Handle inbound control frames, in arrival order.
    let controls = state.controls.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => {
                    handle_client_message(&controls, text.as_str()).await;
                }
                Message::Close(_) => {
                    debug!("websocket client sent close frame");
                    break;
                }
                _ => {}
            }
        }
    });

    // Either side ending tears the connection down; aborting the peer
    // cancels any in-flight send promptly.
    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    state.registry.unregister(id);
    info!(connection = %id, clients = state.registry.len(), "dashboard client disconnected");
}
