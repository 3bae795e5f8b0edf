//! WebSocket surface between `wrldbldr-player` and the turn controller (§6).
//!
//! Grounded in the predecessor's `api/websocket.rs`: a channel-backed send
//! task paired with a receive loop, `axum::extract::ws` framing, messages
//! serialized as JSON text frames. Simplified for a single-player turn loop
//! (no `ConnectionManager`/broadcast fan-out - one `TurnController` per
//! connection, per §4.C9 and §5's "one tokio task per interaction loop").

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
    routing::get,
    Router,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use uuid::Uuid;
use wrldbldr_shared::{ClientMessage, ServerMessage};

use crate::app::App;

const CONNECTION_CHANNEL_BUFFER: usize = 64;

/// The router exposed by `wrldbldr-engine`'s binary: one `/ws` upgrade route.
pub fn router(app: Arc<App>) -> Router {
    Router::new().route("/ws", get(ws_handler)).with_state(app)
}

async fn ws_handler(ws: WebSocketUpgrade, State(app): State<Arc<App>>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, app))
}

async fn handle_socket(socket: WebSocket, app: Arc<App>) {
    let connection_id = Uuid::new_v4();
    let (mut ws_sender, mut ws_receiver) = socket.split();
    let (tx, mut rx) = mpsc::channel::<ServerMessage>(CONNECTION_CHANNEL_BUFFER);

    tracing::info!(%connection_id, "websocket connection established");

    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Ok(json) = serde_json::to_string(&msg) {
                if ws_sender.send(Message::Text(json.into())).await.is_err() {
                    break;
                }
            }
        }
    });

    let mut controller = app.new_turn_controller();

    while let Some(result) = ws_receiver.next().await {
        match result {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(message) => {
                    let responses = match controller.handle_client_message(message).await {
                        Ok(responses) => responses,
                        Err(err) => {
                            tracing::warn!(%connection_id, error = %err, "turn controller rejected message");
                            vec![ServerMessage::Error { kind: "InvalidTransition".to_string(), message: err.to_string() }]
                        }
                    };
                    for response in responses {
                        if tx.try_send(response).is_err() {
                            tracing::warn!(%connection_id, "response channel full or closed");
                            break;
                        }
                    }
                }
                Err(err) => {
                    tracing::warn!(%connection_id, error = %err, "failed to parse client message");
                    let error = ServerMessage::Error { kind: "ParseError".to_string(), message: err.to_string() };
                    let _ = tx.try_send(error);
                }
            },
            Ok(Message::Close(_)) => {
                tracing::info!(%connection_id, "websocket closed by client");
                break;
            }
            Err(err) => {
                tracing::error!(%connection_id, error = %err, "websocket error");
                break;
            }
            _ => {}
        }
    }

    send_task.abort();
    tracing::info!(%connection_id, "websocket connection closed");
}
