//! Desktop WebSocket transport to `wrldbldr-engine` (§6 UI collaborator wire).
//!
//! Grounded in the predecessor's `infrastructure/websocket/desktop/client.rs`
//! for the `connect_async`/JSON-text-frame shape, simplified for a turn loop
//! that is strictly one client at a time against one server: no split
//! read/write tasks, no `pending_requests` map, no reconnect-with-backoff
//! state machine. The engine answers each `ClientMessage` with one or more
//! `ServerMessage` frames (a `Narration` ahead of the
//! `ActionsOffered`/`InteractionEnded` that closes the turn) before reading
//! its next frame, so the caller just keeps calling `recv` until it sees a
//! message that calls for a new send. A dropped socket simply ends the
//! session.

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use uuid::Uuid;
use wrldbldr_shared::{ClientMessage, ServerMessage};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("failed to connect to engine at {url}: {source}")]
    Connect { url: String, source: tokio_tungstenite::tungstenite::Error },
    #[error("websocket transport error: {0}")]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),
    #[error("engine closed the connection")]
    Closed,
    #[error("received a non-text frame from the engine")]
    UnexpectedFrame,
    #[error("failed to decode server message: {0}")]
    Decode(#[from] serde_json::Error),
}

/// A single connection to the engine's `/ws` endpoint.
pub struct EngineClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl EngineClient {
    pub async fn connect(url: &str) -> Result<Self, ClientError> {
        let (stream, _response) = tokio_tungstenite::connect_async(url)
            .await
            .map_err(|source| ClientError::Connect { url: url.to_string(), source })?;
        tracing::info!(%url, "connected to engine");
        Ok(Self { stream })
    }

    /// Send the `Hello` handshake the engine expects as the first frame.
    pub async fn hello(&mut self) -> Result<ServerMessage, ClientError> {
        self.send(&ClientMessage::Hello { connection_id: Uuid::new_v4() }).await?;
        self.recv().await
    }

    pub async fn send(&mut self, message: &ClientMessage) -> Result<(), ClientError> {
        let json = serde_json::to_string(message)?;
        self.stream.send(Message::Text(json.into())).await?;
        Ok(())
    }

    /// Block for the engine's next reply frame. Turns may produce more than
    /// one frame (`Narration` followed by `ActionsOffered`/`InteractionEnded`),
    /// so callers drive their own loop rather than expecting one reply per send.
    pub async fn recv(&mut self) -> Result<ServerMessage, ClientError> {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => return Ok(serde_json::from_str(&text)?),
                Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => continue,
                Some(Ok(Message::Close(_))) | None => return Err(ClientError::Closed),
                Some(Ok(_)) => return Err(ClientError::UnexpectedFrame),
                Some(Err(err)) => return Err(ClientError::Transport(err)),
            }
        }
    }
}
