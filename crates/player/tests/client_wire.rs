//! Exercises `EngineClient` against a minimal in-process server that mimics
//! `wrldbldr-engine`'s `/ws` handler contract: one or more `ServerMessage`
//! frames per `ClientMessage`, a `Narration` always ahead of the
//! `ActionsOffered`/`InteractionEnded` that closes a turn.

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;
use wrldbldr_domain::{ActionChoice, LocationId};
use wrldbldr_player::client::EngineClient;
use wrldbldr_shared::{ClientMessage, ServerMessage};

async fn spawn_fake_engine() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind a loopback port");
    let addr = listener.local_addr().expect("listener has a local address");

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("accept a connection");
        let mut ws = tokio_tungstenite::accept_async(stream).await.expect("complete the websocket handshake");

        while let Some(Ok(Message::Text(text))) = ws.next().await {
            let message: ClientMessage = serde_json::from_str(&text).expect("valid client message");
            let replies = match message {
                ClientMessage::Hello { .. } => vec![ServerMessage::Narration { text: "connected".to_string() }],
                ClientMessage::VertexArrived { location_id } => {
                    let choice = ActionChoice::new("Creep quietly toward the treeline", "stealth", 1).expect("valid action choice");
                    vec![ServerMessage::ActionsOffered { location_id, choices: vec![choice] }]
                }
                ClientMessage::ChooseAction { .. } => vec![
                    ServerMessage::Narration { text: "You creep forward without a sound.".to_string() },
                    ServerMessage::InteractionEnded { location_id: LocationId::from("forest_1") },
                ],
                ClientMessage::LeaveLocation => vec![ServerMessage::InteractionEnded { location_id: LocationId::from("forest_1") }],
            };
            for reply in replies {
                let json = serde_json::to_string(&reply).expect("reply serializes");
                if ws.send(Message::Text(json.into())).await.is_err() {
                    return;
                }
            }
        }
    });

    format!("ws://{addr}")
}

#[tokio::test]
async fn hello_then_vertex_arrived_receives_actions_offered() {
    let url = spawn_fake_engine().await;
    let mut client = EngineClient::connect(&url).await.expect("connect to the fake engine");

    let hello_reply = client.hello().await.expect("hello round-trips");
    assert!(matches!(hello_reply, ServerMessage::Narration { .. }));

    client.send(&ClientMessage::VertexArrived { location_id: LocationId::from("forest_1") }).await.expect("send succeeds");
    let reply = client.recv().await.expect("receive a reply");
    assert!(matches!(reply, ServerMessage::ActionsOffered { .. }));
}

#[tokio::test]
async fn choosing_an_action_yields_narration_before_the_closing_message() {
    let url = spawn_fake_engine().await;
    let mut client = EngineClient::connect(&url).await.expect("connect to the fake engine");
    client.hello().await.expect("hello round-trips");

    client.send(&ClientMessage::VertexArrived { location_id: LocationId::from("forest_1") }).await.expect("send succeeds");
    client.recv().await.expect("receive the actions-offered reply");

    client.send(&ClientMessage::ChooseAction { choice_index: 0 }).await.expect("send succeeds");
    let first = client.recv().await.expect("receive the narration");
    let second = client.recv().await.expect("receive the closing message");

    assert!(matches!(first, ServerMessage::Narration { .. }));
    assert!(matches!(second, ServerMessage::InteractionEnded { .. }));
}
