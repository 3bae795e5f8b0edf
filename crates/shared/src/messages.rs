//! Wire messages exchanged between `wrldbldr-engine` and `wrldbldr-player`.
//!
//! These are plain DTOs with no business logic (per this crate's design
//! principles, see `lib.rs`): they mirror the UI collaborator interface of
//! §6 (`show_actions`, `show_narration`, `show_error`) and the inbound
//! vertex/choice events that drive C9/C8 from the far side of the socket.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use wrldbldr_domain::{ActionChoice, LocationId};

/// A message sent from the player client to the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Join or resume a session (player identity is opaque to the engine).
    Hello { connection_id: Uuid },

    /// World-map event: the avatar has arrived at a vertex (§6, §4.C9).
    /// `location_id` is the concrete location id if the vertex has one, or
    /// the controller-synthesised `"<biome>_<vertex>"` id otherwise.
    VertexArrived { location_id: LocationId },

    /// The player selected a candidate action by index into the most recent
    /// `ActionsOffered` message (§4.C8 `AwaitingChoice`).
    ChooseAction { choice_index: usize },

    /// The player asked to leave the current interaction (designated leave
    /// action, or an explicit "step back" command).
    LeaveLocation,
}

/// A message sent from the engine to the player client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// `show_actions`: present candidate choices produced by the Director role.
    ActionsOffered { location_id: LocationId, choices: Vec<ActionChoice> },

    /// `show_narration`: prose produced by the Narrator role for the chosen outcome.
    Narration { text: String },

    /// `show_error`: a terminal error for the current interaction (§7). The
    /// player returns to `WorldView` after acknowledging.
    Error { kind: String, message: String },

    /// The interaction loop ended (§4.C8 `End`); control returns to `WorldView`.
    InteractionEnded { location_id: LocationId },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_message_round_trips_through_json() {
        let msg = ClientMessage::ChooseAction { choice_index: 2 };
        let json = serde_json::to_string(&msg).unwrap();
        let back: ClientMessage = serde_json::from_str(&json).unwrap();
        assert!(matches!(back, ClientMessage::ChooseAction { choice_index: 2 }));
    }

    #[test]
    fn server_error_message_carries_a_kind_and_a_message() {
        let msg = ServerMessage::Error {
            kind: "LmTimeout".to_string(),
            message: "Director did not respond within 30s".to_string(),
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(json["kind"], "LmTimeout");
    }
}
