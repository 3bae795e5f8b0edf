//! Drives a single `LocationInteraction` (§4.C9, §4.C8) end to end over an
//! [`EngineClient`], dispatching each `ServerMessage` to the matching
//! `show_*` terminal function and translating the player's terminal input
//! back into a `ClientMessage`. A turn may arrive as more than one frame (a
//! `Narration` ahead of the `ActionsOffered`/`InteractionEnded` that closes
//! it), so the loop below keeps receiving until it hits a frame that calls
//! for either a new send or the end of the session.

use wrldbldr_domain::LocationId;
use wrldbldr_shared::{ClientMessage, ServerMessage};

use crate::client::{ClientError, EngineClient};
use crate::terminal;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error(transparent)]
    Terminal(#[from] terminal::TerminalError),
}

/// Enters `location_id` and plays out the interaction loop until the
/// engine reports `InteractionEnded` (or a terminal `Error`), then returns.
pub async fn play_location(client: &mut EngineClient, location_id: LocationId) -> Result<(), SessionError> {
    client.send(&ClientMessage::VertexArrived { location_id }).await?;

    loop {
        match client.recv().await? {
            ServerMessage::Narration { text } => {
                terminal::show_narration(&text);
            }
            ServerMessage::ActionsOffered { choices, .. } => {
                let leave_index = choices.len();
                let chosen = terminal::show_actions(&choices)?;
                let next = if chosen == leave_index {
                    ClientMessage::LeaveLocation
                } else {
                    ClientMessage::ChooseAction { choice_index: chosen }
                };
                client.send(&next).await?;
            }
            ServerMessage::Error { kind, message } => {
                terminal::show_error(&kind, &message)?;
                return Ok(());
            }
            ServerMessage::InteractionEnded { .. } => {
                println!("\n(left the location)");
                return Ok(());
            }
        }
    }
}
