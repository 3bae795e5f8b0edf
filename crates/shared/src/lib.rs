//! wrldbldr-shared - Wire types for Engine/Player communication
//!
//! This crate contains the types shared between the Engine (server) and the
//! Player (client):
//! - WebSocket message types (`ClientMessage`, `ServerMessage`)
//!
//! # Design Principles
//!
//! 1. **Minimal dependencies** - serde, serde_json, uuid, thiserror, tracing
//! 2. **No business logic** - pure data types and serialization
//! 3. **Domain types pass through** - action/id types come straight from
//!    `wrldbldr_domain` rather than being re-declared here

pub mod messages;

pub use messages::{ClientMessage, ServerMessage};
