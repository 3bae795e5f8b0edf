//! Terminal client implementing the UI collaborator interface of §6 over a
//! WebSocket connection to `wrldbldr-engine`: a thin
//! `show_actions`/`show_narration`/`show_error` loop, no rendering, camera,
//! or audio.

pub mod client;
pub mod config;
pub mod session;
pub mod terminal;
