//! Room-scoped WebSocket chat relay library.
//!
//! Clients connect to a chat room, post messages and emoji reactions, and
//! receive a live fan-out of everything posted to that room plus the room's
//! history on join.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
