//! Route handlers for `handle_request`. Each takes the raw query or form body
//! and returns an HTML fragment (or JSON for `/api/game/state`).

pub mod game;
pub mod player;
pub mod util;
