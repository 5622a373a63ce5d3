//! Party guessing-game scorekeeper, as an in-browser WASM server.
//!
//! Exports `handle_request(method, path, query, body)` for the Web Worker
//! bridge to call. Uses `matchit` for URL routing. The game session itself
//! is created once by `init_game` (see [`bridge`]) and every route works
//! against it; before that, routes answer with a "not initialized" fragment.

use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
pub mod bridge;
pub mod game;
pub mod routes;

/// Process an HTTP-like request and return an HTML fragment.
///
/// Called from JavaScript (Web Worker) via wasm-bindgen.
///
/// # Arguments
/// * `method` — HTTP method ("GET" or "POST")
/// * `path`   — URL path (e.g., "/api/game/players")
/// * `query`  — Query string (e.g., "?foo=bar")
/// * `body`   — Request body (URL-encoded form data). Empty string for GET requests.
///
/// # Returns
/// An HTML string fragment suitable for HTMX to swap into the DOM, or JSON
/// for `/api/game/state`.
#[wasm_bindgen]
pub fn handle_request(method: &str, path: &str, query: &str, body: &str) -> String {
    let mut router = matchit::Router::new();

    // The value is a tag we match on below
    router.insert("/api/game/players", "players").ok();
    router.insert("/api/game/score", "score").ok();
    router.insert("/api/game/guesser", "guesser").ok();
    router.insert("/api/game/round", "round").ok();
    router.insert("/api/game/reset", "reset").ok();
    router.insert("/api/game/state", "state").ok();

    match router.at(path) {
        Ok(matched) => match (*matched.value, method) {
            ("players", "GET") => routes::player::handle_players_get(query),
            ("players", "POST") => routes::player::handle_players_post(body),
            ("score", "POST") => routes::player::handle_score_post(body),
            ("guesser", "POST") => routes::player::handle_guesser_post(body),
            ("round", "GET") => routes::game::handle_round_get(query),
            ("round", "POST") => routes::game::handle_round_post(body),
            ("reset", "POST") => routes::game::handle_reset_post(body),
            ("state", "GET") => routes::game::handle_state_get(query),
            _ => method_not_allowed(),
        },
        Err(_) => not_found(),
    }
}

fn not_found() -> String {
    routes::util::error_span("404 — route not found")
}

fn method_not_allowed() -> String {
    routes::util::error_span("405 — method not allowed")
}
