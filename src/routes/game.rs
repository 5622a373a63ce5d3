//! `/api/game/round`, `/api/game/reset`, `/api/game/state` routes — round
//! clock control and state snapshots.

use crate::game::session;
use crate::game::view::render_round_status;
use crate::routes::util::{error_span, get_param, parse_form_body};

// ── GET /api/game/round ────────────────────────────────────────────

/// Handle GET /api/game/round
/// Returns the round header (number, clock, controls). Polled by the page
/// while the clock runs.
pub fn handle_round_get(_query: &str) -> String {
    session::with_session(|game| render_round_status(&game.game().current_round))
        .unwrap_or_else(|e| error_span(&e.to_string()))
}

// ── POST /api/game/round ───────────────────────────────────────────

/// Handle POST /api/game/round
/// Body params:
///   - action=start → start (or restart) the countdown
///   - action=pause → stop the countdown, keep remaining time
///   - action=next  → advance to the next round with a full clock
///
/// Returns the updated round header.
pub fn handle_round_post(body: &str) -> String {
    let params = parse_form_body(body);
    let action = get_param(&params, "action").unwrap_or("");

    let applied = session::with_session(|game| match action {
        "start" => {
            game.start_round();
            true
        }
        "pause" => {
            game.pause_round();
            true
        }
        "next" => {
            game.next_round();
            true
        }
        _ => false,
    });

    match applied {
        Ok(true) => handle_round_get(""),
        Ok(false) => error_span("Missing or unknown action parameter"),
        Err(e) => error_span(&e.to_string()),
    }
}

// ── POST /api/game/reset ───────────────────────────────────────────

/// Handle POST /api/game/reset
/// Back to round 1 with a full clock. Player history is kept.
pub fn handle_reset_post(_body: &str) -> String {
    match session::with_session(|game| game.reset_game()) {
        Ok(()) => handle_round_get(""),
        Err(e) => error_span(&e.to_string()),
    }
}

// ── GET /api/game/state ────────────────────────────────────────────

/// Handle GET /api/game/state
/// Returns the full game snapshot as JSON.
pub fn handle_state_get(_query: &str) -> String {
    match session::with_session(|game| serde_json::to_string(&game.game())) {
        Ok(Ok(json)) => json,
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "failed to serialize game state");
            "{}".to_string()
        }
        Err(e) => error_span(&e.to_string()),
    }
}
