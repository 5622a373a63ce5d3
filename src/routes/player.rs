//! `/api/game/players`, `/api/game/score`, `/api/game/guesser` routes —
//! roster and per-round scoring.
//!
//! Every handler answers with the re-rendered player list so HTMX can swap
//! it straight into the page.

use crate::game::error::GameError;
use crate::game::session;
use crate::game::view::render_player_list;
use crate::routes::util::{error_span, name_param, parse_form_body, parse_param};

// ── GET /api/game/players ──────────────────────────────────────────

/// Handle GET /api/game/players
/// Returns one row per player of the current round (empty when none).
pub fn handle_players_get(_query: &str) -> String {
    render_current_players().unwrap_or_else(|e| error_span(&e.to_string()))
}

// ── POST /api/game/players ─────────────────────────────────────────

/// Handle POST /api/game/players
/// Body: name={player}
pub fn handle_players_post(body: &str) -> String {
    let params = parse_form_body(body);
    let Some(name) = name_param(&params, "name") else {
        return error_span("Missing name parameter");
    };
    respond(session::try_with_session(|game| game.add_new_player(name)))
}

// ── POST /api/game/score ───────────────────────────────────────────

/// Handle POST /api/game/score
/// Body: name={player}&score={n}
pub fn handle_score_post(body: &str) -> String {
    let params = parse_form_body(body);
    let Some(name) = name_param(&params, "name") else {
        return error_span("Missing name parameter");
    };
    let Some(score) = parse_param::<i32>(&params, "score") else {
        return error_span("Missing or invalid score parameter");
    };
    respond(session::try_with_session(|game| game.set_score(name, score)))
}

// ── POST /api/game/guesser ─────────────────────────────────────────

/// Handle POST /api/game/guesser
/// Body: name={player}
pub fn handle_guesser_post(body: &str) -> String {
    let params = parse_form_body(body);
    let Some(name) = name_param(&params, "name") else {
        return error_span("Missing name parameter");
    };
    respond(session::try_with_session(|game| game.set_guesser(name)))
}

fn render_current_players() -> Result<String, GameError> {
    session::with_session(|game| render_player_list(game.current_round().as_ref()))
}

/// On failure, show the error above the unchanged list.
fn respond(result: Result<(), GameError>) -> String {
    match result {
        Ok(()) => handle_players_get(""),
        Err(GameError::MissingContext) => error_span(&GameError::MissingContext.to_string()),
        Err(e) => {
            let mut html = error_span(&e.to_string());
            html.push_str(&render_current_players().unwrap_or_default());
            html
        }
    }
}
