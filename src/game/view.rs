//! HTML fragments for the player list and round clock.
//!
//! Pure functions of a state snapshot; no state of their own.

use crate::game::state::{CurrentRound, RoundState};
use crate::routes::util::escape_html;

/// One player row.
pub fn render_player_item(name: &str, score: i32, is_guesser: bool) -> String {
    let name = escape_html(name);
    let (row_class, badge) = if is_guesser {
        (
            "bg-amber-100 border-amber-400",
            r#"<span class="text-xs font-bold text-amber-700" title="Guesser">&#x1F914;</span>"#,
        )
    } else {
        ("bg-white border-slate-200", "")
    };
    format!(
        r#"<div class="player-item flex items-center justify-between gap-2 py-1 px-2 rounded border {row_class}" data-player="{name}"><div>{name}</div>{badge}<span class="font-bold tabular-nums">{score}</span></div>"#
    )
}

/// All players of `round` in join order. Empty string when there is no
/// round entry or no players.
pub fn render_player_list(round: Option<&RoundState>) -> String {
    let Some(round) = round else {
        return String::new();
    };
    let mut html = String::with_capacity(128 * round.players.len().max(1));
    for player in &round.players {
        html.push_str(&render_player_item(
            &player.name,
            player.score,
            round.is_guesser(&player.name),
        ));
    }
    html
}

/// Format seconds as `m:ss`.
pub fn format_clock(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// Round header: number (1-based for display), clock, and controls.
pub fn render_round_status(current: &CurrentRound) -> String {
    let mut html = String::with_capacity(1024);
    html.push_str(r#"<div id="round-status" class="p-3 text-slate-800">"#);
    html.push_str(&format!(
        r#"<p class="text-lg font-bold">Round {}</p>"#,
        current.number + 1
    ));

    let clock_class = if current.time == 0 {
        "text-red-600"
    } else if current.running {
        "text-emerald-700"
    } else {
        "text-slate-500"
    };
    html.push_str(&format!(
        r#"<p class="text-3xl tabular-nums {}" data-running="{}">{}</p>"#,
        clock_class,
        current.running,
        format_clock(current.time)
    ));

    html.push_str(r#"<div class="flex gap-2 mt-2">"#);
    if current.running {
        html.push_str(&round_button("pause", "Pause"));
    } else if current.time > 0 {
        html.push_str(&round_button("start", "Start"));
    } else {
        html.push_str(r#"<span class="text-sm font-bold text-red-600">Time's up!</span>"#);
    }
    html.push_str(&round_button("next", "Next Round"));
    html.push_str(r#"</div></div>"#);
    html
}

fn round_button(action: &str, label: &str) -> String {
    format!(
        r##"<button class="py-1 px-3 rounded bg-slate-700 hover:bg-slate-600 text-white text-sm font-bold" onclick="htmx.ajax('POST', '/api/game/round', {{values: {{action: '{action}'}}, target: '#round-status', swap: 'outerHTML'}})">{label}</button>"##
    )
}
