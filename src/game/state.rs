//! Game data model.
//!
//! Plain serializable data only. The live timer resource is owned by
//! [`GameManager`](crate::game::manager::GameManager); the model just carries
//! a `running` flag mirroring it.

use serde::{Deserialize, Serialize};

/// Seconds on the clock at the start of every round.
pub const DEFAULT_ROUND_TIME: u32 = 60;

/// One player's score within a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerScore {
    pub name: String,
    pub score: i32,
}

/// Per-round scoring state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundState {
    /// Players in join order. Names are unique.
    pub players: Vec<PlayerScore>,
    /// Player currently guessing. Empty string = unset.
    pub guesser: String,
}

impl RoundState {
    /// Whether `name` is a player in this round.
    pub fn has_player(&self, name: &str) -> bool {
        self.players.iter().any(|p| p.name == name)
    }

    /// Overwrite the score for `name`, appending the player if absent.
    /// Existing players keep their join position.
    pub fn upsert_score(&mut self, name: &str, score: i32) {
        match self.players.iter_mut().find(|p| p.name == name) {
            Some(player) => player.score = score,
            None => self.players.push(PlayerScore {
                name: name.to_string(),
                score,
            }),
        }
    }

    pub fn is_guesser(&self, name: &str) -> bool {
        !self.guesser.is_empty() && self.guesser == name
    }
}

/// Round index plus countdown sub-state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentRound {
    /// Zero-based round number.
    pub number: usize,
    /// Seconds remaining. Never negative; reaching 0 stops the timer.
    pub time: u32,
    /// Whether a repeating timer is currently ticking this round down.
    pub running: bool,
}

impl CurrentRound {
    pub fn new(round_time: u32) -> Self {
        Self {
            number: 0,
            time: round_time,
            running: false,
        }
    }
}

impl Default for CurrentRound {
    fn default() -> Self {
        Self::new(DEFAULT_ROUND_TIME)
    }
}

/// Root aggregate for one game session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub current_round: CurrentRound,
    /// One entry per round that has scoring state, indexed by round number.
    /// May lag behind `current_round.number`.
    pub rounds: Vec<RoundState>,
}

impl Game {
    /// Fresh game: round 0 with a full clock and one empty round entry.
    pub fn new(round_time: u32) -> Self {
        Self {
            current_round: CurrentRound::new(round_time),
            rounds: vec![RoundState::default()],
        }
    }

    /// Round entry for the current round number, if one exists.
    pub fn current(&self) -> Option<&RoundState> {
        self.rounds.get(self.current_round.number)
    }

    pub fn current_mut(&mut self) -> Option<&mut RoundState> {
        self.rounds.get_mut(self.current_round.number)
    }

    /// Round entry for the current round number, creating blank entries
    /// up to and including that index when missing.
    pub fn current_or_insert(&mut self) -> &mut RoundState {
        let index = self.current_round.number;
        if self.rounds.len() <= index {
            self.rounds.resize_with(index + 1, RoundState::default);
        }
        &mut self.rounds[index]
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new(DEFAULT_ROUND_TIME)
    }
}
