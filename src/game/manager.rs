//! Game state manager — owns the authoritative [`Game`] and the round timer.
//!
//! Every mutation goes through a method here. After each successful mutation
//! (including every timer tick) subscribed observers receive a snapshot,
//! called once all internal borrows are released so they may read back into
//! the manager.
//!
//! Round timer states: Idle → Running on `start_round` (only with time left);
//! Running → Idle on `pause_round`, `next_round`, `reset_game`, or when the
//! countdown hits 0. `start_round` while Running replaces the timer.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::num::ParseIntError;
use std::rc::Rc;
use std::str::FromStr;

use tracing::{debug, info, warn};

use crate::game::config::GameConfig;
use crate::game::error::GameError;
use crate::game::state::{CurrentRound, Game, RoundState};
use crate::game::timer::{RepeatingTimer, Scheduler};

type Observer = Rc<dyn Fn(&Game)>;

/// Returned by [`GameManager::subscribe`]; pass to `unsubscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SubscriptionId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(SubscriptionId)
    }
}

/// State shared with the timer callback (held there weakly).
struct Shared {
    game: RefCell<Game>,
    /// At most one live interval. Kept (cancelled) after the countdown
    /// expires until the next operation replaces or clears it.
    timer: RefCell<Option<Box<dyn RepeatingTimer>>>,
    observers: RefCell<Vec<(SubscriptionId, Observer)>>,
    next_subscription: Cell<u64>,
}

impl Shared {
    /// One second elapsed on the round clock.
    fn tick(&self) {
        {
            let mut game = self.game.borrow_mut();
            let round = &mut game.current_round;
            if !round.running {
                return;
            }
            round.time = round.time.saturating_sub(1);
            if round.time == 0 {
                round.running = false;
                if let Some(timer) = self.timer.borrow_mut().as_mut() {
                    timer.cancel();
                }
                info!(round = round.number, "round time expired");
            }
        }
        self.notify();
    }

    /// Drop the active timer, if any. Returns whether one was running.
    fn clear_timer(&self) -> bool {
        let previous = self.timer.borrow_mut().take();
        previous.is_some_and(|timer| timer.is_active())
    }

    fn notify(&self) {
        let observers: Vec<Observer> = self
            .observers
            .borrow()
            .iter()
            .map(|(_, observer)| Rc::clone(observer))
            .collect();
        if observers.is_empty() {
            return;
        }
        let snapshot = self.game.borrow().clone();
        for observer in observers {
            observer(&snapshot);
        }
    }
}

/// Owns one game session. Build once per session and pass it to consumers.
pub struct GameManager {
    shared: Rc<Shared>,
    scheduler: Rc<dyn Scheduler>,
    config: GameConfig,
}

impl GameManager {
    /// New session: round 0, full clock, one empty round entry.
    pub fn new(config: GameConfig, scheduler: Rc<dyn Scheduler>) -> Self {
        let game = Game::new(config.round_time_secs);
        Self {
            shared: Rc::new(Shared {
                game: RefCell::new(game),
                timer: RefCell::new(None),
                observers: RefCell::new(Vec::new()),
                next_subscription: Cell::new(0),
            }),
            scheduler,
            config,
        }
    }

    // ── Mutations ──────────────────────────────────────────────────

    /// Join `name` to the current round with score 0. Re-adding an existing
    /// player resets their score.
    pub fn add_new_player(&self, name: &str) -> Result<(), GameError> {
        {
            let mut game = self.shared.game.borrow_mut();
            let round = game.current_round.number;
            if round > 0 && !self.config.allow_late_players {
                warn!(round, player = name, "rejected new player after game start");
                return Err(GameError::GameAlreadyStarted { round });
            }
            game.current_or_insert().upsert_score(name, 0);
            debug!(round, player = name, "player added");
        }
        self.shared.notify();
        Ok(())
    }

    /// Back to round 0 with a full clock and no timer. Round history is kept,
    /// so round 0's players and scores come back with it.
    pub fn reset_game(&self) {
        let stopped = self.shared.clear_timer();
        let fresh = CurrentRound::new(self.config.round_time_secs);
        self.shared.game.borrow_mut().current_round = fresh;
        info!(stopped_timer = stopped, "game reset");
        self.shared.notify();
    }

    pub fn set_score(&self, name: &str, score: i32) -> Result<(), GameError> {
        {
            let mut game = self.shared.game.borrow_mut();
            let round = valid_player_round(&mut game, name)?;
            round.upsert_score(name, score);
            debug!(player = name, score, "score set");
        }
        self.shared.notify();
        Ok(())
    }

    pub fn set_guesser(&self, name: &str) -> Result<(), GameError> {
        {
            let mut game = self.shared.game.borrow_mut();
            let round = valid_player_round(&mut game, name)?;
            round.guesser = name.to_string();
            debug!(player = name, "guesser set");
        }
        self.shared.notify();
        Ok(())
    }

    /// Start (or restart) the countdown. No-op when the clock is at 0.
    pub fn start_round(&self) {
        let time = self.shared.game.borrow().current_round.time;
        if time < 1 {
            debug!("start_round ignored: no time left");
            return;
        }

        let replaced = self.shared.clear_timer();
        let shared = Rc::downgrade(&self.shared);
        let timer = self.scheduler.every(
            self.config.tick_interval(),
            Box::new(move || {
                if let Some(shared) = shared.upgrade() {
                    shared.tick();
                }
            }),
        );
        *self.shared.timer.borrow_mut() = Some(timer);

        let number = {
            let mut game = self.shared.game.borrow_mut();
            game.current_round.running = true;
            game.current_round.number
        };
        info!(round = number, time, restarted = replaced, "round started");
        self.shared.notify();
    }

    /// Stop the countdown, leaving the remaining time as is.
    pub fn pause_round(&self) {
        self.shared.clear_timer();
        let time = {
            let mut game = self.shared.game.borrow_mut();
            game.current_round.running = false;
            game.current_round.time
        };
        debug!(time, "round paused");
        self.shared.notify();
    }

    /// Advance the round number and refill the clock. No round entry is
    /// created for the new index.
    pub fn next_round(&self) {
        self.shared.clear_timer();
        let number = {
            let mut game = self.shared.game.borrow_mut();
            let round = &mut game.current_round;
            round.number += 1;
            round.time = self.config.round_time_secs;
            round.running = false;
            round.number
        };
        info!(round = number, "advanced to next round");
        self.shared.notify();
    }

    // ── Reads ──────────────────────────────────────────────────────

    /// Scoring state of the current round, if an entry exists for it.
    pub fn current_round(&self) -> Option<RoundState> {
        self.shared.game.borrow().current().cloned()
    }

    /// Full snapshot of the game.
    pub fn game(&self) -> Game {
        self.shared.game.borrow().clone()
    }

    pub fn round_number(&self) -> usize {
        self.shared.game.borrow().current_round.number
    }

    pub fn time(&self) -> u32 {
        self.shared.game.borrow().current_round.time
    }

    pub fn is_running(&self) -> bool {
        self.shared.game.borrow().current_round.running
    }

    // ── Subscriptions ──────────────────────────────────────────────

    /// Call `observer` with a snapshot after every state change.
    pub fn subscribe<F>(&self, observer: F) -> SubscriptionId
    where
        F: Fn(&Game) + 'static,
    {
        let id = SubscriptionId(self.shared.next_subscription.get());
        self.shared.next_subscription.set(id.0 + 1);
        self.shared
            .observers
            .borrow_mut()
            .push((id, Rc::new(observer)));
        id
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut observers = self.shared.observers.borrow_mut();
        let before = observers.len();
        observers.retain(|(existing, _)| *existing != id);
        observers.len() != before
    }
}

/// Current round entry, provided `name` is one of its players.
fn valid_player_round<'a>(
    game: &'a mut Game,
    name: &str,
) -> Result<&'a mut RoundState, GameError> {
    match game.current_mut() {
        Some(round) if !name.is_empty() && round.has_player(name) => Ok(round),
        _ => {
            warn!(player = name, "invalid player");
            Err(GameError::InvalidPlayer {
                name: name.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::{DEFAULT_ROUND_TIME, PlayerScore};
    use crate::game::timer::ManualScheduler;
    use std::time::Duration;

    fn manager() -> (GameManager, ManualScheduler) {
        manager_with(GameConfig::default())
    }

    fn manager_with(config: GameConfig) -> (GameManager, ManualScheduler) {
        let scheduler = ManualScheduler::new();
        let manager = GameManager::new(config, Rc::new(scheduler.clone()));
        (manager, scheduler)
    }

    fn scores(round: &RoundState) -> Vec<(&str, i32)> {
        round
            .players
            .iter()
            .map(|p| (p.name.as_str(), p.score))
            .collect()
    }

    #[test]
    fn added_players_start_at_zero() {
        let (m, _) = manager();
        for name in ["Alice", "Bob", "Carol"] {
            m.add_new_player(name).unwrap();
        }
        let round = m.current_round().unwrap();
        assert_eq!(scores(&round), vec![("Alice", 0), ("Bob", 0), ("Carol", 0)]);
    }

    #[test]
    fn readding_player_resets_score() {
        let (m, _) = manager();
        m.add_new_player("Alice").unwrap();
        m.add_new_player("Bob").unwrap();
        m.set_score("Alice", 9).unwrap();
        m.add_new_player("Alice").unwrap();

        let round = m.current_round().unwrap();
        assert_eq!(scores(&round), vec![("Alice", 0), ("Bob", 0)]);
    }

    #[test]
    fn add_player_after_next_round_fails() {
        let (m, _) = manager();
        m.add_new_player("Alice").unwrap();
        m.next_round();
        assert_eq!(
            m.add_new_player("Bob"),
            Err(GameError::GameAlreadyStarted { round: 1 })
        );
        // history untouched
        assert_eq!(m.game().rounds.len(), 1);
    }

    #[test]
    fn late_players_create_round_entry() {
        let (m, _) = manager_with(GameConfig {
            allow_late_players: true,
            ..GameConfig::default()
        });
        m.next_round();
        m.next_round();
        assert!(m.current_round().is_none());

        m.add_new_player("Dana").unwrap();
        let game = m.game();
        assert_eq!(game.rounds.len(), 3);
        assert_eq!(game.rounds[1], RoundState::default());
        assert_eq!(scores(&m.current_round().unwrap()), vec![("Dana", 0)]);
        m.set_score("Dana", 3).unwrap();
    }

    #[test]
    fn unknown_player_rejected() {
        let (m, _) = manager();
        m.add_new_player("Alice").unwrap();

        let err = GameError::InvalidPlayer {
            name: "Zed".to_string(),
        };
        assert_eq!(m.set_score("Zed", 1), Err(err.clone()));
        assert_eq!(m.set_guesser("Zed"), Err(err));
        assert_eq!(
            m.set_guesser(""),
            Err(GameError::InvalidPlayer {
                name: String::new()
            })
        );
        assert_eq!(m.current_round().unwrap().guesser, "");
    }

    #[test]
    fn empty_name_rejected_even_if_joined() {
        let (m, _) = manager();
        m.add_new_player("").unwrap();
        assert!(m.set_score("", 1).is_err());
    }

    #[test]
    fn guesser_and_score_scenario() {
        let (m, _) = manager();
        m.add_new_player("Alice").unwrap();
        m.add_new_player("Bob").unwrap();
        m.set_guesser("Alice").unwrap();
        m.set_score("Bob", 5).unwrap();

        let round = m.current_round().unwrap();
        assert_eq!(
            round,
            RoundState {
                players: vec![
                    PlayerScore {
                        name: "Alice".to_string(),
                        score: 0
                    },
                    PlayerScore {
                        name: "Bob".to_string(),
                        score: 5
                    },
                ],
                guesser: "Alice".to_string(),
            }
        );
    }

    #[test]
    fn start_with_no_time_is_noop() {
        let (m, clock) = manager();
        m.start_round();
        clock.advance_secs(DEFAULT_ROUND_TIME as u64);
        assert_eq!(m.time(), 0);

        let before = m.game();
        m.start_round();
        assert_eq!(m.game(), before);
        assert!(!m.is_running());
        assert_eq!(clock.active_timers(), 0);
    }

    #[test]
    fn double_start_ticks_once_per_second() {
        let (m, clock) = manager();
        m.start_round();
        m.start_round();
        assert_eq!(clock.active_timers(), 1);

        clock.advance_secs(1);
        assert_eq!(m.time(), 59);
        clock.advance_secs(4);
        assert_eq!(m.time(), 55);
        assert!(m.is_running());
    }

    #[test]
    fn countdown_stops_at_zero() {
        let (m, clock) = manager();
        m.start_round();
        clock.advance_secs(60);
        assert_eq!(m.time(), 0);
        assert!(!m.is_running());
        assert_eq!(clock.active_timers(), 0);

        clock.advance_secs(1);
        assert_eq!(m.time(), 0);
    }

    #[test]
    fn pause_keeps_time() {
        let (m, clock) = manager();
        m.start_round();
        clock.advance_secs(10);
        m.pause_round();
        assert!(!m.is_running());
        clock.advance_secs(10);
        assert_eq!(m.time(), 50);
        assert_eq!(clock.active_timers(), 0);

        m.start_round();
        clock.advance_secs(5);
        assert_eq!(m.time(), 45);
    }

    #[test]
    fn next_round_mid_countdown() {
        let (m, clock) = manager();
        m.start_round();
        clock.advance_secs(30);
        assert_eq!(m.time(), 30);

        m.next_round();
        assert_eq!(m.round_number(), 1);
        assert_eq!(m.time(), 60);
        assert!(!m.is_running());
        assert_eq!(clock.active_timers(), 0);
        clock.advance_secs(3);
        assert_eq!(m.time(), 60);
    }

    #[test]
    fn next_round_has_no_round_entry() {
        let (m, _) = manager();
        m.add_new_player("Alice").unwrap();
        m.next_round();

        assert!(m.current_round().is_none());
        assert_eq!(m.game().rounds.len(), 1);
        assert!(matches!(
            m.set_score("Alice", 1),
            Err(GameError::InvalidPlayer { .. })
        ));
        assert!(matches!(
            m.set_guesser("Alice"),
            Err(GameError::InvalidPlayer { .. })
        ));
    }

    #[test]
    fn reset_keeps_history() {
        let (m, clock) = manager();
        m.add_new_player("Alice").unwrap();
        m.set_score("Alice", 4).unwrap();
        m.next_round();
        m.next_round();
        m.start_round();
        clock.advance_secs(7);

        m.reset_game();
        let game = m.game();
        assert_eq!(game.current_round, CurrentRound::new(60));
        assert_eq!(clock.active_timers(), 0);
        assert_eq!(game.rounds.len(), 1);
        assert_eq!(scores(&m.current_round().unwrap()), vec![("Alice", 4)]);
    }

    #[test]
    fn custom_round_time() {
        let (m, clock) = manager_with(GameConfig {
            round_time_secs: 3,
            tick_interval_ms: 500,
            ..GameConfig::default()
        });
        assert_eq!(m.time(), 3);
        m.start_round();
        clock.advance(Duration::from_millis(1500));
        assert_eq!(m.time(), 0);
        m.next_round();
        assert_eq!(m.time(), 3);
    }

    #[test]
    fn observers_see_every_change() {
        let (m, clock) = manager();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        let id = m.subscribe(move |game| log.borrow_mut().push(game.current_round.time));

        m.add_new_player("Alice").unwrap();
        m.start_round();
        clock.advance_secs(2);
        assert_eq!(*seen.borrow(), vec![60, 60, 59, 58]);

        // failed operations do not notify
        assert!(m.set_score("Nobody", 1).is_err());
        assert_eq!(seen.borrow().len(), 4);

        assert!(m.unsubscribe(id));
        assert!(!m.unsubscribe(id));
        clock.advance_secs(1);
        assert_eq!(seen.borrow().len(), 4);
    }

    #[test]
    fn subscription_id_round_trips_through_text() {
        let (m, _) = manager();
        let id = m.subscribe(|_| {});
        let parsed: SubscriptionId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert!("soon".parse::<SubscriptionId>().is_err());
        assert!(m.unsubscribe(parsed));
    }

    #[test]
    fn observer_may_read_manager() {
        let (m, clock) = manager();
        let m = Rc::new(m);
        let last = Rc::new(Cell::new(None));

        let (weak, out) = (Rc::downgrade(&m), Rc::clone(&last));
        m.subscribe(move |_| {
            if let Some(m) = weak.upgrade() {
                out.set(Some((m.time(), m.is_running())));
            }
        });
        m.start_round();
        clock.advance_secs(1);
        assert_eq!(last.get(), Some((59, true)));
    }

    #[test]
    fn dropping_manager_stops_timer() {
        let (m, clock) = manager();
        m.start_round();
        assert_eq!(clock.active_timers(), 1);
        drop(m);
        assert_eq!(clock.active_timers(), 0);
        clock.advance_secs(2);
    }
}
