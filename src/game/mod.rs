//! Game state module — the round/score state manager, its countdown timer,
//! and the HTML views derived from it. State lives in WASM memory for the
//! lifetime of the Web Worker.

pub mod config;
pub mod error;
pub mod manager;
pub mod session;
pub mod state;
pub mod timer;
pub mod view;

pub use config::{ConfigError, GameConfig};
pub use error::GameError;
pub use manager::{GameManager, SubscriptionId};
pub use state::{CurrentRound, DEFAULT_ROUND_TIME, Game, PlayerScore, RoundState};
pub use timer::{ManualScheduler, RepeatingTimer, Scheduler};

#[cfg(target_arch = "wasm32")]
pub use timer::BrowserScheduler;
