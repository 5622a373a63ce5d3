//! Contract-violation errors raised by game operations.

/// Raised synchronously when a caller breaks an operation's precondition.
/// Nothing is retried; each failed call leaves state untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("Game already started (round {round}), can't add new players")]
    GameAlreadyStarted { round: usize },

    #[error("Invalid player: '{name}'")]
    InvalidPlayer { name: String },

    #[error("Game session not initialized")]
    MissingContext,
}
