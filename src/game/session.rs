//! Per-thread game session slot.
//!
//! The page constructs the session once (`init_session`) and request handlers
//! reach it through `with_session`. Until then every handler gets
//! [`GameError::MissingContext`]. WASM is single-threaded, so `thread_local!`
//! gives one session for the whole Web Worker lifetime.
//!
//! Observers run inside `with_session`, so a session swap requested from one
//! (`init_session` / `end_session`) is parked and applied once the outer
//! `with_session` call has released the slot.

use std::cell::RefCell;

use crate::game::error::GameError;
use crate::game::manager::GameManager;

thread_local! {
    static SESSION: RefCell<Option<GameManager>> = const { RefCell::new(None) };
    /// Swap requested while `SESSION` was borrowed. `Some(None)` = end.
    static PENDING: RefCell<Option<Option<GameManager>>> = const { RefCell::new(None) };
}

/// Install `manager` as the active session, replacing (and stopping) any
/// previous one.
pub fn init_session(manager: GameManager) {
    swap_or_defer(Some(manager));
}

/// Tear down the active session, if any.
pub fn end_session() {
    swap_or_defer(None);
}

pub fn has_session() -> bool {
    SESSION.with(|s| s.borrow().is_some())
}

fn swap_or_defer(next: Option<GameManager>) {
    let swapped = SESSION.with(|s| match s.try_borrow_mut() {
        Ok(mut slot) => Ok(std::mem::replace(&mut *slot, next)),
        Err(_) => Err(next),
    });
    match swapped {
        // old session (and its timer) dropped outside the borrow
        Ok(previous) => {
            if previous.is_some() {
                tracing::info!("replaced existing game session");
            }
            drop(previous);
        }
        Err(next) => {
            tracing::debug!("session in use; deferring swap");
            PENDING.with(|p| *p.borrow_mut() = Some(next));
        }
    }
}

fn apply_pending() {
    if let Some(next) = PENDING.with(|p| p.borrow_mut().take()) {
        swap_or_defer(next);
    }
}

/// Run `f` against the active session.
pub fn with_session<F, R>(f: F) -> Result<R, GameError>
where
    F: FnOnce(&GameManager) -> R,
{
    let result = SESSION.with(|s| match s.borrow().as_ref() {
        Some(manager) => Ok(f(manager)),
        None => Err(GameError::MissingContext),
    });
    apply_pending();
    result
}

/// Like [`with_session`] for operations that can themselves fail.
pub fn try_with_session<F, R>(f: F) -> Result<R, GameError>
where
    F: FnOnce(&GameManager) -> Result<R, GameError>,
{
    with_session(f)?
}
