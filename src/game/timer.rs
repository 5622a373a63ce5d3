//! Repeating-timer resource.
//!
//! A [`Scheduler`] hands out [`RepeatingTimer`] handles. A handle stops its
//! callback on `cancel()` and always on drop, so whoever owns the handle owns
//! the running interval.
//!
//! `cancel()` only stops future firings. It does not free the callback, which
//! makes it safe to call from inside that same callback (the countdown
//! cancels itself on its last tick).

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

pub type TickFn = Box<dyn FnMut()>;

/// Handle to a scheduled repeating callback.
pub trait RepeatingTimer {
    /// Stop future invocations. Idempotent.
    fn cancel(&mut self);

    fn is_active(&self) -> bool;
}

/// Source of repeating timers.
pub trait Scheduler {
    /// Invoke `tick` every `period` until the returned handle is cancelled or dropped.
    fn every(&self, period: Duration, tick: TickFn) -> Box<dyn RepeatingTimer>;
}

// ── Manual (simulated) clock ───────────────────────────────────────

struct ManualSlot {
    period: Duration,
    next_due: Duration,
    active: Rc<Cell<bool>>,
    tick: Rc<RefCell<TickFn>>,
}

/// Deterministic scheduler driven by [`ManualScheduler::advance`].
/// Clones share the same clock and timers.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    slots: Rc<RefCell<Vec<ManualSlot>>>,
    elapsed: Rc<Cell<Duration>>,
}

pub struct ManualTimer {
    active: Rc<Cell<bool>>,
}

impl RepeatingTimer for ManualTimer {
    fn cancel(&mut self) {
        self.active.set(false);
    }

    fn is_active(&self) -> bool {
        self.active.get()
    }
}

impl Drop for ManualTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of timers that would still fire.
    pub fn active_timers(&self) -> usize {
        self.slots
            .borrow()
            .iter()
            .filter(|slot| slot.active.get())
            .count()
    }

    /// Move the clock forward by `by`, firing every due callback in
    /// deadline order. Callbacks may schedule or cancel timers.
    pub fn advance(&self, by: Duration) {
        let target = self.elapsed.get() + by;
        while let Some(tick) = self.pop_due(target) {
            let mut tick = tick.borrow_mut();
            (*tick)();
        }
        self.elapsed.set(target);
        self.slots.borrow_mut().retain(|slot| slot.active.get());
    }

    /// Convenience for whole-second steps.
    pub fn advance_secs(&self, secs: u64) {
        self.advance(Duration::from_secs(secs));
    }

    /// Earliest active slot due at or before `target`; moves the clock to its
    /// deadline and reschedules it.
    fn pop_due(&self, target: Duration) -> Option<Rc<RefCell<TickFn>>> {
        let mut slots = self.slots.borrow_mut();
        let slot = slots
            .iter_mut()
            .filter(|slot| slot.active.get() && slot.next_due <= target)
            .min_by_key(|slot| slot.next_due)?;
        self.elapsed.set(slot.next_due);
        slot.next_due += slot.period;
        Some(Rc::clone(&slot.tick))
    }
}

impl Scheduler for ManualScheduler {
    fn every(&self, period: Duration, tick: TickFn) -> Box<dyn RepeatingTimer> {
        // zero would spin forever in advance()
        let period = period.max(Duration::from_millis(1));
        let active = Rc::new(Cell::new(true));
        self.slots.borrow_mut().push(ManualSlot {
            period,
            next_due: self.elapsed.get() + period,
            active: Rc::clone(&active),
            tick: Rc::new(RefCell::new(tick)),
        });
        Box::new(ManualTimer { active })
    }
}

// ── Browser clock (gloo Interval) ──────────────────────────────────

#[cfg(target_arch = "wasm32")]
pub use browser::{BrowserScheduler, BrowserTimer};

#[cfg(target_arch = "wasm32")]
mod browser {
    use super::{RepeatingTimer, Scheduler, TickFn};
    use gloo::timers::callback::Interval;
    use std::time::Duration;
    use wasm_bindgen::closure::Closure;

    /// Scheduler backed by the JS event loop (works in a Web Worker).
    #[derive(Debug, Clone, Copy, Default)]
    pub struct BrowserScheduler;

    pub struct BrowserTimer {
        interval: Option<Interval>,
        // Callback of a cancelled interval. Freed when the handle drops,
        // never from inside its own invocation.
        retired: Option<Closure<dyn FnMut()>>,
    }

    impl RepeatingTimer for BrowserTimer {
        fn cancel(&mut self) {
            if let Some(interval) = self.interval.take() {
                self.retired = Some(interval.cancel());
            }
        }

        fn is_active(&self) -> bool {
            self.interval.is_some()
        }
    }

    impl Scheduler for BrowserScheduler {
        fn every(&self, period: Duration, tick: TickFn) -> Box<dyn RepeatingTimer> {
            let millis = u32::try_from(period.as_millis()).unwrap_or(u32::MAX);
            Box::new(BrowserTimer {
                interval: Some(Interval::new(millis, tick)),
                retired: None,
            })
        }
    }

}
