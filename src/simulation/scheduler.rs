//! Round-robin right-of-way scheduler

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use super::types::SignalId;

#[derive(Debug)]
struct TurnState {
    green: SignalId,
    stopped: bool,
}

/// Grants green to exactly one signal at a time, in fixed cyclic order.
///
/// Controllers suspend on a condvar while waiting for their turn instead
/// of polling the designator. Stop is re-checked under the designator
/// mutex around every suspension, so a shutdown broadcast cannot be
/// missed.
#[derive(Debug)]
pub struct TurnScheduler {
    signal_count: u32,
    state: Mutex<TurnState>,
    turn_changed: Condvar,
    stop_flag: AtomicBool,
}

impl TurnScheduler {
    /// Signal 1 opens the cycle.
    pub fn new(signal_count: u32) -> Self {
        Self {
            signal_count,
            state: Mutex::new(TurnState {
                green: SignalId(1),
                stopped: false,
            }),
            turn_changed: Condvar::new(),
            stop_flag: AtomicBool::new(false),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, TurnState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Block until `id` holds green or the simulation is stopping.
    ///
    /// Returns `true` when the turn was acquired and `false` when the wait
    /// ended because stop was observed.
    pub fn acquire_turn(&self, id: SignalId) -> bool {
        let mut state = self.lock_state();
        while state.green != id && !state.stopped {
            state = self
                .turn_changed
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        !state.stopped
    }

    /// Hand green to the cyclic successor of `id` and wake every waiter
    pub fn release_turn(&self, id: SignalId) {
        let mut state = self.lock_state();
        state.green = id.successor(self.signal_count);
        self.turn_changed.notify_all();
    }

    /// The signal currently designated green
    pub fn current_green(&self) -> SignalId {
        self.lock_state().green
    }

    /// Raise the one-shot global stop and wake every waiter.
    ///
    /// Idempotent. The stop flag is mirrored inside the designator mutex:
    /// a waiter either observes it before suspending or is parked on the
    /// condvar when the broadcast goes out.
    pub fn shutdown(&self) {
        self.stop_flag.store(true, Ordering::SeqCst);
        let mut state = self.lock_state();
        state.stopped = true;
        self.turn_changed.notify_all();
    }

    /// Cheap stop check for tick loops
    pub fn is_stopped(&self) -> bool {
        self.stop_flag.load(Ordering::SeqCst)
    }
}
