//! Cross-thread signal events
//!
//! A `SignalEvent` is a settable, clearable, waitable boolean. The login
//! server sets them from its request thread; the test thread waits on and
//! clears them.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

#[derive(Debug, Default)]
pub struct SignalEvent {
    flag: Mutex<bool>,
    cond: Condvar,
    times_set: AtomicUsize,
}

impl SignalEvent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the flag and wake every waiter. Setting an already set event is a no-op
    /// apart from bumping the counter.
    pub fn set(&self) {
        let mut flag = self.lock();
        *flag = true;
        self.times_set.fetch_add(1, Ordering::SeqCst);
        self.cond.notify_all();
    }

    pub fn clear(&self) {
        *self.lock() = false;
    }

    pub fn is_set(&self) -> bool {
        *self.lock()
    }

    /// Block until the event is set or `timeout` elapses.
    ///
    /// Returns the flag's state on return, so `false` means the wait timed out.
    pub fn wait(&self, timeout: Duration) -> bool {
        let guard = self.lock();
        let (guard, _) = self
            .cond
            .wait_timeout_while(guard, timeout, |set| !*set)
            .unwrap_or_else(PoisonError::into_inner);
        *guard
    }

    /// How many times `set` has been called over the event's lifetime
    pub fn times_set(&self) -> usize {
        self.times_set.load(Ordering::SeqCst)
    }

    // A panicking setter cannot leave the bool half-written.
    fn lock(&self) -> MutexGuard<'_, bool> {
        self.flag.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
