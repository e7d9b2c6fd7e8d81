//! Shared remaining-message budget.

use parking_lot::Mutex;
use tokio::sync::Notify;

/// The shared countdown gating run completion.
///
/// One instance exists per run and is handed to every worker plus the
/// watcher. Decrements are mutually exclusive; the count only ever moves
/// down. Racing decrements past the completion point are allowed, so the
/// value is signed and may end below zero.
pub struct Countdown {
    remaining: Mutex<i64>,
    changed: Notify,
}

impl Countdown {
    /// Creates a countdown expecting `expected` messages.
    pub fn new(expected: u64) -> Self {
        Self {
            remaining: Mutex::new(expected as i64),
            changed: Notify::new(),
        }
    }

    /// Decreases the budget by one and wakes anyone waiting on completion.
    ///
    /// Never blocks; safe to call from any task any number of times.
    /// Returns the value after the decrement.
    pub fn decrement(&self) -> i64 {
        let value = {
            let mut remaining = self.remaining.lock();
            *remaining -= 1;
            *remaining
        };

        self.changed.notify_waiters();
        value
    }

    /// Current remaining budget.
    pub fn remaining(&self) -> i64 {
        *self.remaining.lock()
    }

    /// True once the budget is exhausted.
    pub fn is_complete(&self) -> bool {
        self.remaining() <= 0
    }

    /// Waits until the budget reaches zero or below.
    ///
    /// The predicate, not the wakeup, is authoritative: every wake rechecks
    /// `remaining` under the lock, so spurious or coalesced notifications
    /// cannot cause an early return or a hang. Tolerates multiple waiters.
    pub async fn completed(&self) {
        let notified = self.changed.notified();
        tokio::pin!(notified);

        loop {
            // Register in the waiter list before checking the predicate so
            // a decrement landing in between still wakes us.
            notified.as_mut().enable();

            if self.is_complete() {
                return;
            }

            notified.as_mut().await;
            notified.set(self.changed.notified());
        }
    }
}
