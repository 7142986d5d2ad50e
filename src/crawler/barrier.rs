//! Termination barrier for a single BFS level
//!
//! The coordinator and every download/extraction task register before they
//! are handed to a pool and deregister when they finish. `wait` returns once
//! the outstanding count drops to zero.

use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;

/// Counter of outstanding tasks with an async wait
#[derive(Debug, Default)]
pub struct TaskBarrier {
    outstanding: AtomicUsize,
    drained: Notify,
}

impl TaskBarrier {
    /// Creates a barrier with no registered parties
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one more outstanding party
    pub fn register(&self) {
        self.outstanding.fetch_add(1, Ordering::AcqRel);
    }

    /// Deregisters one party, waking the waiter if it was the last one
    pub fn deregister(&self) {
        let previous = self.outstanding.fetch_sub(1, Ordering::AcqRel);
        debug_assert!(previous > 0, "barrier deregistered more often than registered");
        if previous == 1 {
            self.drained.notify_waiters();
        }
    }

    /// Returns the number of parties still registered
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::Acquire)
    }

    /// Waits until every registered party has deregistered
    ///
    /// Returns immediately if nothing is registered. All writes made by a
    /// party before its `deregister` are visible once this returns.
    pub async fn wait(&self) {
        loop {
            let notified = self.drained.notified();
            tokio::pin!(notified);
            // Must be enabled before the check so a concurrent notify_waiters is not lost
            notified.as_mut().enable();

            if self.outstanding() == 0 {
                return;
            }

            notified.await;
        }
    }

    /// Deregisters the caller and waits for everyone else
    pub async fn arrive_and_wait(&self) {
        self.deregister();
        self.wait().await;
    }
}
