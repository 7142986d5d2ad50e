//! Per-host admission control
//!
//! A host-gate lets at most `capacity` download jobs for its host into the
//! downloader pool at once and parks the rest in a FIFO queue. Admission never
//! waits, so pool workers are never occupied by jobs that are only waiting for
//! their host to free up.

use crate::crawler::pool::{Job, WorkerPool};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Admission controller for a single host
pub struct HostGate {
    host: String,
    capacity: usize,
    pool: Arc<WorkerPool>,
    state: Mutex<GateState>,
}

#[derive(Default)]
struct GateState {
    /// Jobs admitted to the pool and not yet released
    in_flight: usize,
    /// Jobs waiting for a permit, oldest first
    pending: VecDeque<Job>,
    /// Set once the pool rejected a job; the gate admits nothing afterwards
    closed: bool,
}

impl HostGate {
    /// Creates a gate for `host` that dispatches into `pool`
    pub fn new(host: impl Into<String>, capacity: usize, pool: Arc<WorkerPool>) -> Self {
        Self {
            host: host.into(),
            capacity,
            pool,
            state: Mutex::new(GateState::default()),
        }
    }

    /// Returns the host this gate controls
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the maximum number of concurrently admitted jobs
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Admits `job` to the pool if a permit is free, otherwise queues it
    ///
    /// Returns immediately either way. Every admitted job must be followed by
    /// exactly one call to [`release`](Self::release).
    pub fn submit(&self, job: Job) {
        let admitted = {
            let mut state = self.lock_state();
            if state.closed {
                drop(state);
                tracing::debug!("Host {} is closed, dropping download job", self.host);
                drop(job);
                return;
            }
            if state.in_flight < self.capacity {
                state.in_flight += 1;
                Some(job)
            } else {
                state.pending.push_back(job);
                tracing::trace!(
                    "Host {} at capacity, {} jobs queued",
                    self.host,
                    state.pending.len()
                );
                None
            }
        };

        if let Some(job) = admitted {
            self.dispatch(job);
        }
    }

    /// Hands the permit of a finished job to the oldest queued job, or returns it
    ///
    /// A no-op once the gate is closed: closing already returned every permit.
    pub fn release(&self) {
        let next = {
            let mut state = self.lock_state();
            if state.closed {
                return;
            }
            match state.pending.pop_front() {
                Some(job) => Some(job),
                None => {
                    debug_assert!(
                        state.in_flight > 0,
                        "host-gate released more often than admitted"
                    );
                    state.in_flight -= 1;
                    None
                }
            }
        };

        if let Some(job) = next {
            self.dispatch(job);
        }
    }

    /// Returns the number of admitted, unreleased jobs
    pub fn in_flight(&self) -> usize {
        self.lock_state().in_flight
    }

    /// Returns the number of queued jobs
    pub fn pending(&self) -> usize {
        self.lock_state().pending.len()
    }

    /// Returns true once the pool has rejected one of this gate's jobs
    pub fn is_closed(&self) -> bool {
        self.lock_state().closed
    }

    /// Returns true if the gate holds no permits and no queued jobs
    pub fn is_idle(&self) -> bool {
        let state = self.lock_state();
        state.in_flight == 0 && state.pending.is_empty()
    }

    // Runs outside the state lock: dropping a job releases this gate again.
    fn dispatch(&self, job: Job) {
        if let Err(rejected) = self.pool.try_submit(job) {
            self.close(rejected);
        }
    }

    /// Closes the gate after the pool rejected `rejected`
    ///
    /// Every queued job is taken out under the lock and dropped one by one
    /// afterwards. Their releases find the gate closed and return at once, so
    /// the drop never recurses through the queue.
    fn close(&self, rejected: Job) {
        let abandoned = {
            let mut state = self.lock_state();
            state.closed = true;
            state.in_flight = 0;
            std::mem::take(&mut state.pending)
        };

        tracing::error!(
            "{} pool is closed, dropping {} download jobs for host {}",
            self.pool.name(),
            abandoned.len() + 1,
            self.host
        );

        drop(rejected);
        for job in abandoned {
            drop(job);
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, GateState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for HostGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock_state();
        f.debug_struct("HostGate")
            .field("host", &self.host)
            .field("capacity", &self.capacity)
            .field("in_flight", &state.in_flight)
            .field("pending", &state.pending.len())
            .field("closed", &state.closed)
            .finish()
    }
}
