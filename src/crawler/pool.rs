//! Fixed-size worker pools
//!
//! A pool of size `N` is `N` long-lived tokio tasks draining one unbounded
//! FIFO channel. Each worker awaits its current job before taking the next, so
//! no more than `N` jobs of a pool ever run at once.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

/// A unit of work executed by a pool
pub type Job = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Errors reported by [`WorkerPool::submit`]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PoolError {
    #[error("{0} pool is closed")]
    Closed(&'static str),
}

/// A fixed-size pool of async workers with an unbounded FIFO queue
pub struct WorkerPool {
    name: &'static str,
    size: usize,
    sender: Mutex<Option<UnboundedSender<Job>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl WorkerPool {
    /// Spawns `size` workers on the current tokio runtime
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn new(name: &'static str, size: usize) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let receiver = Arc::new(tokio::sync::Mutex::new(receiver));

        let workers = (0..size)
            .map(|id| tokio::spawn(run_worker(name, id, receiver.clone())))
            .collect();

        tracing::debug!("Started {} pool with {} workers", name, size);

        Self {
            name,
            size,
            sender: Mutex::new(Some(sender)),
            workers: Mutex::new(workers),
        }
    }

    /// Returns the pool's name, used in log messages
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the number of workers
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns true once [`close`](Self::close) has been called
    pub fn is_closed(&self) -> bool {
        self.sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    /// Queues a job for execution
    ///
    /// Never waits. If the pool is closed the job is dropped without being
    /// polled and `PoolError::Closed` is returned.
    pub fn submit<F>(&self, job: F) -> Result<(), PoolError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.submit_boxed(Box::pin(job))
    }

    /// Queues an already boxed job
    pub fn submit_boxed(&self, job: Job) -> Result<(), PoolError> {
        self.try_submit(job).map_err(|_rejected| PoolError::Closed(self.name))
    }

    /// Queues a job, handing it back unpolled if the pool is closed
    ///
    /// Lets the caller decide where the rejected job gets dropped.
    pub fn try_submit(&self, job: Job) -> Result<(), Job> {
        // Clone the sender out so the lock is not held while the job moves
        let sender = self
            .sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        match sender {
            Some(sender) => sender.send(job).map_err(|rejected| rejected.0),
            None => Err(job),
        }
    }

    /// Stops accepting jobs and waits for the workers to finish
    ///
    /// Jobs already queued are still run. Calling `close` twice is harmless.
    pub async fn close(&self) {
        drop(
            self.sender
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take(),
        );

        let workers = std::mem::take(
            &mut *self
                .workers
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );

        for worker in workers {
            if let Err(e) = worker.await {
                tracing::warn!("{} pool worker ended abnormally: {}", self.name, e);
            }
        }

        tracing::debug!("{} pool closed", self.name);
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("name", &self.name)
            .field("size", &self.size)
            .field("closed", &self.is_closed())
            .finish()
    }
}

async fn run_worker(
    name: &'static str,
    id: usize,
    receiver: Arc<tokio::sync::Mutex<UnboundedReceiver<Job>>>,
) {
    loop {
        let job = {
            let mut receiver = receiver.lock().await;
            receiver.recv().await
        };

        let Some(job) = job else {
            break;
        };

        // Run on its own task so a panicking job does not take the worker down
        if let Err(e) = tokio::spawn(job).await {
            if e.is_panic() {
                tracing::warn!("{} worker {} recovered from a panicking job", name, id);
            }
        }
    }

    tracing::trace!("{} worker {} exiting", name, id);
}
