//! Bounded task pool with a shared work queue and explicit drain.
//!
//! Jobs are placed on one queue; at most `width` workers pull from it until it
//! is empty. Results flow back to the single owner over a channel, so the
//! owner is the only writer of any state derived from them.
//!
//! ```rust,ignore
//! let pool = TaskPool::new(5);
//! let mut run = pool.spawn(jobs, |id| MyWorker::new(id));
//! while let Some(result) = run.next().await {
//!     // owner applies result
//! }
//! run.join().await?;
//! ```

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

/// Errors surfaced when joining a pool.
#[derive(Debug, Error)]
pub enum PoolError {
    #[error("pool worker failed: {0}")]
    WorkerFailed(String),
}

/// Cooperative cancellation flag shared with every worker of a pool.
///
/// Workers check it before taking the next job; a job already in progress
/// runs to completion.
#[derive(Debug, Clone, Default)]
pub struct CancelHook(Arc<AtomicBool>);

impl CancelHook {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A worker owned by exactly one pool task.
#[async_trait]
pub trait PoolWorker<J, R>: Send + 'static
where
    J: Send + 'static,
    R: Send + 'static,
{
    async fn process(&mut self, job: J) -> R;
}

/// Fixed-width pool configuration.
#[derive(Debug, Clone)]
pub struct TaskPool {
    width: usize,
    cancel: CancelHook,
}

impl TaskPool {
    /// A pool of `width` workers (at least one).
    pub fn new(width: usize) -> Self {
        Self {
            width: width.max(1),
            cancel: CancelHook::default(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Handle that stops workers from taking further jobs.
    pub fn cancel_hook(&self) -> CancelHook {
        self.cancel.clone()
    }

    /// Start `min(width, jobs.len())` workers over `jobs`.
    ///
    /// `make_worker` is called once per worker with its index.
    pub fn spawn<J, R, W, F>(&self, jobs: Vec<J>, mut make_worker: F) -> PoolRun<R>
    where
        J: Send + 'static,
        R: Send + 'static,
        W: PoolWorker<J, R>,
        F: FnMut(usize) -> W,
    {
        let worker_count = self.width.min(jobs.len());
        let queue = Arc::new(Mutex::new(VecDeque::from(jobs)));
        let (tx, rx) = mpsc::unbounded_channel();
        let mut workers = JoinSet::new();

        for id in 0..worker_count {
            let mut worker = make_worker(id);
            let queue = Arc::clone(&queue);
            let tx = tx.clone();
            let cancel = self.cancel.clone();
            workers.spawn(async move {
                loop {
                    if cancel.is_cancelled() {
                        break;
                    }
                    let next = queue
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .pop_front();
                    let Some(job) = next else { break };
                    let result = worker.process(job).await;
                    if tx.send(result).is_err() {
                        break;
                    }
                }
            });
        }

        PoolRun {
            results: rx,
            workers,
        }
    }
}

/// A running pool. Drain results with [`PoolRun::next`], then [`PoolRun::join`].
pub struct PoolRun<R> {
    results: mpsc::UnboundedReceiver<R>,
    workers: JoinSet<()>,
}

impl<R: Send + 'static> PoolRun<R> {
    /// Next completed result; `None` once every worker has exited.
    pub async fn next(&mut self) -> Option<R> {
        self.results.recv().await
    }

    /// Wait for all workers and surface any that panicked.
    pub async fn join(mut self) -> Result<(), PoolError> {
        let mut failure = None;
        while let Some(joined) = self.workers.join_next().await {
            if let Err(e) = joined {
                failure.get_or_insert_with(|| e.to_string());
            }
        }
        match failure {
            Some(reason) => Err(PoolError::WorkerFailed(reason)),
            None => Ok(()),
        }
    }

    /// Collect every result and join.
    pub async fn drain(mut self) -> Result<Vec<R>, PoolError> {
        let mut out = Vec::new();
        while let Some(r) = self.next().await {
            out.push(r);
        }
        self.join().await?;
        Ok(out)
    }
}
