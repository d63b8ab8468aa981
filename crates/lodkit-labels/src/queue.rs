//! Bounded task queue.
//!
//! Runs a list of async tasks with at most `concurrency` in flight, starting
//! them in submission order. Each task gets its own deadline. A task that
//! misses its deadline is dropped, so a result it would have produced later
//! can never be observed. Failures are isolated: every task settles to its own
//! [`Settled`] value and the rest of the queue keeps going.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::FutureExt;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

use lodkit_core::{defaults, Error};

/// Why a queued task did not produce a value.
#[derive(Debug, Error)]
pub enum TaskFailure {
    /// The task returned an error.
    #[error(transparent)]
    Failed(#[from] Error),

    /// The task did not finish before its deadline.
    #[error("Task exceeded timeout of {}ms", .0.as_millis())]
    TimedOut(Duration),

    /// The task panicked.
    #[error("Task panicked: {0}")]
    Panicked(String),
}

/// Outcome of one queued task.
pub type Settled<R> = std::result::Result<R, TaskFailure>;

/// Runs tasks with a concurrency cap and a per-task timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundedQueue {
    concurrency: usize,
    timeout: Duration,
}

impl Default for BoundedQueue {
    fn default() -> Self {
        Self::new(
            defaults::LABEL_CONCURRENCY,
            Duration::from_millis(defaults::LABEL_TIMEOUT_MS),
        )
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

impl BoundedQueue {
    /// Create a queue. A concurrency of zero is raised to one.
    pub fn new(concurrency: usize, timeout: Duration) -> Self {
        Self {
            concurrency: concurrency.max(1),
            timeout,
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run `task` over every item and wait for all of them to settle.
    ///
    /// Tasks start in item order as slots free up. The returned vector holds
    /// one outcome per item, in item order, regardless of completion order.
    /// Each failure is logged once at `warn`.
    pub async fn run<T, R, F, Fut>(&self, items: Vec<T>, task: F) -> Vec<Settled<R>>
    where
        F: Fn(T) -> Fut,
        Fut: Future<Output = lodkit_core::Result<R>> + Send + 'static,
        R: Send + 'static,
    {
        let total = items.len();
        if total == 0 {
            return Vec::new();
        }

        debug!(
            task_count = total,
            concurrency = self.concurrency,
            timeout_ms = self.timeout.as_millis() as u64,
            "Starting bounded queue"
        );

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();
        let mut results: Vec<Option<Settled<R>>> = (0..total).map(|_| None).collect();

        for (index, item) in items.into_iter().enumerate() {
            let permit = match semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    error!(task_index = index, error = ?e, "Queue semaphore closed");
                    results[index] = Some(Err(TaskFailure::Failed(Error::Internal(
                        "queue semaphore closed".to_string(),
                    ))));
                    continue;
                }
            };

            let timeout = self.timeout;
            let work = task(item);
            tasks.spawn(async move {
                let _permit = permit;
                let start = Instant::now();

                let settled = match AssertUnwindSafe(tokio::time::timeout(timeout, work))
                    .catch_unwind()
                    .await
                {
                    Ok(Ok(Ok(value))) => Ok(value),
                    Ok(Ok(Err(e))) => Err(TaskFailure::Failed(e)),
                    Ok(Err(_)) => Err(TaskFailure::TimedOut(timeout)),
                    Err(payload) => Err(TaskFailure::Panicked(panic_message(payload.as_ref()))),
                };

                match &settled {
                    Ok(_) => debug!(
                        task_index = index,
                        duration_ms = start.elapsed().as_millis() as u64,
                        "Task completed"
                    ),
                    Err(failure) => warn!(
                        task_index = index,
                        error = %failure,
                        duration_ms = start.elapsed().as_millis() as u64,
                        "Task failed"
                    ),
                }

                (index, settled)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, settled)) => results[index] = Some(settled),
                Err(e) => error!(error = ?e, "Queue task aborted"),
            }
        }

        results
            .into_iter()
            .map(|slot| {
                slot.unwrap_or_else(|| Err(TaskFailure::Panicked("task did not report".to_string())))
            })
            .collect()
    }
}
