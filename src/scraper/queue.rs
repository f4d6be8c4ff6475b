//! Per-site single-lane fetch queue
//!
//! Each site gets its own queue so slow sites never block fast ones; within
//! one queue, concurrency is 1 and no two tasks start less than the
//! requested interval apart. The interval clock advances from each task's
//! start, so a failed attempt still spaces the next one.

use std::future::Future;
use tokio::sync::Mutex;
use tokio::time::{sleep, Duration, Instant};

/// Single-lane queue enforcing a minimum inter-request interval
#[derive(Debug, Default)]
pub struct FetchQueue {
    /// Start time of the most recent task; the lock doubles as the lane
    last_start: Mutex<Option<Instant>>,
}

impl FetchQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs a task, waiting first so its start is at least `min_interval`
    /// after the previous task's start
    ///
    /// The interval may differ per call: robots crawl-delay can tighten the
    /// profile's configured rate limit for some requests.
    ///
    /// Errors from the task propagate unchanged; the queue does not retry,
    /// and the clock advances regardless of the task's outcome.
    pub async fn schedule<T, F, Fut>(&self, min_interval: Duration, task: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        // Holding the guard across the task is what makes the lane single
        // file.
        let mut last_start = self.last_start.lock().await;

        if let Some(previous) = *last_start {
            let since_last = previous.elapsed();
            if since_last < min_interval {
                sleep(min_interval - since_last).await;
            }
        }

        *last_start = Some(Instant::now());
        task().await
    }
}
