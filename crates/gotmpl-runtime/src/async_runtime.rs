//! Offloading blocking renders from async callers
//!
//! A render is a blocking foreign call. [`Offload`] moves it onto tokio's
//! blocking thread pool so the caller's async worker keeps running, and caps
//! how many of those calls may be in flight at once.
//!
//! There is no cancellation. Dropping the returned future only stops the
//! caller from waiting: a job that already started runs to completion on its
//! worker thread, including reclaiming the native buffer. A job still waiting
//! for a permit when dropped never starts.

use crate::error::{BridgeError, BridgeResult};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::debug;

/// Bounded gateway to the blocking pool
#[derive(Debug, Clone)]
pub struct Offload {
    permits: Arc<Semaphore>,
    limit: usize,
}

impl Offload {
    /// At most `limit` jobs run concurrently. The limit is clamped to
    /// `1..=Semaphore::MAX_PERMITS`.
    pub fn new(limit: usize) -> Self {
        let limit = limit.clamp(1, Semaphore::MAX_PERMITS);
        Self {
            permits: Arc::new(Semaphore::new(limit)),
            limit,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Jobs that could start right now without waiting
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    /// Run `job` on the blocking pool and wait for its result
    ///
    /// Must be awaited inside a tokio runtime. A panicking job surfaces as
    /// `WorkerFailed`.
    pub async fn run<F, T>(&self, job: F) -> BridgeResult<T>
    where
        F: FnOnce() -> BridgeResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|e| BridgeError::WorkerFailed(e.to_string()))?;

        debug!(in_flight = self.limit - self.permits.available_permits(), "dispatching render to worker");

        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            job()
        })
        .await
        .map_err(|e| BridgeError::WorkerFailed(e.to_string()))?
    }
}
