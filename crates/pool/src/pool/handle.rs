use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

use super::task::{PoolError, TaskError};
use super::types::Outcome;

/// Per-task completion slot shared between a handle and the worker that
/// runs the task. The outcome is written exactly once; the done and
/// cancellation flags each flip at most once.
pub(crate) struct Slot<T> {
    outcome: Mutex<Option<Result<T, TaskError>>>,
    ready: Condvar,
    done: AtomicBool,
    cancel_requested: AtomicBool,
}

impl<T> Slot<T> {
    pub(crate) fn new() -> Self {
        Self {
            outcome: Mutex::new(None),
            ready: Condvar::new(),
            done: AtomicBool::new(false),
            cancel_requested: AtomicBool::new(false),
        }
    }

    /// Record the task's outcome and wake all waiters. A second call is a
    /// no-op: the first writer wins.
    pub(crate) fn complete(&self, result: Result<T, TaskError>) {
        if let Ok(mut guard) = self.outcome.lock() {
            if guard.is_none() {
                *guard = Some(result);
            }
        }
        self.done.store(true, Ordering::SeqCst);
        self.ready.notify_all();
    }

    pub(crate) fn is_done(&self) -> bool {
        self.done.load(Ordering::SeqCst)
    }

    pub(crate) fn is_cancel_requested(&self) -> bool {
        self.cancel_requested.load(Ordering::SeqCst)
    }
}

/// Caller-held handle for observing and awaiting one submitted task.
///
/// Returned by [`WorkerPool::submit`](super::WorkerPool::submit), 1:1 with
/// the task. Cloning the handle observes the same task.
pub struct TaskHandle<T> {
    slot: Arc<Slot<T>>,
}

impl<T> Clone for TaskHandle<T> {
    fn clone(&self) -> Self {
        Self { slot: Arc::clone(&self.slot) }
    }
}

impl<T> TaskHandle<T> {
    pub(crate) fn new(slot: Arc<Slot<T>>) -> Self {
        Self { slot }
    }

    /// Whether an outcome has been recorded (success, failure, or
    /// cancelled-before-start). Tasks abandoned by a forced shutdown stay
    /// not-done.
    pub fn is_done(&self) -> bool {
        self.slot.is_done()
    }

    /// Whether cancellation has been requested on this task.
    pub fn is_cancel_requested(&self) -> bool {
        self.slot.is_cancel_requested()
    }

    /// Request cancellation. Advisory: a task that has not started yet is
    /// skipped by the worker that dequeues it; a task already running is
    /// not interrupted and may still complete normally.
    pub fn cancel(&self) {
        self.slot.cancel_requested.store(true, Ordering::SeqCst);
    }
}

impl<T: Clone> TaskHandle<T> {
    /// Block the calling thread until the task's outcome is available or
    /// `timeout` elapses. `None` blocks indefinitely.
    ///
    /// A timeout does not cancel the task; the caller decides whether to
    /// follow up with [`cancel`](Self::cancel). A poisoned wait surfaces as
    /// [`PoolError::LockPoisoned`], distinct from any task outcome.
    pub fn wait(&self, timeout: Option<Duration>) -> Result<Outcome<T>, PoolError> {
        let deadline = timeout.map(|t| Instant::now() + t);
        let mut guard = self
            .slot
            .outcome
            .lock()
            .map_err(|e| PoolError::LockPoisoned(e.to_string()))?;

        loop {
            if let Some(result) = guard.as_ref() {
                return Ok(match result.clone() {
                    Ok(value) => Outcome::Succeeded(value),
                    Err(cause) => Outcome::Failed(cause),
                });
            }

            match deadline {
                None => {
                    guard = self
                        .slot
                        .ready
                        .wait(guard)
                        .map_err(|e| PoolError::LockPoisoned(e.to_string()))?;
                }
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return Ok(Outcome::TimedOut);
                    }
                    let (g, _) = self
                        .slot
                        .ready
                        .wait_timeout(guard, deadline - now)
                        .map_err(|e| PoolError::LockPoisoned(e.to_string()))?;
                    guard = g;
                }
            }
        }
    }
}
