/// Error raised inside a task. Captured at the worker boundary and carried
/// to the caller in [`Outcome::Failed`](super::Outcome::Failed); never
/// crashes the pool or other tasks.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TaskError {
    #[error("task failed: {0}")]
    Failed(String),
    #[error("task panicked: {0}")]
    Panicked(String),
    #[error("task cancelled before it started")]
    Cancelled,
}

/// Error raised by the pool itself, as opposed to a task outcome.
#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    #[error("pool is shutting down, submission refused")]
    ShuttingDown,
    #[error("lock poisoned: {0}")]
    LockPoisoned(String),
}

/// Type-erased unit of work executed by a worker thread.
pub(crate) type Job = Box<dyn FnOnce() + Send + 'static>;
