//! Worker pool with per-task handles, timeouts, and best-effort cancellation.
//!
//! A [`WorkerPool`] owns a set of OS worker threads draining a shared FIFO
//! queue. Submitting a closure returns a [`TaskHandle`] immediately; the
//! caller later blocks on the handle, with or without a timeout, to collect
//! the task's [`Outcome`]. Pools are either fixed-size or grown on demand,
//! and shut down with a bounded drain period after which remaining work is
//! abandoned.

pub mod handle;
pub mod metrics;
mod queue;
pub mod runner;
pub mod task;
pub mod types;

pub use handle::TaskHandle;
pub use metrics::PoolMetrics;
pub use runner::WorkerPool;
pub use task::{PoolError, TaskError};
pub use types::{Outcome, PoolConfig, TaskId};
