pub mod demo;
pub mod pool;

pub use pool::{
    Outcome, PoolConfig, PoolError, PoolMetrics, TaskError, TaskHandle, TaskId, WorkerPool,
};
