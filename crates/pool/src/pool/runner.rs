use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, info, warn};

use super::handle::{Slot, TaskHandle};
use super::metrics::PoolMetrics;
use super::queue::JobQueue;
use super::task::{Job, PoolError, TaskError};
use super::types::PoolConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sizing {
    /// Worker set created up front and never grown.
    Fixed,
    /// A worker is spawned whenever a job arrives and none is idle.
    OnDemand,
}

struct Worker {
    id: usize,
    thread: Option<JoinHandle<()>>,
}

/// A pool of OS worker threads draining a shared FIFO queue.
///
/// Owned by the caller; there is no process-wide singleton. Submission is
/// non-blocking and returns a [`TaskHandle`] in submission order. Execution
/// order across workers is unspecified.
pub struct WorkerPool {
    queue: Arc<JobQueue>,
    workers: Mutex<Vec<Worker>>,
    sizing: Sizing,
    metrics: Arc<RwLock<PoolMetrics>>,
    next_worker_id: AtomicUsize,
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("sizing", &self.sizing)
            .field("workers", &self.worker_count())
            .field("pending", &self.queue.pending())
            .field("active", &self.queue.active())
            .finish()
    }
}

impl WorkerPool {
    fn with_sizing(sizing: Sizing) -> Self {
        Self {
            queue: Arc::new(JobQueue::new()),
            workers: Mutex::new(Vec::new()),
            sizing,
            metrics: Arc::new(RwLock::new(PoolMetrics::default())),
            next_worker_id: AtomicUsize::new(0),
        }
    }

    /// Create a pool with exactly `workers` worker threads. Tasks beyond
    /// that count queue until a worker frees up.
    pub fn fixed(workers: usize) -> Self {
        let pool = Self::with_sizing(Sizing::Fixed);
        for _ in 0..workers {
            pool.spawn_worker();
        }
        info!("worker pool started with {} workers", workers);
        pool
    }

    /// Create a pool that grows its worker set on demand: every submission
    /// with no idle worker spawns a new one.
    pub fn on_demand() -> Self {
        info!("on-demand worker pool started");
        Self::with_sizing(Sizing::OnDemand)
    }

    /// Create a fixed pool sized from configuration.
    pub fn with_config(config: &PoolConfig) -> Self {
        Self::fixed(config.resolved_workers())
    }

    fn spawn_worker(&self) {
        let id = self.next_worker_id.fetch_add(1, Ordering::SeqCst);
        let queue = Arc::clone(&self.queue);

        let thread = thread::Builder::new()
            .name(format!("pool-worker-{id}"))
            .spawn(move || {
                debug!("worker {} started", id);
                while let Some(job) = queue.wait_for_job() {
                    job();
                    queue.finish_job();
                }
                debug!("worker {} stopped", id);
            })
            .expect("failed to spawn pool worker");

        if let Ok(mut m) = self.metrics.write() {
            m.record_worker_spawned();
        }
        if let Ok(mut workers) = self.workers.lock() {
            workers.push(Worker { id, thread: Some(thread) });
        }
    }

    /// Enqueue a task for execution, returning its handle immediately.
    ///
    /// The closure's error is captured and surfaced through the handle as
    /// [`Outcome::Failed`](super::Outcome::Failed); so is a panic. Neither
    /// affects other tasks or the pool. Refused once shutdown has been
    /// requested.
    pub fn submit<T, F>(&self, name: impl Into<String>, f: F) -> Result<TaskHandle<T>, PoolError>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T, TaskError> + Send + 'static,
    {
        if self.queue.is_closed() {
            return Err(PoolError::ShuttingDown);
        }

        let name = name.into();
        let slot = Arc::new(Slot::new());
        let handle = TaskHandle::new(Arc::clone(&slot));
        let metrics = Arc::clone(&self.metrics);

        let job: Job = Box::new(move || {
            // Best-effort cancellation: skip work that never started.
            if slot.is_cancel_requested() {
                debug!("task {} skipped: cancelled before start", name);
                slot.complete(Err(TaskError::Cancelled));
                if let Ok(mut m) = metrics.write() {
                    m.record_failed();
                }
                return;
            }

            let result = match panic::catch_unwind(AssertUnwindSafe(f)) {
                Ok(result) => result,
                Err(payload) => Err(TaskError::Panicked(panic_message(payload.as_ref()))),
            };

            match &result {
                Ok(_) => {
                    debug!("task {} succeeded", name);
                    if let Ok(mut m) = metrics.write() {
                        m.record_succeeded();
                    }
                }
                Err(e) => {
                    warn!("task {} failed: {}", name, e);
                    if let Ok(mut m) = metrics.write() {
                        m.record_failed();
                    }
                }
            }
            slot.complete(result);
        });

        self.queue.push(job);

        if self.sizing == Sizing::OnDemand && self.queue.idle_workers() == 0 {
            self.spawn_worker();
        }

        if let Ok(mut m) = self.metrics.write() {
            m.record_submitted();
        }
        Ok(handle)
    }

    /// Stop accepting tasks, wait up to `drain` for in-flight work, then
    /// stop workers. Past the deadline, queued jobs are discarded and
    /// still-running workers are abandoned; their handles stay not-done.
    pub fn shutdown(&self, drain: Duration) {
        if self.queue.is_shut_down() {
            return;
        }
        info!("pool shutdown requested, draining for up to {:?}", drain);
        self.queue.close();

        if self.queue.await_quiescence(drain) {
            self.queue.shutdown();
            self.join_workers();
            info!("pool drained and stopped");
        } else {
            let discarded = self.queue.discard_pending();
            self.queue.shutdown();
            warn!(
                "drain deadline exceeded: discarded {} queued tasks, abandoning {} running",
                discarded,
                self.queue.active()
            );
            self.detach_workers();
        }
    }

    fn join_workers(&self) {
        if let Ok(mut workers) = self.workers.lock() {
            for worker in workers.iter_mut() {
                if let Some(thread) = worker.thread.take() {
                    let _ = thread.join();
                    debug!("worker {} joined", worker.id);
                }
            }
        }
    }

    fn detach_workers(&self) {
        if let Ok(mut workers) = self.workers.lock() {
            for worker in workers.iter_mut() {
                if let Some(thread) = worker.thread.take() {
                    drop(thread);
                    debug!("worker {} abandoned", worker.id);
                }
            }
        }
    }

    /// Number of worker threads spawned so far.
    pub fn worker_count(&self) -> usize {
        self.workers.lock().map(|w| w.len()).unwrap_or(0)
    }

    /// Number of jobs waiting in the queue.
    pub fn pending_tasks(&self) -> usize {
        self.queue.pending()
    }

    /// Number of jobs currently executing.
    pub fn active_tasks(&self) -> usize {
        self.queue.active()
    }

    /// Snapshot of the pool counters.
    pub fn metrics(&self) -> PoolMetrics {
        self.metrics.read().map(|m| m.clone()).unwrap_or_default()
    }

    /// Shared handle to the pool counters, for recording caller-side
    /// observations (timeouts, cancellation requests).
    pub fn metrics_handle(&self) -> Arc<RwLock<PoolMetrics>> {
        Arc::clone(&self.metrics)
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown(PoolConfig::default().drain_timeout());
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
