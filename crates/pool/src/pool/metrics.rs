use serde::Serialize;

/// Pool operational counters. In-process observability only; snapshots are
/// taken via [`WorkerPool::metrics`](super::WorkerPool::metrics).
#[derive(Debug, Clone, Default, Serialize)]
pub struct PoolMetrics {
    /// Tasks accepted by `submit`.
    pub tasks_submitted: u64,
    /// Tasks that completed with a value.
    pub tasks_succeeded: u64,
    /// Tasks that completed with an error (including cancelled-before-start).
    pub tasks_failed: u64,
    /// Waits that expired before the task finished.
    pub tasks_timed_out: u64,
    /// Cancellation requests issued by callers.
    pub cancel_requests: u64,
    /// Worker threads spawned over the pool's lifetime.
    pub workers_spawned: u64,
}

impl PoolMetrics {
    pub fn record_submitted(&mut self) {
        self.tasks_submitted += 1;
    }

    pub fn record_succeeded(&mut self) {
        self.tasks_succeeded += 1;
    }

    pub fn record_failed(&mut self) {
        self.tasks_failed += 1;
    }

    pub fn record_timed_out(&mut self) {
        self.tasks_timed_out += 1;
    }

    pub fn record_cancel_requested(&mut self) {
        self.cancel_requests += 1;
    }

    pub fn record_worker_spawned(&mut self) {
        self.workers_spawned += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_metrics() {
        let m = PoolMetrics::default();
        assert_eq!(m.tasks_submitted, 0);
        assert_eq!(m.tasks_succeeded, 0);
        assert_eq!(m.tasks_failed, 0);
        assert_eq!(m.tasks_timed_out, 0);
    }

    #[test]
    fn record_counters() {
        let mut m = PoolMetrics::default();
        m.record_submitted();
        m.record_submitted();
        m.record_succeeded();
        m.record_failed();
        m.record_timed_out();
        m.record_cancel_requested();

        assert_eq!(m.tasks_submitted, 2);
        assert_eq!(m.tasks_succeeded, 1);
        assert_eq!(m.tasks_failed, 1);
        assert_eq!(m.tasks_timed_out, 1);
        assert_eq!(m.cancel_requests, 1);
    }
}
