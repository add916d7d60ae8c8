use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

use super::task::Job;

/// Shared FIFO job queue drained by the pool's worker threads.
///
/// `close` stops intake while letting queued work finish; `shutdown` wakes
/// every worker so it can exit. Idle/active accounting lets the pool wait
/// for quiescence with a deadline during drain.
pub(crate) struct JobQueue {
    jobs: Mutex<VecDeque<Job>>,
    available: Condvar,
    drained: Condvar,
    closed: AtomicBool,
    shutdown: AtomicBool,
    active: AtomicUsize,
    idle_workers: AtomicUsize,
}

impl JobQueue {
    pub(crate) fn new() -> Self {
        Self {
            jobs: Mutex::new(VecDeque::new()),
            available: Condvar::new(),
            drained: Condvar::new(),
            closed: AtomicBool::new(false),
            shutdown: AtomicBool::new(false),
            active: AtomicUsize::new(0),
            idle_workers: AtomicUsize::new(0),
        }
    }

    pub(crate) fn push(&self, job: Job) {
        if let Ok(mut jobs) = self.jobs.lock() {
            jobs.push_back(job);
        }
        self.available.notify_one();
    }

    /// Block until a job is available, counting it active before returning.
    /// Returns `None` once the queue is shut down, or is closed and empty.
    pub(crate) fn wait_for_job(&self) -> Option<Job> {
        let mut jobs = self.jobs.lock().ok()?;

        loop {
            if self.shutdown.load(Ordering::SeqCst) {
                return None;
            }

            if let Some(job) = jobs.pop_front() {
                self.active.fetch_add(1, Ordering::SeqCst);
                return Some(job);
            }

            if self.closed.load(Ordering::SeqCst) {
                return None;
            }

            // Wait with timeout to re-check the shutdown flag
            self.idle_workers.fetch_add(1, Ordering::SeqCst);
            let waited = self.available.wait_timeout(jobs, Duration::from_millis(100));
            self.idle_workers.fetch_sub(1, Ordering::SeqCst);
            jobs = waited.ok()?.0;
        }
    }

    /// Mark the current job finished and nudge any drain waiter.
    pub(crate) fn finish_job(&self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
        self.drained.notify_all();
    }

    /// Stop accepting new jobs; queued work still runs.
    pub(crate) fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.available.notify_all();
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Wake all workers so they exit their loops.
    pub(crate) fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
        self.available.notify_all();
    }

    pub(crate) fn is_shut_down(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    /// Wait until the queue is empty and no job is running, up to `timeout`.
    /// Returns whether quiescence was reached.
    pub(crate) fn await_quiescence(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut jobs = match self.jobs.lock() {
            Ok(guard) => guard,
            Err(_) => return false,
        };

        loop {
            if jobs.is_empty() && self.active.load(Ordering::SeqCst) == 0 {
                return true;
            }

            let now = Instant::now();
            if now >= deadline {
                return false;
            }

            // Bounded poll interval: active-count changes are not always
            // signalled under the jobs lock.
            let step = (deadline - now).min(Duration::from_millis(50));
            match self.drained.wait_timeout(jobs, step) {
                Ok((guard, _)) => jobs = guard,
                Err(_) => return false,
            }
        }
    }

    /// Drop all queued jobs, returning how many were discarded. Their
    /// handles will never complete.
    pub(crate) fn discard_pending(&self) -> usize {
        match self.jobs.lock() {
            Ok(mut jobs) => jobs.drain(..).count(),
            Err(_) => 0,
        }
    }

    pub(crate) fn pending(&self) -> usize {
        self.jobs.lock().map(|jobs| jobs.len()).unwrap_or(0)
    }

    pub(crate) fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    pub(crate) fn idle_workers(&self) -> usize {
        self.idle_workers.load(Ordering::SeqCst)
    }
}
