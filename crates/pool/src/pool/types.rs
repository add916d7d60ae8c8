use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::task::TaskError;

/// Sequential task identifier within a batch (1..N).
pub type TaskId = u32;

/// Result of awaiting a task through its handle.
#[derive(Debug, Clone)]
pub enum Outcome<T> {
    /// The task finished and produced a value.
    Succeeded(T),
    /// The task raised an error; carries the cause.
    Failed(TaskError),
    /// The wait deadline elapsed first. The task may still be running.
    TimedOut,
}

impl<T> Outcome<T> {
    pub fn is_succeeded(&self) -> bool {
        matches!(self, Outcome::Succeeded(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }

    pub fn is_timed_out(&self) -> bool {
        matches!(self, Outcome::TimedOut)
    }

    /// The success value, if any.
    pub fn value(&self) -> Option<&T> {
        match self {
            Outcome::Succeeded(v) => Some(v),
            _ => None,
        }
    }
}

/// Pool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Number of worker threads. 0 = available parallelism.
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Shutdown drain deadline in milliseconds.
    #[serde(default = "default_drain_timeout")]
    pub drain_timeout_ms: u64,
}

fn default_workers() -> usize { 3 }
fn default_drain_timeout() -> u64 { 5000 }

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            drain_timeout_ms: default_drain_timeout(),
        }
    }
}

impl PoolConfig {
    /// Resolve worker thread count (0 means use available parallelism).
    pub fn resolved_workers(&self) -> usize {
        if self.workers == 0 {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        } else {
            self.workers
        }
    }

    /// Drain deadline as a [`Duration`].
    pub fn drain_timeout(&self) -> Duration {
        Duration::from_millis(self.drain_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = PoolConfig::default();
        assert_eq!(config.workers, 3);
        assert_eq!(config.drain_timeout_ms, 5000);
        assert_eq!(config.drain_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn resolved_workers() {
        let mut config = PoolConfig::default();
        assert_eq!(config.resolved_workers(), 3);

        // 0 means auto-detect
        config.workers = 0;
        assert!(config.resolved_workers() > 0);
    }

    #[test]
    fn outcome_predicates() {
        let ok: Outcome<u32> = Outcome::Succeeded(7);
        assert!(ok.is_succeeded());
        assert_eq!(ok.value(), Some(&7));

        let failed: Outcome<u32> = Outcome::Failed(TaskError::Failed("boom".into()));
        assert!(failed.is_failed());
        assert!(failed.value().is_none());

        let timed_out: Outcome<u32> = Outcome::TimedOut;
        assert!(timed_out.is_timed_out());
    }
}
