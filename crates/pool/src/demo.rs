//! Demonstration flows: a bounded batch run with per-task timeouts and
//! best-effort cancellation, and an on-demand compute run collected with
//! unbounded awaits.

use std::ops::RangeInclusive;
use std::thread;
use std::time::Duration;

use rand::Rng;
use tracing::{error, info};

use crate::pool::runner::WorkerPool;
use crate::pool::task::{PoolError, TaskError};
use crate::pool::types::{Outcome, PoolConfig, TaskId};

/// Number of tasks in the batch run.
pub const BATCH_TASKS: u32 = 10;
/// Per-task await deadline in the batch run.
pub const AWAIT_TIMEOUT: Duration = Duration::from_secs(3);
/// Simulated duration range for batch tasks, in milliseconds.
pub const TASK_DURATION_MS: RangeInclusive<u64> = 500..=2500;
/// Artificial delay before each computation in the compute run.
pub const COMPUTE_DELAY: Duration = Duration::from_secs(1);

/// Final per-task status, swept after result collection.
#[derive(Debug, Clone)]
pub struct TaskStatus {
    pub id: TaskId,
    pub done: bool,
    pub cancel_requested: bool,
}

/// Everything the batch run observed, in submission order.
#[derive(Debug)]
pub struct BatchReport {
    pub outcomes: Vec<Outcome<String>>,
    pub statuses: Vec<TaskStatus>,
}

/// Simulate one unit of work: sleep for `duration`, then fail every 4th id
/// with a synthetic error. The failure rule is deterministic by
/// construction so the error path is always exercised.
pub fn process_task(id: TaskId, duration: Duration) -> Result<String, TaskError> {
    let worker = thread::current()
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| "unnamed worker".into());
    info!("Task {} started on {}", id, worker);
    thread::sleep(duration);

    if id % 4 == 0 {
        return Err(TaskError::Failed(format!("simulated error in task {id}")));
    }

    let message = format!("Task {} completed in {}ms", id, duration.as_millis());
    info!("{}", message);
    Ok(message)
}

/// Submit `tasks` to `pool`, await each outcome with `await_timeout`,
/// sweep final per-task statuses, then shut the pool down with `drain`.
///
/// No error in one task stops collection for the others: failures and
/// timeouts are recorded per task, and a broken wait is logged and counted
/// as that task's failure.
pub fn run_batch(
    pool: &WorkerPool,
    tasks: &[(TaskId, Duration)],
    await_timeout: Duration,
    drain: Duration,
) -> Result<BatchReport, PoolError> {
    println!("=== starting task processing ===\n");

    let metrics = pool.metrics_handle();
    let mut handles = Vec::with_capacity(tasks.len());
    for (id, duration) in tasks.iter().copied() {
        let handle = pool.submit(format!("task-{id}"), move || process_task(id, duration))?;
        println!("Task {} submitted", id);
        handles.push((id, handle));
    }

    println!("\n=== monitoring results ===\n");

    let mut outcomes = Vec::with_capacity(handles.len());
    for (id, handle) in &handles {
        match handle.wait(Some(await_timeout)) {
            Ok(Outcome::Succeeded(message)) => {
                println!("✓ Task {} succeeded: {}", id, message);
                outcomes.push(Outcome::Succeeded(message));
            }
            Ok(Outcome::Failed(cause)) => {
                println!("✗ Task {} failed: {}", id, cause);
                outcomes.push(Outcome::Failed(cause));
            }
            Ok(Outcome::TimedOut) => {
                println!(
                    "✗ Task {} exceeded the {}ms limit",
                    id,
                    await_timeout.as_millis()
                );
                handle.cancel();
                if let Ok(mut m) = metrics.write() {
                    m.record_timed_out();
                    m.record_cancel_requested();
                }
                outcomes.push(Outcome::TimedOut);
            }
            Err(e) => {
                error!("unexpected error while waiting for task {}: {}", id, e);
                outcomes.push(Outcome::Failed(TaskError::Failed(e.to_string())));
            }
        }
    }

    println!("\n=== final task status ===");
    let mut statuses = Vec::with_capacity(handles.len());
    for (id, handle) in &handles {
        let status = TaskStatus {
            id: *id,
            done: handle.is_done(),
            cancel_requested: handle.is_cancel_requested(),
        };
        println!(
            "Task {}: {}{}",
            id,
            if status.done { "COMPLETED" } else { "PENDING" },
            if status.cancel_requested { " (CANCELLED)" } else { "" }
        );
        statuses.push(status);
    }

    pool.shutdown(drain);
    println!("\n=== processing complete ===");

    Ok(BatchReport { outcomes, statuses })
}

/// Batch run with the demonstration defaults: 10 tasks with random
/// 500-2500ms durations on a 3-worker pool, 3s awaits, 5s drain.
pub fn run_batch_demo() -> Result<BatchReport, PoolError> {
    let config = PoolConfig::default();
    let pool = WorkerPool::with_config(&config);

    let mut rng = rand::thread_rng();
    let tasks: Vec<(TaskId, Duration)> = (1..=BATCH_TASKS)
        .map(|id| (id, Duration::from_millis(rng.gen_range(TASK_DURATION_MS))))
        .collect();

    run_batch(&pool, &tasks, AWAIT_TIMEOUT, config.drain_timeout())
}

/// Submit one computation per input to an on-demand pool, then collect each
/// result with an unbounded wait. Fire-and-forget submission, late blocking
/// collection; no timeout or cancellation involved.
pub fn run_compute(inputs: &[f64], delay: Duration) -> Result<Vec<f64>, PoolError> {
    let pool = WorkerPool::on_demand();

    let handles: Vec<_> = inputs
        .iter()
        .copied()
        .map(|x| {
            pool.submit(format!("compute-{x}"), move || {
                thread::sleep(delay);
                Ok(x.sqrt() * std::f64::consts::PI)
            })
        })
        .collect::<Result<_, _>>()?;

    info!("performing other work while results compute");

    let mut results = Vec::with_capacity(handles.len());
    for (i, handle) in handles.iter().enumerate() {
        match handle.wait(None)? {
            Outcome::Succeeded(value) => {
                println!("Result {}: {}", i + 1, value);
                results.push(value);
            }
            Outcome::Failed(cause) => error!("computation {} failed: {}", i + 1, cause),
            Outcome::TimedOut => error!("computation {} timed out without a deadline", i + 1),
        }
    }

    pool.shutdown(PoolConfig::default().drain_timeout());
    Ok(results)
}

/// Compute run with the demonstration defaults: sqrt(x)·π for 16, 25, 36
/// after a 1s delay each.
pub fn run_compute_demo() -> Result<Vec<f64>, PoolError> {
    run_compute(&[16.0, 25.0, 36.0], COMPUTE_DELAY)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick_tasks(n: u32, each: Duration) -> Vec<(TaskId, Duration)> {
        (1..=n).map(|id| (id, each)).collect()
    }

    #[test]
    fn every_fourth_task_fails() {
        let pool = WorkerPool::fixed(3);
        let tasks = quick_tasks(10, Duration::from_millis(10));
        let report =
            run_batch(&pool, &tasks, Duration::from_secs(1), Duration::from_secs(1)).unwrap();

        assert_eq!(report.outcomes.len(), 10);
        for (i, outcome) in report.outcomes.iter().enumerate() {
            let id = i as u32 + 1;
            if id % 4 == 0 {
                assert!(outcome.is_failed(), "task {id} must fail");
            } else {
                assert!(outcome.is_succeeded(), "task {id} must succeed");
            }
        }
    }

    #[test]
    fn success_messages_carry_id_and_duration() {
        let pool = WorkerPool::fixed(3);
        let tasks = quick_tasks(3, Duration::from_millis(20));
        let report =
            run_batch(&pool, &tasks, Duration::from_secs(1), Duration::from_secs(1)).unwrap();

        // Handles come back in submission order: position i holds task i+1
        for (i, outcome) in report.outcomes.iter().enumerate() {
            let message = outcome.value().expect("task should succeed");
            assert!(message.contains(&format!("Task {}", i + 1)));
            assert!(message.contains("20ms"));
        }
    }

    #[test]
    fn timeout_requests_cancellation() {
        let pool = WorkerPool::fixed(1);
        let tasks = vec![(1, Duration::from_millis(300))];
        let report =
            run_batch(&pool, &tasks, Duration::from_millis(30), Duration::from_secs(2)).unwrap();

        assert!(report.outcomes[0].is_timed_out());
        assert!(report.statuses[0].cancel_requested);
    }

    #[test]
    fn outcome_count_matches_submission_count() {
        let pool = WorkerPool::fixed(3);
        let tasks = quick_tasks(8, Duration::from_millis(5));
        let report =
            run_batch(&pool, &tasks, Duration::from_secs(1), Duration::from_secs(1)).unwrap();

        assert_eq!(report.outcomes.len(), 8);
        assert_eq!(report.statuses.len(), 8);
        assert!(report.statuses.iter().all(|s| s.done));
    }

    #[test]
    fn compute_results_match_sqrt_pi() {
        let results = run_compute(&[16.0, 25.0, 36.0], Duration::from_millis(10)).unwrap();

        assert_eq!(results.len(), 3);
        let expected = [4.0f64, 5.0, 6.0].map(|r| r * std::f64::consts::PI);
        for (value, expected) in results.iter().zip(expected) {
            assert!((value - expected).abs() < 1e-9);
        }
    }
}
