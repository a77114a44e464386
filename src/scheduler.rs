// src/scheduler.rs
// =============================================================================
// This module runs a batch of deferred async operations with a cap on how
// many are executing at the same time.
//
// How it works:
// 1. Walk the tasks in submission order
// 2. Start the task and add it to the in-flight set
// 3. While the in-flight set is full, wait for the FIRST task to settle
// 4. When the list is exhausted, drain whatever is still running
//
// Every failure is recorded with the task's submission index and scheduling
// carries on. The caller gets a BatchReport listing all of them at the end.
//
// Rust concepts:
// - FnOnce closures: a task is "deferred" until we call it
// - FuturesUnordered: a set of futures that yields whichever finishes first
// - Generics with trait bounds: the scheduler works for any error type
// =============================================================================

use std::fmt::Display;
use std::future::Future;

use futures::stream::{FuturesUnordered, StreamExt};
use thiserror::Error;
use tracing::debug;

/// Concurrency limit used when the caller does not pick one.
pub const DEFAULT_LIMIT: usize = 4;

/// Errors raised by the scheduler itself (never by the tasks it runs).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("concurrency limit must be at least 1 (got {0})")]
    InvalidLimit(usize),
}

/// A task that settled with an error.
#[derive(Debug)]
pub struct TaskFailure<E> {
    /// Position of the task in the submitted sequence
    pub index: usize,
    pub error: E,
}

/// Outcome of one scheduler invocation.
#[derive(Debug)]
pub struct BatchReport<E> {
    /// Number of tasks that were started (always all of them)
    pub total: usize,
    pub succeeded: usize,
    /// Failures, sorted by submission index
    pub failures: Vec<TaskFailure<E>>,
}

impl<E> BatchReport<E> {
    fn empty() -> Self {
        Self {
            total: 0,
            succeeded: 0,
            failures: Vec::new(),
        }
    }

    /// True when every task completed without error
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

impl<E: Display> BatchReport<E> {
    // Books one settled task. Called exactly once per task.
    fn record(&mut self, index: usize, outcome: Result<(), E>) {
        match outcome {
            Ok(()) => {
                debug!(index, "task settled: ok");
                self.succeeded += 1;
            }
            Err(error) => {
                debug!(index, %error, "task settled: failed");
                self.failures.push(TaskFailure { index, error });
            }
        }
    }
}

// Runs every task with at most `limit` of them in flight.
//
// Parameters:
//   tasks: deferred operations; each one is only called when a slot is free
//   limit: maximum number of concurrently executing tasks (>= 1)
//
// Returns once ALL tasks have settled. A limit of 0 is rejected before any
// task is started.
//
// Example:
//   let report = run_bounded(urls.into_iter().map(|u| move || audit(u)), 2).await?;
pub async fn run_bounded<I, F, Fut, E>(
    tasks: I,
    limit: usize,
) -> Result<BatchReport<E>, SchedulerError>
where
    I: IntoIterator<Item = F>,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<(), E>>,
    E: Display,
{
    if limit == 0 {
        return Err(SchedulerError::InvalidLimit(limit));
    }

    let mut in_flight = FuturesUnordered::new();
    let mut report = BatchReport::empty();

    for (index, task) in tasks.into_iter().enumerate() {
        let pending = task();
        in_flight.push(async move { (index, pending.await) });
        report.total += 1;
        debug!(index, in_flight = in_flight.len(), "task started");

        // Slot wait: the next task only starts once the set has room again.
        // Wakes on the first settlement, not on all of them.
        while in_flight.len() >= limit {
            match in_flight.next().await {
                Some((settled, outcome)) => report.record(settled, outcome),
                None => break,
            }
        }
    }

    while let Some((settled, outcome)) = in_flight.next().await {
        report.record(settled, outcome);
    }

    report.failures.sort_by_key(|failure| failure.index);
    Ok(report)
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why FnOnce() -> Fut instead of a plain future?
//    - Futures in Rust are lazy, but building one can already do work
//      (e.g. clone data, open files)
//    - Taking a closure means NOTHING happens until the scheduler decides
//      there is a free slot
//
// 2. What is FuturesUnordered?
//    - A collection of futures polled together
//    - .next().await resolves with whichever future finishes first
//    - A finished future is removed from the set automatically, so the
//      set only ever holds tasks that have not settled yet
//
// 3. Why not tokio::spawn?
//    - Spawned tasks would run on other threads and need 'static + Send
//    - Audits are I/O-bound, so polling them from one task is enough and
//      keeps the in-flight set owned by a single loop (no locks)
// -----------------------------------------------------------------------------
