//! Cooperative microtask scheduler
//!
//! Single-threaded next-tick machinery that drives `then` chains. A *turn*
//! drains exactly the microtasks that were queued when the turn began, so a
//! task enqueued during a turn always runs in a later turn. This is the
//! ordering guarantee Promises/A+ needs: a mapping callback registered via
//! `then` can never run in the same turn as the call to `then`.
//!
//! The scheduler is a cloneable handle; every [`Future`](crate::Future)
//! created against it holds a clone, and all clones share one queue.

use crate::error::{Error, Result};
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// A unit of deferred work: runs once, on a later turn.
pub type Microtask = Box<dyn FnOnce()>;

/// Runtime statistics for the scheduler
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchedulerStats {
    /// Total microtasks processed across all turns
    pub total_microtasks: u64,
    /// Total turns executed
    pub total_turns: u64,
    /// Maximum microtasks drained in a single turn
    pub max_microtasks_per_turn: u64,
    /// Total futures created against this scheduler
    pub futures_created: u64,
    /// Total futures settled (fulfilled or rejected)
    pub futures_settled: u64,
    /// Total unhandled rejections reported
    pub unhandled_rejections: u64,
}

/// Result of running the scheduler to completion via `run_to_completion()`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunResult {
    /// Total number of microtasks that were dequeued and processed
    pub microtasks_processed: usize,
    /// Number of turns it took to drain the queue
    pub turns: usize,
}

struct SchedulerInner {
    queue: VecDeque<Microtask>,
    unhandled_rejections: Vec<Value>,
    running: bool,
    max_microtasks_per_turn: usize,
    turn_limit: usize,
    stats: SchedulerStats,
}

/// The cooperative scheduler handle.
///
/// Cloning is cheap and all clones share state. The scheduler is
/// single-threaded by design: there is only ever one active turn, so
/// futures need no locking.
#[derive(Clone)]
pub struct Scheduler {
    inner: Rc<RefCell<SchedulerInner>>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    /// Create a new scheduler with an empty queue
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(SchedulerInner {
                queue: VecDeque::new(),
                unhandled_rejections: Vec::new(),
                running: false,
                max_microtasks_per_turn: 10_000,
                turn_limit: 100_000,
                stats: SchedulerStats::default(),
            })),
        }
    }

    /// Enqueue a microtask for a later turn
    pub fn enqueue(&self, task: Microtask) {
        let mut inner = self.inner.borrow_mut();
        inner.queue.push_back(task);
        tracing::trace!(queued = inner.queue.len(), "microtask enqueued");
    }

    /// Number of microtasks currently queued
    pub fn pending_microtasks(&self) -> usize {
        self.inner.borrow().queue.len()
    }

    /// Check if the scheduler has any pending work
    pub fn has_pending_work(&self) -> bool {
        !self.inner.borrow().queue.is_empty()
    }

    /// Run one turn: drain the microtasks that were queued when the turn
    /// began, up to the per-turn budget. Tasks enqueued during the turn run
    /// on the next turn. Returns the number of tasks processed.
    pub fn run_turn(&self) -> Result<usize> {
        let batch = {
            let mut inner = self.inner.borrow_mut();
            if inner.running {
                return Err(Error::ReentrantRun);
            }
            inner.running = true;
            let take = inner.queue.len().min(inner.max_microtasks_per_turn);
            inner.queue.drain(..take).collect::<Vec<_>>()
        };

        let count = batch.len();
        tracing::trace!(count, "turn started");
        for task in batch {
            // The queue borrow is released, so tasks may enqueue freely.
            task();
        }

        let mut inner = self.inner.borrow_mut();
        inner.running = false;
        inner.stats.total_turns += 1;
        inner.stats.total_microtasks += count as u64;
        if count as u64 > inner.stats.max_microtasks_per_turn {
            inner.stats.max_microtasks_per_turn = count as u64;
        }
        Ok(count)
    }

    /// Run turns until the queue is empty.
    ///
    /// Guarded by the turn limit so a chain that keeps re-queueing itself
    /// fails with [`Error::TurnLimitExceeded`] instead of spinning forever.
    pub fn run_to_completion(&self) -> Result<RunResult> {
        let mut result = RunResult::default();
        let limit = self.inner.borrow().turn_limit;

        while self.has_pending_work() {
            if result.turns >= limit {
                return Err(Error::TurnLimitExceeded {
                    turns: result.turns,
                    remaining: self.pending_microtasks(),
                });
            }
            result.microtasks_processed += self.run_turn()?;
            result.turns += 1;
        }

        tracing::debug!(
            microtasks = result.microtasks_processed,
            turns = result.turns,
            "scheduler drained"
        );
        Ok(result)
    }

    /// Report an unhandled rejection, surfaced by a chain terminus without
    /// a reject handler. Drained via [`drain_unhandled_rejections`].
    ///
    /// [`drain_unhandled_rejections`]: Scheduler::drain_unhandled_rejections
    pub fn report_unhandled_rejection(&self, reason: Value) {
        tracing::warn!(%reason, "unhandled rejection");
        let mut inner = self.inner.borrow_mut();
        inner.stats.unhandled_rejections += 1;
        inner.unhandled_rejections.push(reason);
    }

    /// Get and clear the reported unhandled rejections
    pub fn drain_unhandled_rejections(&self) -> Vec<Value> {
        std::mem::take(&mut self.inner.borrow_mut().unhandled_rejections)
    }

    /// Set the maximum number of microtasks to drain per turn
    /// (starvation protection)
    pub fn set_microtask_budget(&self, limit: usize) {
        self.inner.borrow_mut().max_microtasks_per_turn = limit;
    }

    /// Get the current per-turn microtask budget
    pub fn microtask_budget(&self) -> usize {
        self.inner.borrow().max_microtasks_per_turn
    }

    /// Set the maximum turns `run_to_completion` will execute
    pub fn set_turn_limit(&self, limit: usize) {
        self.inner.borrow_mut().turn_limit = limit;
    }

    /// Get a snapshot of the current scheduler statistics
    pub fn stats(&self) -> SchedulerStats {
        self.inner.borrow().stats.clone()
    }

    /// Reset all scheduler statistics to zero
    pub fn reset_stats(&self) {
        self.inner.borrow_mut().stats = SchedulerStats::default();
    }

    /// Clear all pending work (for cleanup)
    pub fn clear(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.queue.clear();
        inner.unhandled_rejections.clear();
    }

    pub(crate) fn note_future_created(&self) {
        self.inner.borrow_mut().stats.futures_created += 1;
    }

    pub(crate) fn note_future_settled(&self) {
        self.inner.borrow_mut().stats.futures_settled += 1;
    }
}
