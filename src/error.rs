//! Error types for the pledge future library
//!
//! Note that rejection reasons are ordinary [`Value`](crate::Value)s carried
//! through [`Outcome`](crate::Outcome); this module only covers scheduler
//! misuse, which is a programming error rather than a settlement.

use thiserror::Error;

/// Errors produced by the cooperative scheduler.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// A turn was started while another turn was already running on the
    /// same scheduler (for example, calling `run_to_completion` from inside
    /// a microtask).
    #[error("scheduler is already running a turn")]
    ReentrantRun,

    /// `run_to_completion` gave up after the configured turn limit without
    /// draining the queue, which indicates a chain that re-queues itself
    /// forever.
    #[error("turn limit exceeded after {turns} turns ({remaining} microtasks still queued)")]
    TurnLimitExceeded {
        /// Turns executed before giving up
        turns: usize,
        /// Microtasks left in the queue
        remaining: usize,
    },
}

/// Result type alias for scheduler operations
pub type Result<T> = std::result::Result<T, Error>;
