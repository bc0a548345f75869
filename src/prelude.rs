//! Prelude module for convenient imports
//!
//! This module provides the most commonly used types for working with
//! pledge. Import everything from this module for quick access:
//!
//! ```
//! use pledge::prelude::*;
//!
//! let scheduler = Scheduler::new();
//! let future = Future::fulfilled(&scheduler, vec![Value::from(1)]);
//! assert!(future.is_fulfilled());
//! ```

// Core future types
pub use crate::future::{Deferred, Future, FutureState, MapFn, RejectFn, Resolution};

// Settlement payloads and outcomes
pub use crate::outcome::Outcome;
pub use crate::value::Value;

// Scheduling
pub use crate::scheduler::{Microtask, RunResult, Scheduler, SchedulerStats};

// Named events
pub use crate::emitter::{Emitter, FAILURE, SUCCESS};

// Error handling
pub use crate::error::{Error, Result};

// Version constant
pub use crate::VERSION;
