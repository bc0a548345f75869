//! pledge: a Promises/A+-style future primitive with a cooperative scheduler
//!
//! pledge provides a single-settlement [`Future`] with two resolution
//! styles — value/reason (`fulfill`/`reject`) and Node error-first callback
//! (`resolve(err, values)`) — plus Promises/A+ `then` chaining driven by an
//! explicit single-threaded microtask [`Scheduler`]. Settlement also
//! publishes EventEmitter-style named events (`"complete"` / `"err"`)
//! through a composed [`Emitter`](emitter::Emitter).
//!
//! # Quick Start
//!
//! ```
//! use pledge::{Future, Resolution, Scheduler, Value};
//!
//! let scheduler = Scheduler::new();
//! let doubled = Future::fulfilled(&scheduler, vec![Value::from(5)])
//!     .map(|values| Ok(Resolution::Value(Value::from(values[0].to_number() * 2.0))));
//!
//! // Mappings run on a later turn, never synchronously
//! assert!(doubled.is_pending());
//! scheduler.run_to_completion().unwrap();
//! assert_eq!(doubled.value(), Some(Value::from(10.0)));
//! ```
//!
//! # Module Overview
//!
//! | Category | Modules |
//! |----------|---------|
//! | **Core** | [`future`], [`outcome`], [`value`], [`error`](Error) |
//! | **Scheduling** | [`scheduler`] |
//! | **Events** | [`emitter`] |

pub mod emitter;
pub mod future;
pub mod outcome;
pub mod prelude;
pub mod scheduler;
pub mod value;

mod error;

pub use emitter::{Emitter, FAILURE, SUCCESS};
pub use error::{Error, Result};
pub use future::{Deferred, Future, FutureState, MapFn, RejectFn, Resolution};
pub use outcome::Outcome;
pub use scheduler::{Microtask, RunResult, Scheduler, SchedulerStats};
pub use value::Value;

/// pledge version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
