//! The future primitive
//!
//! A `Future` is a single-settlement state machine: Pending until exactly
//! one `fulfill` or `reject`, terminal afterwards. It supports two
//! resolution styles (value/reason and Node error-first via [`resolve`]),
//! synchronous side-effect subscribers ([`on_fulfill`]/[`on_reject`]), and
//! Promises/A+ chaining ([`then`]) driven by the scheduler's microtask
//! queue. Settlement also publishes the [`SUCCESS`]/[`FAILURE`] named
//! events through a composed [`Emitter`].
//!
//! Handles are `Rc`-shared and single-threaded; all mutation happens inside
//! the owning scheduler's one active turn.
//!
//! [`resolve`]: Future::resolve
//! [`on_fulfill`]: Future::on_fulfill
//! [`on_reject`]: Future::on_reject
//! [`then`]: Future::then

use crate::emitter::{Emitter, FAILURE, SUCCESS};
use crate::outcome::Outcome;
use crate::scheduler::Scheduler;
use crate::value::Value;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// The state of a future.
///
/// Transitions exactly once, Pending → Fulfilled or Pending → Rejected.
/// Any further settlement attempt is a silent no-op.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FutureState {
    /// Not yet settled
    Pending,
    /// Settled with fulfillment values
    Fulfilled,
    /// Settled with a rejection reason
    Rejected,
}

/// What a `then` mapping resolves to.
pub enum Resolution {
    /// Fulfill the derived future with a single value
    Value(Value),
    /// Fulfill the derived future with several values (sink arguments)
    Values(Vec<Value>),
    /// Chain the derived future to another future, adopting its state
    Future(Future),
}

impl From<Value> for Resolution {
    fn from(value: Value) -> Self {
        Resolution::Value(value)
    }
}

/// A `then` mapping callback. Returning `Err(reason)` is the "throw"
/// channel: it rejects the derived future instead of escaping.
pub type MapFn = Box<dyn FnOnce(&[Value]) -> std::result::Result<Resolution, Value>>;

/// A rejection handler, as accepted by [`Future::end`].
pub type RejectFn = Box<dyn FnOnce(&Value)>;

type FulfillHandler = Box<dyn FnOnce(&[Value])>;
type RejectHandler = Box<dyn FnOnce(&Value)>;

struct FutureInner {
    state: FutureState,
    /// Ordered fulfillment values; meaningful only when Fulfilled
    result: Vec<Value>,
    /// Rejection reason; set only when Rejected
    reason: Option<Value>,
    /// Pending subscribers, consumed exactly once at transition
    on_fulfill: Vec<FulfillHandler>,
    on_reject: Vec<RejectHandler>,
    emitter: Emitter,
}

/// A shared handle to a future bound to a [`Scheduler`].
///
/// Cloning is cheap; all clones observe and settle the same state.
#[derive(Clone)]
pub struct Future {
    inner: Rc<RefCell<FutureInner>>,
    scheduler: Scheduler,
}

impl Future {
    /// Create a new pending future on the given scheduler
    pub fn new(scheduler: &Scheduler) -> Self {
        scheduler.note_future_created();
        Self {
            inner: Rc::new(RefCell::new(FutureInner {
                state: FutureState::Pending,
                result: Vec::new(),
                reason: None,
                on_fulfill: Vec::new(),
                on_reject: Vec::new(),
                emitter: Emitter::new(),
            })),
            scheduler: scheduler.clone(),
        }
    }

    /// Create a pending future, invoking `init` synchronously with its
    /// settlement capabilities
    pub fn with_resolver(scheduler: &Scheduler, init: impl FnOnce(&Deferred)) -> Self {
        let deferred = Future::deferred(scheduler);
        let future = deferred.future();
        init(&deferred);
        future
    }

    /// Create an already-fulfilled future
    pub fn fulfilled(scheduler: &Scheduler, values: Vec<Value>) -> Self {
        let future = Future::new(scheduler);
        future.fulfill(values);
        future
    }

    /// Create an already-rejected future
    pub fn rejected(scheduler: &Scheduler, reason: Value) -> Self {
        let future = Future::new(scheduler);
        future.reject(reason);
        future
    }

    /// Create a fresh pending future paired with its settlement
    /// capabilities
    pub fn deferred(scheduler: &Scheduler) -> Deferred {
        Deferred {
            future: Future::new(scheduler),
            resolved: Cell::new(false),
            rejected: Cell::new(false),
        }
    }

    /// The scheduler this future is bound to
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Current state
    pub fn state(&self) -> FutureState {
        self.inner.borrow().state
    }

    /// Check if the future is still pending
    pub fn is_pending(&self) -> bool {
        self.state() == FutureState::Pending
    }

    /// Check if the future is fulfilled
    pub fn is_fulfilled(&self) -> bool {
        self.state() == FutureState::Fulfilled
    }

    /// Check if the future is rejected
    pub fn is_rejected(&self) -> bool {
        self.state() == FutureState::Rejected
    }

    /// The ordered fulfillment values, if fulfilled
    pub fn result(&self) -> Option<Vec<Value>> {
        let inner = self.inner.borrow();
        match inner.state {
            FutureState::Fulfilled => Some(inner.result.clone()),
            _ => None,
        }
    }

    /// The primary fulfillment value (first of the ordered values), if
    /// fulfilled; `Undefined` when fulfilled with no values
    pub fn value(&self) -> Option<Value> {
        self.result()
            .map(|values| values.first().cloned().unwrap_or(Value::Undefined))
    }

    /// The rejection reason, if rejected
    pub fn reason(&self) -> Option<Value> {
        self.inner.borrow().reason.clone()
    }

    /// The settled outcome, if no longer pending
    pub fn outcome(&self) -> Option<Outcome> {
        let inner = self.inner.borrow();
        match inner.state {
            FutureState::Pending => None,
            FutureState::Fulfilled => Some(Outcome::Fulfilled(inner.result.clone())),
            FutureState::Rejected => Some(Outcome::Rejected(
                inner.reason.clone().unwrap_or(Value::Undefined),
            )),
        }
    }

    /// Fulfill with ordered values.
    ///
    /// Pending fulfill-subscribers run synchronously in registration order,
    /// then the `complete` event is emitted. No-op when already settled.
    pub fn fulfill(&self, values: Vec<Value>) {
        let (handlers, emitter) = {
            let mut inner = self.inner.borrow_mut();
            if inner.state != FutureState::Pending {
                return;
            }
            inner.state = FutureState::Fulfilled;
            inner.result = values.clone();
            inner.on_reject.clear();
            (std::mem::take(&mut inner.on_fulfill), inner.emitter.clone())
        };

        self.scheduler.note_future_settled();
        tracing::debug!(values = values.len(), "future fulfilled");
        for handler in handlers {
            handler(&values);
        }
        emitter.emit(SUCCESS, &values);
    }

    /// Reject with a reason.
    ///
    /// Pending reject-subscribers run synchronously in registration order,
    /// then the `err` event is emitted. No-op when already settled.
    pub fn reject(&self, reason: Value) {
        let (handlers, emitter) = {
            let mut inner = self.inner.borrow_mut();
            if inner.state != FutureState::Pending {
                return;
            }
            inner.state = FutureState::Rejected;
            inner.reason = Some(reason.clone());
            inner.on_fulfill.clear();
            (std::mem::take(&mut inner.on_reject), inner.emitter.clone())
        };

        self.scheduler.note_future_settled();
        tracing::debug!(%reason, "future rejected");
        for handler in handlers {
            handler(&reason);
        }
        emitter.emit(FAILURE, std::slice::from_ref(&reason));
    }

    /// Node-style error-first settlement: a truthy `err` rejects with it,
    /// otherwise fulfills with `values`. Returns the future for chaining.
    pub fn resolve(&self, err: Value, values: Vec<Value>) -> &Self {
        self.settle(Outcome::from_callback(err, values));
        self
    }

    /// Settle with a tagged outcome
    pub fn settle(&self, outcome: Outcome) {
        match outcome {
            Outcome::Fulfilled(values) => self.fulfill(values),
            Outcome::Rejected(reason) => self.reject(reason),
        }
    }

    /// Register a fulfill-only subscriber.
    ///
    /// Runs synchronously at settlement, or immediately if the future is
    /// already fulfilled. Never invoked on rejection.
    pub fn on_fulfill(&self, handler: impl FnOnce(&[Value]) + 'static) -> &Self {
        let mut inner = self.inner.borrow_mut();
        match inner.state {
            FutureState::Pending => {
                inner.on_fulfill.push(Box::new(handler));
            }
            FutureState::Fulfilled => {
                let values = inner.result.clone();
                drop(inner);
                handler(&values);
            }
            FutureState::Rejected => {}
        }
        self
    }

    /// Register a reject-only subscriber; symmetric with [`on_fulfill`].
    ///
    /// [`on_fulfill`]: Future::on_fulfill
    pub fn on_reject(&self, handler: impl FnOnce(&Value) + 'static) -> &Self {
        let mut inner = self.inner.borrow_mut();
        match inner.state {
            FutureState::Pending => {
                inner.on_reject.push(Box::new(handler));
            }
            FutureState::Rejected => {
                let reason = inner.reason.clone().unwrap_or(Value::Undefined);
                drop(inner);
                handler(&reason);
            }
            FutureState::Fulfilled => {}
        }
        self
    }

    /// Register a single subscriber for either outcome, composed from
    /// [`on_fulfill`] and [`on_reject`].
    ///
    /// [`on_fulfill`]: Future::on_fulfill
    /// [`on_reject`]: Future::on_reject
    pub fn on_resolve(&self, handler: impl FnOnce(Outcome) + 'static) -> &Self {
        // Only one side ever fires; the other list is cleared at settlement.
        let slot = Rc::new(RefCell::new(Some(Box::new(handler) as Box<dyn FnOnce(Outcome)>)));
        let reject_slot = slot.clone();

        self.on_fulfill(move |values| {
            if let Some(h) = slot.borrow_mut().take() {
                h(Outcome::Fulfilled(values.to_vec()));
            }
        });
        self.on_reject(move |reason| {
            if let Some(h) = reject_slot.borrow_mut().take() {
                h(Outcome::Rejected(reason.clone()));
            }
        });
        self
    }

    /// Subscribe by event name. [`SUCCESS`] and [`FAILURE`] delegate to the
    /// subscriber lists (so late registrations still fire immediately);
    /// other names go to the raw emitter.
    pub fn on(&self, event: &str, listener: impl Fn(&[Value]) + 'static) -> &Self {
        match event {
            SUCCESS => {
                self.on_fulfill(move |values| listener(values));
            }
            FAILURE => {
                self.on_reject(move |reason| listener(std::slice::from_ref(reason)));
            }
            _ => {
                self.inner.borrow().emitter.on(event, listener);
            }
        }
        self
    }

    /// Promises/A+ chaining: returns a derived future settled from the
    /// mapping callbacks.
    ///
    /// Mappings run from a scheduler microtask, never in the turn that
    /// called `then`, even when this future is already settled. An absent
    /// mapping passes values or the rejection through unchanged; a mapping
    /// returning `Err(reason)` rejects the derived future.
    pub fn then(&self, on_fulfill_map: Option<MapFn>, on_reject_map: Option<MapFn>) -> Future {
        let derived = Future::new(&self.scheduler);

        let target = derived.clone();
        let scheduler = self.scheduler.clone();
        self.on_fulfill(move |values| {
            let values = values.to_vec();
            scheduler.enqueue(Box::new(move || match on_fulfill_map {
                None => target.fulfill(values),
                Some(map) => target.settle_from_mapping(map, &values),
            }));
        });

        let target = derived.clone();
        let scheduler = self.scheduler.clone();
        self.on_reject(move |reason| {
            let reason = reason.clone();
            scheduler.enqueue(Box::new(move || match on_reject_map {
                None => target.reject(reason),
                Some(map) => target.settle_from_mapping(map, std::slice::from_ref(&reason)),
            }));
        });

        derived
    }

    /// Shorthand for `then(Some(map), None)`
    pub fn map(
        &self,
        map: impl FnOnce(&[Value]) -> std::result::Result<Resolution, Value> + 'static,
    ) -> Future {
        self.then(Some(Box::new(map)), None)
    }

    /// Shorthand for `then(None, Some(map))`
    pub fn recover(
        &self,
        map: impl FnOnce(&[Value]) -> std::result::Result<Resolution, Value> + 'static,
    ) -> Future {
        self.then(None, Some(Box::new(map)))
    }

    /// Mark this future as a chain terminus.
    ///
    /// With a handler, rejection invokes it. Without one, a rejection is
    /// re-raised asynchronously as an unhandled rejection on the scheduler
    /// instead of being silently dropped.
    pub fn end(&self, on_reject: Option<RejectFn>) -> &Self {
        match on_reject {
            Some(handler) => {
                self.on_reject(handler);
            }
            None => {
                let scheduler = self.scheduler.clone();
                self.on_reject(move |reason| {
                    let reason = reason.clone();
                    let reporter = scheduler.clone();
                    scheduler.enqueue(Box::new(move || {
                        reporter.report_unhandled_rejection(reason);
                    }));
                });
            }
        }
        self
    }

    /// Directly adopt the eventual state of `other`.
    ///
    /// Fulfillment values and the rejection reason are forwarded as-is,
    /// synchronously relative to `other`'s settlement; no extra tick is
    /// inserted.
    pub fn chain(&self, other: &Future) -> &Self {
        let target = self.clone();
        other.on_fulfill(move |values| target.fulfill(values.to_vec()));
        let target = self.clone();
        other.on_reject(move |reason| target.reject(reason.clone()));
        self
    }

    /// On fulfillment, `map` produces a sequence of futures; the derived
    /// future fulfills with the ordered list of their results once all
    /// settle, or rejects with the first rejection. A rejection of this
    /// future propagates unchanged.
    pub fn all(&self, map: impl FnOnce(&[Value]) -> Vec<Future> + 'static) -> Future {
        let derived = Future::new(&self.scheduler);

        let target = derived.clone();
        self.on_fulfill(move |values| {
            let joined = Future::hook(target.scheduler(), map(values));
            target.chain(&joined);
        });

        let target = derived.clone();
        self.on_reject(move |reason| target.reject(reason.clone()));

        derived
    }

    /// Aggregate a sequence of futures: fulfills with the ordered list of
    /// their results once all settle successfully, or rejects with the
    /// first rejection (fail-fast, no partial results). An empty input
    /// fulfills immediately with an empty list.
    ///
    /// A future that fulfilled with one value contributes that value; with
    /// several, a `List`; with none, `Undefined`.
    pub fn hook(scheduler: &Scheduler, futures: Vec<Future>) -> Future {
        let result = Future::new(scheduler);
        let count = futures.len();

        if count == 0 {
            result.fulfill(vec![Value::new_list(vec![])]);
            return result;
        }

        let slots = Rc::new(RefCell::new(vec![Value::Undefined; count]));
        let remaining = Rc::new(Cell::new(count));

        for (i, future) in futures.iter().enumerate() {
            let slots = slots.clone();
            let remaining = remaining.clone();
            let target = result.clone();
            future.on_fulfill(move |values| {
                slots.borrow_mut()[i] = match values {
                    [] => Value::Undefined,
                    [single] => single.clone(),
                    many => Value::new_list(many.to_vec()),
                };
                remaining.set(remaining.get() - 1);
                if remaining.get() == 0 {
                    let collected = std::mem::take(&mut *slots.borrow_mut());
                    target.fulfill(vec![Value::new_list(collected)]);
                }
            });

            let target = result.clone();
            future.on_reject(move |reason| target.reject(reason.clone()));
        }

        result
    }

    /// Settle this future from a mapping's return: a plain resolution
    /// fulfills, a returned future is chained, `Err` rejects.
    fn settle_from_mapping(&self, map: MapFn, args: &[Value]) {
        match map(args) {
            Ok(Resolution::Value(value)) => self.fulfill(vec![value]),
            Ok(Resolution::Values(values)) => self.fulfill(values),
            Ok(Resolution::Future(future)) => {
                self.chain(&future);
            }
            Err(reason) => self.reject(reason),
        }
    }
}

/// A pending future paired with its settlement capabilities.
///
/// Unlike calling `fulfill`/`reject` on the future handle directly, the
/// deferred tracks first-call-wins flags, so the owner can tell which side
/// won without inspecting the future.
pub struct Deferred {
    future: Future,
    resolved: Cell<bool>,
    rejected: Cell<bool>,
}

impl Deferred {
    /// A handle to the paired future
    pub fn future(&self) -> Future {
        self.future.clone()
    }

    /// Fulfill the paired future with ordered values
    pub fn resolve(&self, values: Vec<Value>) {
        if !self.resolved.get() && !self.rejected.get() {
            self.resolved.set(true);
            self.future.fulfill(values);
        }
    }

    /// Reject the paired future with a reason
    pub fn reject(&self, reason: Value) {
        if !self.resolved.get() && !self.rejected.get() {
            self.rejected.set(true);
            self.future.reject(reason);
        }
    }

    /// Settle the paired future with a tagged outcome
    pub fn settle(&self, outcome: Outcome) {
        match outcome {
            Outcome::Fulfilled(values) => self.resolve(values),
            Outcome::Rejected(reason) => self.reject(reason),
        }
    }

    /// Whether `resolve` won
    pub fn is_resolved(&self) -> bool {
        self.resolved.get()
    }

    /// Whether `reject` won
    pub fn is_rejected(&self) -> bool {
        self.rejected.get()
    }
}
