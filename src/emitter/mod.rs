//! Named-event notification
//!
//! The event capability a future is built on: subscribe to a named event,
//! emit a named event to zero or more listeners. Futures compose an
//! `Emitter` rather than inheriting from one, so the state machine stays
//! decoupled from the transport.

use crate::value::Value;
use rustc_hash::FxHashMap as HashMap;
use std::cell::RefCell;
use std::rc::Rc;

/// Event name emitted when a future fulfills
pub const SUCCESS: &str = "complete";

/// Event name emitted when a future rejects
pub const FAILURE: &str = "err";

type Listener = Rc<dyn Fn(&[Value])>;

/// A minimal multi-listener event notifier.
///
/// Cloning is cheap and all clones share the listener table. Emission
/// snapshots the listener list before invoking, so a listener may register
/// further listeners without tripping a borrow.
#[derive(Clone, Default)]
pub struct Emitter {
    listeners: Rc<RefCell<HashMap<String, Vec<Listener>>>>,
}

impl Emitter {
    /// Create an emitter with no listeners
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to a named event
    pub fn on(&self, event: &str, listener: impl Fn(&[Value]) + 'static) {
        self.listeners
            .borrow_mut()
            .entry(event.to_string())
            .or_default()
            .push(Rc::new(listener));
    }

    /// Emit a named event; returns the number of listeners invoked
    pub fn emit(&self, event: &str, args: &[Value]) -> usize {
        let snapshot: Vec<Listener> = self
            .listeners
            .borrow()
            .get(event)
            .map(|listeners| listeners.to_vec())
            .unwrap_or_default();

        tracing::trace!(event, listeners = snapshot.len(), "emit");
        for listener in &snapshot {
            listener(args);
        }
        snapshot.len()
    }

    /// Number of listeners registered for a named event
    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners
            .borrow()
            .get(event)
            .map(|listeners| listeners.len())
            .unwrap_or(0)
    }

    /// Remove all listeners for a named event
    pub fn remove_all(&self, event: &str) {
        self.listeners.borrow_mut().remove(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_emit_reaches_all_listeners() {
        let emitter = Emitter::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        for _ in 0..2 {
            let seen = seen.clone();
            emitter.on("tick", move |args| {
                seen.borrow_mut().push(args.to_vec());
            });
        }

        let invoked = emitter.emit("tick", &[Value::from(7)]);
        assert_eq!(invoked, 2);
        assert_eq!(seen.borrow().len(), 2);
        assert_eq!(seen.borrow()[0], vec![Value::Number(7.0)]);
    }

    #[test]
    fn test_emit_without_listeners_is_noop() {
        let emitter = Emitter::new();
        assert_eq!(emitter.emit("nothing", &[]), 0);
    }

    #[test]
    fn test_listener_may_register_reentrantly() {
        let emitter = Emitter::new();
        let inner = emitter.clone();
        emitter.on("once", move |_| {
            inner.on("once", |_| {});
        });

        // Snapshot semantics: the new listener is not invoked this emit
        assert_eq!(emitter.emit("once", &[]), 1);
        assert_eq!(emitter.listener_count("once"), 2);
    }

    #[test]
    fn test_remove_all() {
        let emitter = Emitter::new();
        emitter.on("gone", |_| {});
        emitter.remove_all("gone");
        assert_eq!(emitter.listener_count("gone"), 0);
    }

    #[test]
    fn test_well_known_event_names() {
        assert_eq!(SUCCESS, "complete");
        assert_eq!(FAILURE, "err");
    }
}
