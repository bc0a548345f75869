//! Tagged settlement outcome
//!
//! Bridges the two resolution conventions the library supports: the
//! value/reason style (`fulfill`/`reject`) and the Node error-first callback
//! style (`resolve(err, values)`). The error-first pair collapses into this
//! tagged form via [`Outcome::from_callback`].

use crate::value::Value;

/// The settled result of a future: either the ordered fulfillment values or
/// the rejection reason.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Fulfilled with zero or more values (trailing "sink" arguments are
    /// preserved in order)
    Fulfilled(Vec<Value>),
    /// Rejected with an arbitrary reason
    Rejected(Value),
}

impl Outcome {
    /// Convert an error-first callback pair into an outcome.
    ///
    /// A truthy `err` wins and becomes the rejection reason, regardless of
    /// any values supplied alongside it.
    pub fn from_callback(err: Value, values: Vec<Value>) -> Self {
        if err.to_boolean() {
            Outcome::Rejected(err)
        } else {
            Outcome::Fulfilled(values)
        }
    }

    /// Check if this outcome is a fulfillment
    pub fn is_fulfilled(&self) -> bool {
        matches!(self, Outcome::Fulfilled(_))
    }

    /// Check if this outcome is a rejection
    pub fn is_rejected(&self) -> bool {
        matches!(self, Outcome::Rejected(_))
    }

    /// The fulfillment values, if fulfilled
    pub fn values(&self) -> Option<&[Value]> {
        match self {
            Outcome::Fulfilled(values) => Some(values),
            Outcome::Rejected(_) => None,
        }
    }

    /// The primary fulfillment value (first of the ordered values), if
    /// fulfilled; `Undefined` when fulfilled with no values
    pub fn value(&self) -> Option<Value> {
        match self {
            Outcome::Fulfilled(values) => {
                Some(values.first().cloned().unwrap_or(Value::Undefined))
            }
            Outcome::Rejected(_) => None,
        }
    }

    /// The rejection reason, if rejected
    pub fn reason(&self) -> Option<&Value> {
        match self {
            Outcome::Fulfilled(_) => None,
            Outcome::Rejected(reason) => Some(reason),
        }
    }
}
