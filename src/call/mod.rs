//! Call arguments, call outputs and canonical call keys.
//!
//! A double's methods all share one dynamic signature: they take a slice of
//! [`Arg`] and produce a [`Result`](crate::Result) of [`Output`].
//!
//! ```rust
//! use understudy::{args, Arg, CallKey};
//! use serde_json::json;
//!
//! let call = args![1, "two", {"three": [3]}];
//! assert_eq!(call[1], Arg::from(json!("two")));
//!
//! // Keys are structural: key order and number formatting do not matter
//! let a = CallKey::from_args(&args![{"x": 1, "y": 2.0}]);
//! let b = CallKey::from_args(&args![{"y": 2, "x": 1}]);
//! assert_eq!(a, b);
//! ```

mod key;

use std::fmt;
use std::sync::Arc;

use futures::future::{ready, Ready};
use serde_json::Value;

use crate::error::Result;

pub use key::CallKey;
pub(crate) use key::canonical;

/// A function argument: a callback the double can invoke.
#[derive(Clone)]
pub struct Callback(Arc<dyn Fn(&[Value]) + Send + Sync>);

impl Callback {
    /// Wrap a closure as a callback argument.
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(&[Value]) + Send + Sync + 'static,
    {
        Self(Arc::new(func))
    }

    /// Invoke the callback.
    pub fn invoke(&self, args: &[Value]) {
        (self.0)(args);
    }
}

impl PartialEq for Callback {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callback")
    }
}

/// One positional argument of a call.
#[derive(Clone, Debug, PartialEq)]
pub enum Arg {
    /// A JSON-representable value.
    Value(Value),
    /// A function value.
    Callback(Callback),
}

impl Arg {
    /// Create a callback argument.
    pub fn callback<F>(func: F) -> Self
    where
        F: Fn(&[Value]) + Send + Sync + 'static,
    {
        Self::Callback(Callback::new(func))
    }

    /// The value, unless this is a callback.
    #[must_use]
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(value) => Some(value),
            Self::Callback(_) => None,
        }
    }

    /// The callback, if this is one.
    #[must_use]
    pub fn as_callback(&self) -> Option<&Callback> {
        match self {
            Self::Value(_) => None,
            Self::Callback(callback) => Some(callback),
        }
    }

    /// JSON view of the argument; callbacks have no JSON form and become `null`.
    pub(crate) fn to_json(&self) -> Value {
        match self {
            Self::Value(value) => value.clone(),
            Self::Callback(_) => Value::Null,
        }
    }
}

impl From<Value> for Arg {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<Callback> for Arg {
    fn from(callback: Callback) -> Self {
        Self::Callback(callback)
    }
}

/// Renders an argument list for failure messages.
pub(crate) fn render(args: &[Arg]) -> String {
    let parts: Vec<String> = args
        .iter()
        .map(|arg| match arg {
            Arg::Value(value) => canonical(value),
            Arg::Callback(_) => "[Function]".to_string(),
        })
        .collect();
    format!("[{}]", parts.join(", "))
}

#[doc(hidden)]
pub fn from_json_array(value: Value) -> Vec<Arg> {
    match value {
        Value::Array(items) => items.into_iter().map(Arg::Value).collect(),
        other => vec![Arg::Value(other)],
    }
}

/// Build a `Vec<Arg>` from JSON literals.
///
/// Each comma-separated element is anything [`serde_json::json!`] accepts.
///
/// ```rust
/// use understudy::args;
///
/// let call = args![1, "a", [1, 2], {"k": null}];
/// assert_eq!(call.len(), 4);
/// assert!(args![].is_empty());
/// ```
#[macro_export]
macro_rules! args {
    ($($tt:tt)*) => {
        $crate::call::from_json_array($crate::__private::serde_json::json!([$($tt)*]))
    };
}

/// An already-settled deferred result: `Ok` when resolved, `Err` when rejected.
pub type Deferred = Ready<std::result::Result<Value, Value>>;

/// What a successful call produced.
#[derive(Debug)]
pub enum Output {
    /// A plain return value.
    Value(Value),
    /// A settled future, from `to_resolve_with` / `to_reject_with`.
    Deferred(Deferred),
}

impl Output {
    /// The `null` return value of a method that returns nothing.
    #[must_use]
    pub fn null() -> Self {
        Self::Value(Value::Null)
    }

    /// A future already resolved with `value`.
    #[must_use]
    pub fn resolved(value: Value) -> Self {
        Self::Deferred(ready(Ok(value)))
    }

    /// A future already rejected with `reason`.
    #[must_use]
    pub fn rejected(reason: Value) -> Self {
        Self::Deferred(ready(Err(reason)))
    }

    /// The plain return value, if this is one.
    #[must_use]
    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::Value(value) => Some(value),
            Self::Deferred(_) => None,
        }
    }

    /// Consume into the plain return value, if this is one.
    #[must_use]
    pub fn into_value(self) -> Option<Value> {
        match self {
            Self::Value(value) => Some(value),
            Self::Deferred(_) => None,
        }
    }

    /// Consume into the deferred result, if this is one.
    #[must_use]
    pub fn into_deferred(self) -> Option<Deferred> {
        match self {
            Self::Value(_) => None,
            Self::Deferred(deferred) => Some(deferred),
        }
    }

    /// Whether this is a deferred result.
    #[must_use]
    pub fn is_deferred(&self) -> bool {
        matches!(self, Self::Deferred(_))
    }
}

impl From<Value> for Output {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

/// The shared signature of original methods and `to_do_this` replacements.
pub type MethodFn = Arc<dyn Fn(&[Arg]) -> Result<Output> + Send + Sync>;

/// A predicate over a call's arguments, used by `when_fn`.
pub type ArgPredicate = Arc<dyn Fn(&[Arg]) -> bool + Send + Sync>;

/// A side-effecting observer of a call's arguments, used by `to_intercept`.
pub type Hook = Arc<dyn Fn(&[Arg]) + Send + Sync>;
