// Allow must_use_candidate for matcher constructors since building a matcher
// inline as an argument is the common pattern
#![allow(clippy::must_use_candidate)]

//! Argument matchers.
//!
//! A [`Matcher`] answers "does this expected value match one of the actual
//! arguments of a call?". Converting a JSON value picks the rule by shape:
//!
//! - arrays match an argument with the same canonical serialization
//! - objects match any object argument that contains all of their properties
//! - primitives match an equal argument
//!
//! # Example
//!
//! ```rust
//! use understudy::assertions::matcher::Matcher;
//! use serde_json::json;
//!
//! let m = Matcher::from(json!({"name": "bob"}));
//! assert!(m.matches(&json!({"name": "bob", "age": 42})));
//!
//! let m = Matcher::from(json!([1, 2]));
//! assert!(!m.matches(&json!([1, 2, 3])));
//!
//! let m = Matcher::satisfies(|v| v.as_i64().is_some_and(|n| n > 10), "greater than 10");
//! assert!(m.matches(&json!(11)));
//! ```

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::call::{canonical, Arg};

/// A matcher for a single argument value.
#[derive(Clone)]
pub enum Matcher {
    /// Structural equality. Arrays compare by canonical serialization,
    /// primitives by value.
    Exact(Value),
    /// The argument is an object holding at least these properties.
    Subset(Map<String, Value>),
    /// An arbitrary test over the argument.
    Predicate {
        /// The test.
        predicate: Arc<dyn Fn(&Value) -> bool + Send + Sync>,
        /// Shown in failure messages.
        description: String,
    },
}

impl Matcher {
    /// Match by structural equality, whatever the value's shape.
    pub fn exact(value: impl Into<Value>) -> Self {
        Self::Exact(value.into())
    }

    /// Match objects that contain all of `properties`.
    pub fn subset(properties: Map<String, Value>) -> Self {
        Self::Subset(properties)
    }

    /// Match values accepted by `predicate`.
    pub fn satisfies<F>(predicate: F, description: &str) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self::Predicate {
            predicate: Arc::new(predicate),
            description: description.to_string(),
        }
    }

    /// Check a single value.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Self::Exact(expected @ Value::Array(_)) => canonical(expected) == canonical(value),
            Self::Exact(expected) => loose_eq(expected, value),
            Self::Subset(properties) => contains_subset(properties, value),
            Self::Predicate { predicate, .. } => predicate(value),
        }
    }

    /// Check whether any value argument of a call matches. Callbacks never do.
    pub fn matches_any(&self, args: &[Arg]) -> bool {
        args.iter()
            .filter_map(Arg::as_value)
            .any(|value| self.matches(value))
    }

    /// Describe what this matcher expects.
    pub fn describe(&self) -> String {
        match self {
            Self::Exact(value) => canonical(value),
            Self::Subset(properties) => {
                format!("object with {}", canonical(&Value::Object(properties.clone())))
            }
            Self::Predicate { description, .. } => description.clone(),
        }
    }
}

impl From<Value> for Matcher {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(properties) => Self::Subset(properties),
            other => Self::Exact(other),
        }
    }
}

impl From<&Value> for Matcher {
    fn from(value: &Value) -> Self {
        Self::from(value.clone())
    }
}

impl From<&str> for Matcher {
    fn from(value: &str) -> Self {
        Self::Exact(Value::String(value.to_string()))
    }
}

impl From<String> for Matcher {
    fn from(value: String) -> Self {
        Self::Exact(Value::String(value))
    }
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(value) => f.debug_tuple("Exact").field(value).finish(),
            Self::Subset(properties) => f.debug_tuple("Subset").field(properties).finish(),
            Self::Predicate { description, .. } => {
                f.debug_struct("Predicate").field("description", description).finish()
            }
        }
    }
}

/// Deep equality where numbers compare by value, so `1 == 1.0`.
pub(crate) fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            x == y || matches!((x.as_f64(), y.as_f64()), (Some(x), Some(y)) if x == y)
        }
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(x, y)| loose_eq(x, y))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter()
                    .all(|(key, x)| y.get(key).is_some_and(|y| loose_eq(x, y)))
        }
        _ => a == b,
    }
}

/// Partial match: nested objects are subsets too, everything else compares by value.
fn contains_subset(expected: &Map<String, Value>, actual: &Value) -> bool {
    let Value::Object(actual) = actual else {
        return false;
    };
    expected.iter().all(|(key, expected)| {
        actual.get(key).is_some_and(|actual| match expected {
            Value::Object(nested) => contains_subset(nested, actual),
            _ => loose_eq(expected, actual),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;
    use serde_json::json;

    #[test]
    fn test_primitive_matcher() {
        let m = Matcher::from(json!(5));
        assert!(m.matches(&json!(5)));
        assert!(m.matches(&json!(5.0)));
        assert!(!m.matches(&json!("5")));
        assert!(!m.matches(&json!([5])));
    }

    #[test]
    fn test_array_matcher_is_whole_value() {
        let m = Matcher::from(json!([1, 2]));
        assert!(m.matches(&json!([1, 2])));
        assert!(!m.matches(&json!([2, 1])));
        assert!(!m.matches(&json!(1)));
        assert!(m.matches_any(&args![0, [1, 2]]));
        assert!(!m.matches_any(&args![1, 2]));
    }

    #[test]
    fn test_object_matcher_is_subset() {
        let m = Matcher::from(json!({"a": 1}));
        assert!(m.matches(&json!({"a": 1, "b": 2})));
        assert!(!m.matches(&json!({"a": 2})));
        assert!(!m.matches(&json!({"b": 1})));
        assert!(!m.matches(&json!([{"a": 1}])));
    }

    #[test]
    fn test_nested_subset() {
        let m = Matcher::from(json!({"user": {"name": "bob"}}));
        assert!(m.matches(&json!({"user": {"name": "bob", "id": 7}, "x": 1})));
        assert!(!m.matches(&json!({"user": {"name": "alice"}})));
    }

    #[test]
    fn test_nested_arrays_in_subset_are_exact() {
        let m = Matcher::from(json!({"tags": ["a"]}));
        assert!(m.matches(&json!({"tags": ["a"]})));
        assert!(!m.matches(&json!({"tags": ["a", "b"]})));
    }

    #[test]
    fn test_exact_object() {
        let m = Matcher::exact(json!({"a": 1}));
        assert!(m.matches(&json!({"a": 1})));
        assert!(!m.matches(&json!({"a": 1, "b": 2})));
    }

    #[test]
    fn test_satisfies() {
        let m = Matcher::satisfies(|v| v.is_string(), "a string");
        assert!(m.matches(&json!("x")));
        assert!(!m.matches(&json!(1)));
        assert_eq!(m.describe(), "a string");
    }

    #[test]
    fn test_callbacks_never_match() {
        let m = Matcher::satisfies(|_| true, "anything");
        assert!(!m.matches_any(&[Arg::callback(|_| {})]));
    }

    #[test]
    fn test_describe() {
        assert_eq!(Matcher::from(json!(1)).describe(), "1");
        assert_eq!(Matcher::from("x").describe(), "\"x\"");
        assert_eq!(
            Matcher::from(json!({"b": 1, "a": 2})).describe(),
            r#"object with {"a":2,"b":1}"#
        );
    }

    #[test]
    fn test_loose_eq() {
        assert!(loose_eq(&json!({"a": [1, 2.0]}), &json!({"a": [1.0, 2]})));
        assert!(!loose_eq(&json!({"a": 1}), &json!({"a": 1, "b": 2})));
        assert!(!loose_eq(&json!(null), &json!(false)));
    }
}
