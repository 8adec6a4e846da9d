//! Assertions over a method's call history.
//!
//! Every assertion returns `Ok(())` when it holds and
//! [`Error::AssertionFailed`] when it does not, so tests can use `?` or
//! `unwrap()`. Negated forms live under [`Called::not`].
//!
//! # Example
//!
//! ```rust
//! use understudy::{args, stub};
//! use serde_json::json;
//!
//! let double = stub(&["save"], [], &Default::default());
//! double.call("save", &args![{"id": 7, "name": "bob"}, "fast"]).unwrap();
//!
//! let called = double.expect("save").called();
//! called.once().unwrap();
//! called.with_args([json!({"id": 7}), json!("fast")]).unwrap();
//! called.not().with_arg(json!("slow")).unwrap();
//! double.expect("save").invocation(0).unwrap().with_arg(json!("fast")).unwrap();
//! ```

use std::fmt;

use regex_lite::Regex;
use serde_json::Value;

use crate::assertions::matcher::{loose_eq, Matcher};
use crate::call::{self, Arg};
use crate::error::{Error, Result};

use super::recorder::Recorder;

/// Count phrase for failure messages.
fn humanise(count: usize) -> String {
    match count {
        1 => "once".to_string(),
        2 => "twice".to_string(),
        n => format!("{n} times"),
    }
}

fn render_history(calls: &[Vec<Arg>]) -> String {
    if calls.is_empty() {
        return "no calls".to_string();
    }
    let rendered: Vec<String> = calls.iter().map(|args| call::render(args)).collect();
    rendered.join(", ")
}

/// Tests `pattern` against every leaf of `value`. Non-string leaves are tested
/// through their JSON text.
fn any_leaf_matches(value: &Value, pattern: &Regex) -> bool {
    match value {
        Value::Array(items) => items.iter().any(|item| any_leaf_matches(item, pattern)),
        Value::Object(map) => map.values().any(|item| any_leaf_matches(item, pattern)),
        Value::String(text) => pattern.is_match(text),
        other => pattern.is_match(&other.to_string()),
    }
}

/// The assertion surface of one intercepted method.
pub struct Expectations {
    recorder: Recorder,
}

impl Expectations {
    pub(crate) fn new(recorder: Recorder) -> Self {
        Self { recorder }
    }

    pub(crate) fn recorder(&self) -> &Recorder {
        &self.recorder
    }

    /// Assertions about how the method was called.
    #[must_use]
    pub fn called(&self) -> Called<'_> {
        Called {
            recorder: &self.recorder,
        }
    }

    /// A handle on the call at `index` (0-based).
    ///
    /// # Errors
    ///
    /// [`Error::OutOfRange`] if no call was recorded at `index`.
    pub fn invocation(&self, index: usize) -> Result<Invocation> {
        let args = self
            .recorder
            .get(index)
            .ok_or(Error::OutOfRange { index })?;
        Ok(Invocation {
            method: self.recorder.method().to_string(),
            index,
            args,
        })
    }

    /// Number of recorded calls.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.recorder.count()
    }

    /// Every recorded argument list, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<Vec<Arg>> {
        self.recorder.snapshot()
    }

    /// The most recent argument list.
    #[must_use]
    pub fn last_call(&self) -> Option<Vec<Arg>> {
        self.recorder.snapshot().pop()
    }
}

impl fmt::Debug for Expectations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Expectations")
            .field("recorder", &self.recorder)
            .finish()
    }
}

/// One recorded call.
#[derive(Debug, Clone)]
pub struct Invocation {
    method: String,
    index: usize,
    args: Vec<Arg>,
}

impl Invocation {
    /// The arguments of this call.
    #[must_use]
    pub fn args(&self) -> &[Arg] {
        &self.args
    }

    /// Assert that `expected` matches one of this call's arguments.
    ///
    /// # Errors
    ///
    /// [`Error::AssertionFailed`] if no argument matches.
    pub fn with_arg(&self, expected: impl Into<Matcher>) -> Result<()> {
        let matcher = expected.into();
        if matcher.matches_any(&self.args) {
            Ok(())
        } else {
            Err(Error::assertion(format!(
                "Expected {} invocation {} to have argument: {}; arguments: {}",
                self.method,
                self.index,
                matcher.describe(),
                call::render(&self.args)
            )))
        }
    }
}

/// Positive call assertions, from [`Expectations::called`].
#[derive(Clone, Copy)]
pub struct Called<'a> {
    recorder: &'a Recorder,
}

impl<'a> Called<'a> {
    fn method(&self) -> &str {
        self.recorder.method()
    }

    fn count_check(
        &self,
        relation: &str,
        expected: usize,
        holds: impl Fn(usize, usize) -> bool,
    ) -> Result<()> {
        let actual = self.recorder.count();
        if holds(actual, expected) {
            return Ok(());
        }
        let actual = if actual == 0 {
            "was never called".to_string()
        } else {
            format!("was called {}", humanise(actual))
        };
        Err(Error::assertion(format!(
            "Expected {} to be called {}{} but {}",
            self.method(),
            relation,
            humanise(expected),
            actual
        )))
    }

    /// The method was called exactly `count` times.
    ///
    /// # Errors
    ///
    /// [`Error::AssertionFailed`] otherwise.
    pub fn times(&self, count: usize) -> Result<()> {
        self.count_check("", count, |actual, expected| actual == expected)
    }

    /// The method was not called.
    ///
    /// # Errors
    ///
    /// [`Error::AssertionFailed`] otherwise.
    pub fn never(&self) -> Result<()> {
        self.times(0)
    }

    /// The method was called exactly once.
    ///
    /// # Errors
    ///
    /// [`Error::AssertionFailed`] otherwise.
    pub fn once(&self) -> Result<()> {
        self.times(1)
    }

    /// The method was called exactly twice.
    ///
    /// # Errors
    ///
    /// [`Error::AssertionFailed`] otherwise.
    pub fn twice(&self) -> Result<()> {
        self.times(2)
    }

    /// Fewer than `count` calls.
    ///
    /// # Errors
    ///
    /// [`Error::AssertionFailed`] otherwise.
    pub fn lt(&self, count: usize) -> Result<()> {
        self.count_check("less than ", count, |actual, expected| actual < expected)
    }

    /// At most `count` calls.
    ///
    /// # Errors
    ///
    /// [`Error::AssertionFailed`] otherwise.
    pub fn lte(&self, count: usize) -> Result<()> {
        self.count_check("less than or equal to ", count, |actual, expected| {
            actual <= expected
        })
    }

    /// More than `count` calls.
    ///
    /// # Errors
    ///
    /// [`Error::AssertionFailed`] otherwise.
    pub fn gt(&self, count: usize) -> Result<()> {
        self.count_check("greater than ", count, |actual, expected| actual > expected)
    }

    /// At least `count` calls.
    ///
    /// # Errors
    ///
    /// [`Error::AssertionFailed`] otherwise.
    pub fn gte(&self, count: usize) -> Result<()> {
        self.count_check("greater than or equal to ", count, |actual, expected| {
            actual >= expected
        })
    }

    /// Some single call has, for every expected matcher, a matching argument.
    ///
    /// Arguments are matched by shape: arrays exactly, objects as property
    /// subsets, primitives by value (see [`Matcher`]).
    ///
    /// # Errors
    ///
    /// [`Error::AssertionFailed`] if no call satisfies all matchers.
    pub fn with_args<I>(&self, expected: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Into<Matcher>,
    {
        let matchers: Vec<Matcher> = expected.into_iter().map(Into::into).collect();
        let held = self
            .recorder
            .snapshot()
            .iter()
            .any(|args| matchers.iter().all(|m| m.matches_any(args)));
        if held {
            return Ok(());
        }
        let described: Vec<String> = matchers.iter().map(Matcher::describe).collect();
        Err(Error::assertion(format!(
            "Expected {} to be called with: {}",
            self.method(),
            described.join(", ")
        )))
    }

    /// Some call has an argument matching `expected`.
    ///
    /// # Errors
    ///
    /// [`Error::AssertionFailed`] if no call does.
    pub fn with_arg(&self, expected: impl Into<Matcher>) -> Result<()> {
        self.with_args([expected.into()])
    }

    /// Some call has an argument, or a value nested anywhere inside one, that
    /// `pattern` matches.
    ///
    /// # Errors
    ///
    /// [`Error::AssertionFailed`] carrying the whole history if none does.
    pub fn with_match(&self, pattern: &Regex) -> Result<()> {
        let calls = self.recorder.snapshot();
        let matched = calls.iter().any(|args| {
            args.iter()
                .filter_map(Arg::as_value)
                .any(|value| any_leaf_matches(value, pattern))
        });
        if matched {
            return Ok(());
        }
        Err(Error::assertion(format!(
            "Expected {} to be called matching: {}; calls: {}",
            self.method(),
            pattern,
            render_history(&calls)
        )))
    }

    /// At least one call was made and every call's argument list equals
    /// `expected`, position by position.
    ///
    /// # Errors
    ///
    /// [`Error::AssertionFailed`] if there were no calls or any call differs.
    pub fn match_exactly<I>(&self, expected: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let expected: Vec<Value> = expected.into_iter().map(Into::into).collect();
        let calls = self.recorder.snapshot();
        let held = !calls.is_empty()
            && calls.iter().all(|args| {
                args.len() == expected.len()
                    && args.iter().zip(&expected).all(|(arg, expected)| {
                        arg.as_value().is_some_and(|value| loose_eq(value, expected))
                    })
            });
        if held {
            return Ok(());
        }
        let rendered: Vec<Arg> = expected.into_iter().map(Arg::Value).collect();
        Err(Error::assertion(format!(
            "Expected {} to be called with exactly: {}; calls: {}",
            self.method(),
            call::render(&rendered),
            render_history(&calls)
        )))
    }

    /// Forget every recorded call.
    pub fn reset(&self) {
        self.recorder.reset();
    }

    /// The negated assertions.
    #[must_use]
    pub fn not(&self) -> NotCalled<'a> {
        NotCalled { called: *self }
    }
}

impl fmt::Debug for Called<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Called")
            .field("method", &self.method())
            .field("call_count", &self.recorder.count())
            .finish()
    }
}

/// Negated call assertions, from [`Called::not`].
///
/// Each one runs its positive counterpart: an assertion failure becomes
/// success, success becomes an assertion failure, and any other error is
/// returned as is.
#[derive(Debug, Clone, Copy)]
pub struct NotCalled<'a> {
    called: Called<'a>,
}

impl NotCalled<'_> {
    fn negate(&self, positive: Result<()>, description: impl FnOnce() -> String) -> Result<()> {
        match positive {
            Ok(()) => Err(Error::assertion(format!(
                "Expected {} not to be called {}",
                self.called.method(),
                description()
            ))),
            Err(err) if err.is_assertion() => Ok(()),
            Err(err) => Err(err),
        }
    }

    /// Not exactly `count` calls.
    ///
    /// # Errors
    ///
    /// [`Error::AssertionFailed`] if there were exactly `count` calls.
    pub fn times(&self, count: usize) -> Result<()> {
        self.negate(self.called.times(count), || humanise(count))
    }

    /// At least one call.
    ///
    /// # Errors
    ///
    /// [`Error::AssertionFailed`] if there were none.
    pub fn never(&self) -> Result<()> {
        self.negate(self.called.never(), || "never".to_string())
    }

    /// Not exactly one call.
    ///
    /// # Errors
    ///
    /// [`Error::AssertionFailed`] if there was exactly one.
    pub fn once(&self) -> Result<()> {
        self.negate(self.called.once(), || humanise(1))
    }

    /// Not exactly two calls.
    ///
    /// # Errors
    ///
    /// [`Error::AssertionFailed`] if there were exactly two.
    pub fn twice(&self) -> Result<()> {
        self.negate(self.called.twice(), || humanise(2))
    }

    /// At least `count` calls.
    ///
    /// # Errors
    ///
    /// [`Error::AssertionFailed`] if there were fewer.
    pub fn lt(&self, count: usize) -> Result<()> {
        self.negate(self.called.lt(count), || format!("less than {}", humanise(count)))
    }

    /// More than `count` calls.
    ///
    /// # Errors
    ///
    /// [`Error::AssertionFailed`] if there were at most `count`.
    pub fn lte(&self, count: usize) -> Result<()> {
        self.negate(self.called.lte(count), || {
            format!("less than or equal to {}", humanise(count))
        })
    }

    /// At most `count` calls.
    ///
    /// # Errors
    ///
    /// [`Error::AssertionFailed`] if there were more.
    pub fn gt(&self, count: usize) -> Result<()> {
        self.negate(self.called.gt(count), || {
            format!("greater than {}", humanise(count))
        })
    }

    /// Fewer than `count` calls.
    ///
    /// # Errors
    ///
    /// [`Error::AssertionFailed`] if there were at least `count`.
    pub fn gte(&self, count: usize) -> Result<()> {
        self.negate(self.called.gte(count), || {
            format!("greater than or equal to {}", humanise(count))
        })
    }

    /// No single call satisfies all the matchers.
    ///
    /// # Errors
    ///
    /// [`Error::AssertionFailed`] if one does.
    pub fn with_args<I>(&self, expected: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Into<Matcher>,
    {
        let matchers: Vec<Matcher> = expected.into_iter().map(Into::into).collect();
        let described: Vec<String> = matchers.iter().map(Matcher::describe).collect();
        self.negate(self.called.with_args(matchers), || {
            format!("with: {}", described.join(", "))
        })
    }

    /// No call has an argument matching `expected`.
    ///
    /// # Errors
    ///
    /// [`Error::AssertionFailed`] if one does.
    pub fn with_arg(&self, expected: impl Into<Matcher>) -> Result<()> {
        self.with_args([expected.into()])
    }

    /// No argument of any call contains a match for `pattern`.
    ///
    /// # Errors
    ///
    /// [`Error::AssertionFailed`] if one does.
    pub fn with_match(&self, pattern: &Regex) -> Result<()> {
        self.negate(self.called.with_match(pattern), || {
            format!("matching: {pattern}")
        })
    }

    /// Not every call (or no call at all) equals `expected`.
    ///
    /// # Errors
    ///
    /// [`Error::AssertionFailed`] if `match_exactly(expected)` holds.
    pub fn match_exactly<I>(&self, expected: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let expected: Vec<Value> = expected.into_iter().map(Into::into).collect();
        let rendered: Vec<Arg> = expected.iter().cloned().map(Arg::Value).collect();
        let rendered = call::render(&rendered);
        self.negate(self.called.match_exactly(expected), || {
            format!("with exactly: {rendered}")
        })
    }
}
