//! Fluent behavior configuration for one method of a double.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::call::{Arg, Output};
use crate::error::Result;

use super::behavior::Behavior;
use super::dispatcher::Dispatcher;

/// Configures what one method of a [`Double`](super::Double) does.
///
/// Every method returns `&Setup` so configuration chains; [`and`](Setup::and),
/// [`then`](Setup::then) and [`but`](Setup::but) only help it read.
/// Configuration never fails: setting a behavior again simply replaces the
/// earlier one for the same arguments.
///
/// A `when*` call is consumed by the next behavior (or `times`) configured
/// after it; calling `when*` twice in a row keeps only the second.
///
/// # Example
///
/// ```rust
/// use understudy::{args, Double, Output, Target};
/// use serde_json::json;
///
/// let double = Double::wrap(
///     Target::new().method("greet", |_| Ok(Output::from(json!("hello")))),
/// );
///
/// double
///     .setup("greet")
///     .to_return(json!("hi"))
///     .twice()
///     .and()
///     .then()
///     .to_return(json!("bye"));
/// double.setup("greet").when(args!["bob"]).to_return(json!("hey bob"));
///
/// let greet = |arg| double.call("greet", &args![arg]).unwrap().into_value().unwrap();
/// assert_eq!(greet("bob"), json!("hey bob"));
/// assert_eq!(greet("alice"), json!("hi"));
/// assert_eq!(greet("alice"), json!("hi"));
/// assert_eq!(greet("alice"), json!("bye"));
/// assert_eq!(greet("alice"), json!("bye"));
/// ```
pub struct Setup {
    dispatcher: Dispatcher,
}

impl Setup {
    pub(crate) fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    pub(crate) fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    fn install(&self, behavior: Behavior) -> &Self {
        self.dispatcher.install(behavior);
        self
    }

    /// Apply the next behavior only to calls with exactly these arguments.
    pub fn when<I>(&self, args: I) -> &Self
    where
        I: IntoIterator,
        I::Item: Into<Arg>,
    {
        let args: Vec<Arg> = args.into_iter().map(Into::into).collect();
        self.dispatcher.when_args(&args);
        self
    }

    /// Apply the next behavior to calls whose arguments satisfy `predicate`.
    pub fn when_fn<F>(&self, predicate: F) -> &Self
    where
        F: Fn(&[Arg]) -> bool + Send + Sync + 'static,
    {
        self.dispatcher.when_predicate(Arc::new(predicate));
        self
    }

    /// Replace the method with `func`.
    pub fn to_do_this<F>(&self, func: F) -> &Self
    where
        F: Fn(&[Arg]) -> Result<Output> + Send + Sync + 'static,
    {
        self.install(Behavior::DoThis(Arc::new(func)))
    }

    /// Return `value`.
    pub fn to_return(&self, value: impl Into<Value>) -> &Self {
        self.install(Behavior::Return(value.into()))
    }

    /// Fail with [`Error::Thrown`](crate::Error::Thrown) carrying `message`.
    pub fn to_throw(&self, message: impl Into<String>) -> &Self {
        self.install(Behavior::Throw(message.into()))
    }

    /// Return a deferred already resolved with `value`.
    pub fn to_resolve_with(&self, value: impl Into<Value>) -> &Self {
        self.install(Behavior::Resolve(value.into()))
    }

    /// Alias of [`to_resolve_with`](Setup::to_resolve_with).
    pub fn to_resolve(&self, value: impl Into<Value>) -> &Self {
        self.to_resolve_with(value)
    }

    /// Return a deferred already rejected with `reason`.
    pub fn to_reject_with(&self, reason: impl Into<Value>) -> &Self {
        self.install(Behavior::Reject(reason.into()))
    }

    /// Alias of [`to_reject_with`](Setup::to_reject_with).
    pub fn to_reject(&self, reason: impl Into<Value>) -> &Self {
        self.to_reject_with(reason)
    }

    /// Invoke the call's last callback argument with `values`, and return `null`.
    ///
    /// A call without any callback argument fails with
    /// [`Error::MissingCallback`](crate::Error::MissingCallback).
    pub fn to_callback_with<I>(&self, values: I) -> &Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.install(Behavior::CallbackWith(values))
    }

    /// Emit `event` with `payload` on the double, then call the original.
    pub fn to_emit<I>(&self, event: &str, payload: I) -> &Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.install(Behavior::Emit {
            event: event.to_string(),
            payload: payload.into_iter().map(Into::into).collect(),
        })
    }

    /// Call the original with every [`MockClock`](crate::clock::MockClock)
    /// timer it schedules shortened by `by`.
    ///
    /// The acceleration covers the original call only and is lifted on every
    /// exit path.
    pub fn to_time_warp(&self, by: Duration) -> &Self {
        self.install(Behavior::TimeWarp(by))
    }

    /// Run `hook` with the arguments of every call, before any behavior.
    ///
    /// The hook observes only; it does not affect which behavior fires.
    /// Setting a new hook replaces the previous one.
    pub fn to_intercept<F>(&self, hook: F) -> &Self
    where
        F: Fn(&[Arg]) + Send + Sync + 'static,
    {
        self.dispatcher.set_intercept(Arc::new(hook));
        self
    }

    /// Call the original method again.
    pub fn fallback(&self) -> &Self {
        self.install(Behavior::PassThrough)
    }

    /// Let the most recently configured behavior fire `count` times in sequence.
    ///
    /// Behaviors configured afterwards queue up behind it. The last queued
    /// behavior stays in force once the sequence is used up.
    pub fn times(&self, count: usize) -> &Self {
        self.dispatcher.times(count);
        self
    }

    /// `times(1)`.
    pub fn once(&self) -> &Self {
        self.times(1)
    }

    /// `times(2)`.
    pub fn twice(&self) -> &Self {
        self.times(2)
    }

    /// Chaining sugar.
    pub fn and(&self) -> &Self {
        self
    }

    /// Chaining sugar.
    pub fn then(&self) -> &Self {
        self
    }

    /// Chaining sugar.
    pub fn but(&self) -> &Self {
        self
    }
}

impl fmt::Debug for Setup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Setup")
            .field("method", &self.dispatcher.method())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;
    use crate::call::MethodFn;
    use crate::error::Error;
    use crate::mock::events::EventEmitter;
    use serde_json::json;

    fn setup() -> Setup {
        let original: MethodFn = Arc::new(|_: &[Arg]| Ok(Output::from(json!("original"))));
        Setup::new(Dispatcher::new("greet", "test", original, EventEmitter::new()))
    }

    fn call(setup: &Setup, args: &[Arg]) -> Result<Output> {
        setup.dispatcher().dispatch(args)
    }

    fn value(setup: &Setup, args: &[Arg]) -> Value {
        call(setup, args).unwrap().into_value().unwrap()
    }

    #[test]
    fn test_chaining_aliases() {
        let s = setup();
        s.to_return(json!(1)).once().and().then().but().to_return(json!(2));
        assert_eq!(value(&s, &args![]), json!(1));
        assert_eq!(value(&s, &args![]), json!(2));
    }

    #[test]
    fn test_when_explicit_args() {
        let s = setup();
        s.when(args![1, 2]).to_return("x");
        assert_eq!(value(&s, &args![1, 2]), json!("x"));
        assert_eq!(value(&s, &args![3, 4]), json!("original"));
    }

    #[test]
    fn test_when_accepts_values() {
        let s = setup();
        s.when([json!({"id": 1})]).to_return("one");
        assert_eq!(value(&s, &args![{"id": 1}]), json!("one"));
    }

    #[test]
    fn test_when_fn() {
        let s = setup();
        s.when_fn(|args| args.len() == 3).to_throw("three args");
        assert_eq!(
            call(&s, &args![1, 2, 3]).unwrap_err(),
            Error::Thrown("three args".into())
        );
        assert_eq!(value(&s, &args![1]), json!("original"));
    }

    #[test]
    fn test_to_do_this() {
        let s = setup();
        s.to_do_this(|args| Ok(Output::from(json!(args.len() * 10))));
        assert_eq!(value(&s, &args![1, 2]), json!(20));
    }

    #[test]
    fn test_fallback_restores_original() {
        let s = setup();
        s.to_return("x");
        s.fallback();
        assert_eq!(value(&s, &args![]), json!("original"));
    }

    #[test]
    fn test_resolve_and_reject() {
        let s = setup();
        s.to_resolve_with(json!({"ok": true}));
        let deferred = call(&s, &args![]).unwrap().into_deferred().unwrap();
        assert_eq!(futures::executor::block_on(deferred), Ok(json!({"ok": true})));

        s.to_reject("nope");
        let deferred = call(&s, &args![]).unwrap().into_deferred().unwrap();
        assert_eq!(futures::executor::block_on(deferred), Err(json!("nope")));
    }

    #[test]
    fn test_intercept_sees_every_call() {
        let s = setup();
        let seen = Arc::new(parking_lot::Mutex::new(0));
        let seen2 = Arc::clone(&seen);
        s.to_intercept(move |_| *seen2.lock() += 1).to_return("x");

        value(&s, &args![]);
        value(&s, &args![1]);
        assert_eq!(*seen.lock(), 2);
    }

    #[test]
    fn test_debug() {
        assert!(format!("{:?}", setup()).contains("greet"));
    }
}
