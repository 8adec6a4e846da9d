//! Per-method behavior resolution.
//!
//! A [`Dispatcher`] owns every behavior configured for one method and decides,
//! call by call, which one fires:
//!
//! 1. the queue of the lane keyed by the call's [`CallKey`], if non-empty
//! 2. that keyed lane's persistent behavior
//! 3. the first registered predicate accepting the arguments
//! 4. the global queue, if non-empty
//! 5. the global default
//!
//! An intercept hook, if set, runs before all of this. No lock is held while a
//! hook, a predicate or the chosen behavior runs, so behaviors may call back
//! into the same double.

use std::collections::{HashMap, VecDeque};

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::call::{Arg, ArgPredicate, CallKey, Hook, MethodFn, Output};
use crate::error::Result;

use super::behavior::{Behavior, CallContext};
use super::events::EventEmitter;

/// Configuration waiting for the next `to_*` (or `times`) call to consume it.
#[derive(Clone, Default)]
pub(crate) enum Pending {
    #[default]
    Idle,
    ExplicitArgs(CallKey),
    Predicate(ArgPredicate),
}

impl Pending {
    /// Take the pending state, leaving `Idle` behind.
    pub(crate) fn consume(&mut self) -> Pending {
        std::mem::take(self)
    }

    #[cfg(test)]
    fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

/// A steady behavior plus its sequential queue. The back of the queue fires next.
#[derive(Default)]
struct Lane {
    steady: Option<Behavior>,
    queue: VecDeque<Behavior>,
    /// The front of the queue was installed after the last `times`
    fresh: bool,
}

impl Lane {
    fn with_steady(behavior: Behavior) -> Self {
        Self {
            steady: Some(behavior),
            ..Self::default()
        }
    }

    /// Queue behind a live sequence, or replace the steady behavior once the
    /// sequence has drained.
    fn install(&mut self, behavior: Behavior) {
        if self.queue.is_empty() {
            self.fresh = false;
        } else {
            self.queue.push_front(behavior.clone());
            self.fresh = true;
        }
        self.steady = Some(behavior);
    }

    /// Queue `count` copies of the most recently configured behavior.
    fn repeat(&mut self, count: usize, fallback: &Behavior) {
        let latest = if self.fresh {
            self.queue.pop_front()
        } else {
            None
        };
        let latest = latest
            .or_else(|| self.steady.clone())
            .unwrap_or_else(|| fallback.clone());
        for _ in 0..count {
            self.queue.push_front(latest.clone());
        }
        self.fresh = false;
    }

    /// The behavior for the next call, pinning the final queue entry as steady.
    fn next(&mut self) -> Option<Behavior> {
        match self.queue.pop_back() {
            Some(behavior) => {
                if self.queue.is_empty() {
                    self.steady = Some(behavior.clone());
                    self.fresh = false;
                }
                Some(behavior)
            }
            None => self.steady.clone(),
        }
    }
}

struct DispatchState {
    global: Lane,
    keyed: HashMap<CallKey, Lane>,
    predicates: Vec<(ArgPredicate, Behavior)>,
    pending: Pending,
    /// Lane of the most recent install; `None` is the global lane
    last_lane: Option<CallKey>,
    intercept: Option<Hook>,
}

impl DispatchState {
    fn new() -> Self {
        Self {
            global: Lane::with_steady(Behavior::PassThrough),
            keyed: HashMap::new(),
            predicates: Vec::new(),
            pending: Pending::Idle,
            last_lane: None,
            intercept: None,
        }
    }

    fn lane_mut(&mut self, key: Option<&CallKey>) -> &mut Lane {
        match key {
            Some(key) => self.keyed.entry(key.clone()).or_default(),
            None => &mut self.global,
        }
    }
}

/// Holds and resolves the behaviors of one intercepted method.
pub(crate) struct Dispatcher {
    method: String,
    namespace: String,
    original: MethodFn,
    emitter: EventEmitter,
    state: Mutex<DispatchState>,
}

impl Dispatcher {
    pub(crate) fn new(
        method: &str,
        namespace: &str,
        original: MethodFn,
        emitter: EventEmitter,
    ) -> Self {
        Self {
            method: method.to_string(),
            namespace: namespace.to_string(),
            original,
            emitter,
            state: Mutex::new(DispatchState::new()),
        }
    }

    pub(crate) fn method(&self) -> &str {
        &self.method
    }

    /// Record pending explicit arguments. Overwrites any earlier pending state.
    pub(crate) fn when_args(&self, args: &[Arg]) {
        let key = CallKey::from_args(args);
        debug!(ns = %self.namespace, method = %self.method, %key, "when args");
        self.state.lock().pending = Pending::ExplicitArgs(key);
    }

    /// Record a pending predicate. Overwrites any earlier pending state.
    pub(crate) fn when_predicate(&self, predicate: ArgPredicate) {
        debug!(ns = %self.namespace, method = %self.method, "when predicate");
        self.state.lock().pending = Pending::Predicate(predicate);
    }

    /// Install a behavior, consuming the pending state.
    pub(crate) fn install(&self, behavior: Behavior) {
        let mut state = self.state.lock();
        match state.pending.consume() {
            Pending::ExplicitArgs(key) => {
                debug!(ns = %self.namespace, method = %self.method, %key, kind = behavior.kind(), "keyed behavior");
                state.lane_mut(Some(&key)).install(behavior);
                state.last_lane = Some(key);
            }
            Pending::Predicate(predicate) => {
                debug!(ns = %self.namespace, method = %self.method, kind = behavior.kind(), "predicate behavior");
                state.predicates.push((predicate, behavior));
            }
            Pending::Idle => {
                debug!(ns = %self.namespace, method = %self.method, kind = behavior.kind(), "default behavior");
                state.global.install(behavior);
                state.last_lane = None;
            }
        }
    }

    /// Queue the most recently configured behavior `count` times.
    ///
    /// Pending explicit arguments are consumed and select their keyed lane;
    /// otherwise the lane of the last install is used. A pending predicate is
    /// left in place.
    pub(crate) fn times(&self, count: usize) {
        let mut state = self.state.lock();
        let lane = match state.pending.consume() {
            Pending::ExplicitArgs(key) => Some(key),
            other => {
                state.pending = other;
                state.last_lane.clone()
            }
        };
        debug!(ns = %self.namespace, method = %self.method, count, keyed = lane.is_some(), "times");
        let fallback = state
            .global
            .steady
            .clone()
            .unwrap_or(Behavior::PassThrough);
        state.lane_mut(lane.as_ref()).repeat(count, &fallback);
        state.last_lane = lane;
    }

    pub(crate) fn set_intercept(&self, hook: Hook) {
        self.state.lock().intercept = Some(hook);
    }

    /// Run the intercept hook, resolve the behavior for `args`, and execute it.
    pub(crate) fn dispatch(&self, args: &[Arg]) -> Result<Output> {
        let hook = self.state.lock().intercept.clone();
        if let Some(hook) = hook {
            trace!(ns = %self.namespace, method = %self.method, "intercept");
            hook(args);
        }

        let behavior = self.resolve(args);
        let ctx = CallContext {
            method: &self.method,
            original: &self.original,
            emitter: &self.emitter,
        };
        behavior.run(&ctx, args)
    }

    fn resolve(&self, args: &[Arg]) -> Behavior {
        let key = CallKey::from_args(args);
        let predicates = {
            let mut state = self.state.lock();
            if let Some(behavior) = state.keyed.get_mut(&key).and_then(Lane::next) {
                debug!(ns = %self.namespace, method = %self.method, %key, kind = behavior.kind(), "resolved by arguments");
                return behavior;
            }
            state.predicates.clone()
        };

        if let Some((_, behavior)) = predicates.into_iter().find(|(predicate, _)| predicate(args)) {
            debug!(ns = %self.namespace, method = %self.method, kind = behavior.kind(), "resolved by predicate");
            return behavior;
        }

        let behavior = self
            .state
            .lock()
            .global
            .next()
            .unwrap_or(Behavior::PassThrough);
        debug!(ns = %self.namespace, method = %self.method, kind = behavior.kind(), "resolved by default");
        behavior
    }

    /// Whether a `when` is waiting to be consumed.
    #[cfg(test)]
    fn has_pending(&self) -> bool {
        !self.state.lock().pending.is_idle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn dispatcher() -> Dispatcher {
        let original: MethodFn = Arc::new(|_: &[Arg]| Ok(Output::from(json!("original"))));
        Dispatcher::new("greet", "test", original, EventEmitter::new())
    }

    fn value(dispatcher: &Dispatcher, args: &[Arg]) -> Value {
        dispatcher.dispatch(args).unwrap().into_value().unwrap()
    }

    #[test]
    fn test_pending_consume_returns_to_idle() {
        let mut pending = Pending::ExplicitArgs(CallKey::from_args(&args![1]));
        assert!(matches!(pending.consume(), Pending::ExplicitArgs(_)));
        assert!(pending.is_idle());
        assert!(pending.consume().is_idle());
    }

    #[test]
    fn test_pending_last_write_wins() {
        let d = dispatcher();
        d.when_args(&args![1]);
        d.when_args(&args![2]);
        d.install(Behavior::Return(json!("two")));

        assert!(!d.has_pending());
        assert_eq!(value(&d, &args![2]), json!("two"));
        assert_eq!(value(&d, &args![1]), json!("original"));
    }

    #[test]
    fn test_default_is_pass_through() {
        let d = dispatcher();
        assert_eq!(value(&d, &args![]), json!("original"));
    }

    #[test]
    fn test_default_is_replaced() {
        let d = dispatcher();
        d.install(Behavior::Return(json!(1)));
        d.install(Behavior::Return(json!(2)));
        assert_eq!(value(&d, &args![]), json!(2));
        assert_eq!(value(&d, &args![]), json!(2));
    }

    #[test]
    fn test_sequence_then_steady() {
        let d = dispatcher();
        d.install(Behavior::Return(json!("a")));
        d.times(2);
        d.install(Behavior::Return(json!("b")));

        let seen: Vec<Value> = (0..5).map(|_| value(&d, &args![])).collect();
        assert_eq!(seen, vec![json!("a"), json!("a"), json!("b"), json!("b"), json!("b")]);
    }

    #[test]
    fn test_last_queued_behavior_is_pinned() {
        let d = dispatcher();
        d.install(Behavior::Return(json!("a")));
        d.times(1);
        d.install(Behavior::Return(json!("b")));
        d.times(1);

        let seen: Vec<Value> = (0..4).map(|_| value(&d, &args![])).collect();
        assert_eq!(seen, vec![json!("a"), json!("b"), json!("b"), json!("b")]);
    }

    #[test]
    fn test_install_after_drained_queue_replaces() {
        let d = dispatcher();
        d.install(Behavior::Return(json!("a")));
        d.times(1);
        assert_eq!(value(&d, &args![]), json!("a"));

        d.install(Behavior::Return(json!("b")));
        d.install(Behavior::Return(json!("c")));
        let seen: Vec<Value> = (0..3).map(|_| value(&d, &args![])).collect();
        assert_eq!(seen, vec![json!("c"), json!("c"), json!("c")]);
    }

    #[test]
    fn test_times_after_drained_queue_starts_new_sequence() {
        let d = dispatcher();
        d.install(Behavior::Return(json!("a")));
        d.times(1);
        assert_eq!(value(&d, &args![]), json!("a"));

        d.install(Behavior::Return(json!("b")));
        d.times(1);
        d.install(Behavior::Return(json!("c")));
        let seen: Vec<Value> = (0..3).map(|_| value(&d, &args![])).collect();
        assert_eq!(seen, vec![json!("b"), json!("c"), json!("c")]);
    }

    #[test]
    fn test_times_without_install_repeats_default() {
        let d = dispatcher();
        d.times(2);
        d.install(Behavior::Return(json!("later")));

        let seen: Vec<Value> = (0..3).map(|_| value(&d, &args![])).collect();
        assert_eq!(seen, vec![json!("original"), json!("original"), json!("later")]);
    }

    #[test]
    fn test_keyed_behavior() {
        let d = dispatcher();
        d.when_args(&args![1, 2]);
        d.install(Behavior::Return(json!("x")));

        assert_eq!(value(&d, &args![1, 2]), json!("x"));
        assert_eq!(value(&d, &args![1, 2]), json!("x"));
        assert_eq!(value(&d, &args![3, 4]), json!("original"));
    }

    #[test]
    fn test_keyed_queue() {
        let d = dispatcher();
        d.when_args(&args!["k"]);
        d.install(Behavior::Return(json!("first")));
        d.times(1);
        d.when_args(&args!["k"]);
        d.install(Behavior::Return(json!("then")));

        let seen: Vec<Value> = (0..3).map(|_| value(&d, &args!["k"])).collect();
        assert_eq!(seen, vec![json!("first"), json!("then"), json!("then")]);
        assert_eq!(value(&d, &args!["other"]), json!("original"));
    }

    #[test]
    fn test_when_then_times_queues_default_for_key() {
        let d = dispatcher();
        d.install(Behavior::Return(json!("default")));
        d.when_args(&args![9]);
        d.times(1);

        assert_eq!(value(&d, &args![9]), json!("default"));
        // The keyed lane pinned the default it queued
        d.install(Behavior::Return(json!("new default")));
        assert_eq!(value(&d, &args![9]), json!("default"));
        assert_eq!(value(&d, &args![1]), json!("new default"));
    }

    #[test]
    fn test_predicate_behavior() {
        let d = dispatcher();
        d.when_predicate(Arc::new(|args: &[Arg]| {
            args.first()
                .and_then(Arg::as_value)
                .and_then(Value::as_i64)
                .is_some_and(|n| n > 10)
        }));
        d.install(Behavior::Return(json!("big")));
        d.install(Behavior::Return(json!("default")));

        assert_eq!(value(&d, &args![11]), json!("big"));
        assert_eq!(value(&d, &args![3]), json!("default"));
    }

    #[test]
    fn test_predicates_in_registration_order() {
        let d = dispatcher();
        d.when_predicate(Arc::new(|_: &[Arg]| true));
        d.install(Behavior::Return(json!("first")));
        d.when_predicate(Arc::new(|_: &[Arg]| true));
        d.install(Behavior::Return(json!("second")));

        assert_eq!(value(&d, &args![]), json!("first"));
    }

    #[test]
    fn test_precedence() {
        let d = dispatcher();
        d.install(Behavior::Return(json!("queued")));
        d.times(5);
        d.when_predicate(Arc::new(|_: &[Arg]| true));
        d.install(Behavior::Return(json!("predicate")));
        d.when_args(&args![1]);
        d.install(Behavior::Return(json!("keyed")));
        d.when_args(&args![2]);
        d.install(Behavior::Return(json!("keyed-queue")));
        d.times(1);

        assert_eq!(value(&d, &args![2]), json!("keyed-queue"));
        assert_eq!(value(&d, &args![1]), json!("keyed"));
        assert_eq!(value(&d, &args![3]), json!("predicate"));
    }

    #[test]
    fn test_global_queue_beats_default() {
        let d = dispatcher();
        d.install(Behavior::Return(json!("once")));
        d.times(1);
        assert_eq!(value(&d, &args![]), json!("once"));
    }

    #[test]
    fn test_times_keeps_pending_predicate() {
        let d = dispatcher();
        d.when_predicate(Arc::new(|_: &[Arg]| true));
        d.times(2);
        assert!(d.has_pending());
        d.install(Behavior::Return(json!("p")));
        assert!(!d.has_pending());
        assert_eq!(value(&d, &args![]), json!("p"));
    }

    #[test]
    fn test_times_zero_drops_the_latest() {
        let d = dispatcher();
        d.install(Behavior::Return(json!("a")));
        d.times(1);
        d.install(Behavior::Return(json!("b")));
        d.times(0);

        let seen: Vec<Value> = (0..2).map(|_| value(&d, &args![])).collect();
        assert_eq!(seen, vec![json!("a"), json!("a")]);
    }

    #[test]
    fn test_intercept_runs_first_and_does_not_change_resolution() {
        let d = dispatcher();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen2 = Arc::clone(&seen);
        d.set_intercept(Arc::new(move |args: &[Arg]| seen2.lock().push(args.len())));
        d.install(Behavior::Return(json!("r")));

        assert_eq!(value(&d, &args![1, 2]), json!("r"));
        assert_eq!(*seen.lock(), vec![2]);
    }

    #[test]
    fn test_intercept_does_not_consume_pending() {
        let d = dispatcher();
        d.when_args(&args![1]);
        d.set_intercept(Arc::new(|_: &[Arg]| {}));
        assert!(d.has_pending());
    }
}
