//! The test double: recording and configurable dispatch for every method of
//! a [`Target`].

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;

use crate::call::{Arg, Output};
use crate::error::{Error, Result};

use super::dispatcher::Dispatcher;
use super::events::EventEmitter;
use super::expect::Expectations;
use super::options::Options;
use super::recorder::Recorder;
use super::setup::Setup;
use super::target::{Descriptor, Property, Target};

struct Slot {
    expectations: Expectations,
    setup: Setup,
}

struct DoubleInner {
    namespace: String,
    names: Vec<String>,
    slots: HashMap<String, Slot>,
    emitter: EventEmitter,
    properties: Mutex<HashMap<String, Descriptor>>,
}

/// A stand-in for a collaborator.
///
/// Each method of the wrapped [`Target`] gets its own call history
/// ([`expect`](Double::expect)) and behavior configuration
/// ([`setup`](Double::setup)). Unconfigured methods call the original.
///
/// Cloning is cheap; clones share all state.
///
/// # Example
///
/// ```rust
/// use understudy::{args, Double, Output, Target};
/// use serde_json::json;
///
/// let double = Double::wrap(
///     Target::new().method("add", |args| {
///         let sum: i64 = args.iter().filter_map(|a| a.as_value()?.as_i64()).sum();
///         Ok(Output::from(json!(sum)))
///     }),
/// );
///
/// let out = double.call("add", &args![1, 2]).unwrap();
/// assert_eq!(out.value(), Some(&json!(3)));
///
/// double.setup("add").to_return(json!(0));
/// let out = double.call("add", &args![1, 2]).unwrap();
/// assert_eq!(out.value(), Some(&json!(0)));
///
/// double.expect("add").called().twice().unwrap();
/// double.expect("add").called().with_args([json!(1), json!(2)]).unwrap();
/// ```
#[derive(Clone)]
pub struct Double {
    inner: Arc<DoubleInner>,
}

/// Wrap `target` in a [`Double`].
#[must_use]
pub fn wrap(target: Target, options: &Options) -> Double {
    Double::build(target, options.namespace("wrap"))
}

impl Double {
    /// Wrap `target` with default options.
    #[must_use]
    pub fn wrap(target: Target) -> Self {
        wrap(target, &Options::default())
    }

    pub(crate) fn build(target: Target, namespace: String) -> Self {
        let (methods, properties) = target.into_parts();
        let emitter = EventEmitter::new();

        let mut names = Vec::with_capacity(methods.len());
        let mut slots = HashMap::with_capacity(methods.len());
        for (name, original) in methods {
            let recorder = Recorder::new(&name, &format!("{namespace}:expectations"));
            let dispatcher = Dispatcher::new(
                &name,
                &format!("{namespace}:setup"),
                original,
                emitter.clone(),
            );
            slots.insert(
                name.clone(),
                Slot {
                    expectations: Expectations::new(recorder),
                    setup: Setup::new(dispatcher),
                },
            );
            names.push(name);
        }

        tracing::debug!(ns = %namespace, methods = ?names, "double created");

        Self {
            inner: Arc::new(DoubleInner {
                namespace,
                names,
                slots,
                emitter,
                properties: Mutex::new(
                    properties.into_iter().map(Property::into_parts).collect(),
                ),
            }),
        }
    }

    fn slot(&self, method: &str) -> Result<&Slot> {
        self.inner
            .slots
            .get(method)
            .ok_or_else(|| Error::UnknownMethod(method.to_string()))
    }

    /// Call `method`: record the arguments, then run whichever behavior
    /// applies and return its result unchanged.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownMethod`] if the target had no such method, otherwise
    /// whatever the behavior produces.
    pub fn call(&self, method: &str, args: &[Arg]) -> Result<Output> {
        let slot = self.slot(method)?;
        slot.expectations.recorder().record(args);
        slot.setup.dispatcher().dispatch(args)
    }

    /// Assertions over the calls made to `method`.
    ///
    /// # Panics
    ///
    /// Panics if the target had no such method.
    #[must_use]
    #[track_caller]
    pub fn expect(&self, method: &str) -> &Expectations {
        match self.try_expect(method) {
            Ok(expectations) => expectations,
            Err(err) => panic!("{err}"),
        }
    }

    /// Like [`expect`](Double::expect), without panicking.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownMethod`] if the target had no such method.
    pub fn try_expect(&self, method: &str) -> Result<&Expectations> {
        self.slot(method).map(|slot| &slot.expectations)
    }

    /// Behavior configuration for `method`.
    ///
    /// # Panics
    ///
    /// Panics if the target had no such method.
    #[must_use]
    #[track_caller]
    pub fn setup(&self, method: &str) -> &Setup {
        match self.try_setup(method) {
            Ok(setup) => setup,
            Err(err) => panic!("{err}"),
        }
    }

    /// Like [`setup`](Double::setup), without panicking.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownMethod`] if the target had no such method.
    pub fn try_setup(&self, method: &str) -> Result<&Setup> {
        self.slot(method).map(|slot| &slot.setup)
    }

    /// Forget the call history of every method. Configured behaviors stay.
    pub fn reset_calls(&self) {
        for slot in self.inner.slots.values() {
            slot.expectations.called().reset();
        }
    }

    /// Subscribe to every emission of `event`.
    pub fn on<F>(&self, event: &str, listener: F)
    where
        F: Fn(&[Value]) + Send + Sync + 'static,
    {
        self.inner.emitter.on(event, listener);
    }

    /// Subscribe to the next emission of `event`.
    pub fn once<F>(&self, event: &str, listener: F)
    where
        F: Fn(&[Value]) + Send + Sync + 'static,
    {
        self.inner.emitter.once(event, listener);
    }

    /// Emit `event` to its subscribers. Returns `true` if there were any.
    pub fn emit(&self, event: &str, payload: &[Value]) -> bool {
        self.inner.emitter.emit(event, payload)
    }

    /// Intercepted method names, in target order.
    #[must_use]
    pub fn method_names(&self) -> &[String] {
        &self.inner.names
    }

    /// Whether `method` is intercepted.
    #[must_use]
    pub fn has_method(&self, method: &str) -> bool {
        self.inner.slots.contains_key(method)
    }

    /// Read a declared property.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownProperty`] if no such property was declared.
    pub fn property(&self, name: &str) -> Result<Value> {
        let getter = match self.inner.properties.lock().get(name) {
            Some(Descriptor::Value { value, .. }) => return Ok(value.clone()),
            Some(Descriptor::Accessor { get, .. }) => Arc::clone(get),
            None => return Err(Error::UnknownProperty(name.to_string())),
        };
        Ok(getter())
    }

    /// Write a declared property.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownProperty`] if no such property was declared,
    /// [`Error::ReadOnlyProperty`] if it is neither writable nor has a setter.
    pub fn set_property(&self, name: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        let setter = {
            let mut properties = self.inner.properties.lock();
            match properties.get_mut(name) {
                Some(Descriptor::Value {
                    value: current,
                    writable: true,
                }) => {
                    *current = value;
                    return Ok(());
                }
                Some(Descriptor::Accessor { set: Some(set), .. }) => Arc::clone(set),
                Some(_) => return Err(Error::ReadOnlyProperty(name.to_string())),
                None => return Err(Error::UnknownProperty(name.to_string())),
            }
        };
        setter(value);
        Ok(())
    }
}

impl fmt::Debug for Double {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Double")
            .field("namespace", &self.inner.namespace)
            .field("methods", &self.inner.names)
            .finish_non_exhaustive()
    }
}
