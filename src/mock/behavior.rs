//! Units of call-handling logic.

use std::fmt;
use std::time::Duration;

use serde_json::Value;

use crate::call::{Arg, MethodFn, Output};
use crate::clock;
use crate::error::{Error, Result};

use super::events::EventEmitter;

/// What a configured method does when it fires.
#[derive(Clone)]
pub(crate) enum Behavior {
    /// Call the original method.
    PassThrough,
    /// Return a fixed value.
    Return(Value),
    /// Call a replacement function.
    DoThis(MethodFn),
    /// Fail with [`Error::Thrown`].
    Throw(String),
    /// Return an already-resolved deferred.
    Resolve(Value),
    /// Return an already-rejected deferred.
    Reject(Value),
    /// Invoke the last callback argument with these values.
    CallbackWith(Vec<Value>),
    /// Emit an event on the double, then call the original.
    Emit { event: String, payload: Vec<Value> },
    /// Call the original with timer delays shortened.
    TimeWarp(Duration),
}

/// What a behavior needs from the method it belongs to.
pub(crate) struct CallContext<'a> {
    pub(crate) method: &'a str,
    pub(crate) original: &'a MethodFn,
    pub(crate) emitter: &'a EventEmitter,
}

impl CallContext<'_> {
    fn call_original(&self, args: &[Arg]) -> Result<Output> {
        (self.original)(args)
    }
}

impl Behavior {
    /// Short name for diagnostics.
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Self::PassThrough => "pass-through",
            Self::Return(_) => "return",
            Self::DoThis(_) => "do-this",
            Self::Throw(_) => "throw",
            Self::Resolve(_) => "resolve",
            Self::Reject(_) => "reject",
            Self::CallbackWith(_) => "callback",
            Self::Emit { .. } => "emit",
            Self::TimeWarp(_) => "time-warp",
        }
    }

    pub(crate) fn run(&self, ctx: &CallContext<'_>, args: &[Arg]) -> Result<Output> {
        match self {
            Self::PassThrough => ctx.call_original(args),
            Self::Return(value) => Ok(Output::Value(value.clone())),
            Self::DoThis(func) => func(args),
            Self::Throw(message) => Err(Error::Thrown(message.clone())),
            Self::Resolve(value) => Ok(Output::resolved(value.clone())),
            Self::Reject(reason) => Ok(Output::rejected(reason.clone())),
            Self::CallbackWith(values) => {
                let callback = args
                    .iter()
                    .rev()
                    .find_map(Arg::as_callback)
                    .ok_or_else(|| Error::MissingCallback(ctx.method.to_string()))?;
                callback.invoke(values);
                Ok(Output::null())
            }
            Self::Emit { event, payload } => {
                ctx.emitter.emit(event, payload);
                ctx.call_original(args)
            }
            Self::TimeWarp(by) => {
                let _warp = clock::warp(*by);
                ctx.call_original(args)
            }
        }
    }
}

impl fmt::Debug for Behavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Return(value) | Self::Resolve(value) | Self::Reject(value) => {
                f.debug_tuple(self.kind()).field(value).finish()
            }
            Self::Throw(message) => f.debug_tuple(self.kind()).field(message).finish(),
            Self::CallbackWith(values) => f.debug_tuple(self.kind()).field(values).finish(),
            Self::Emit { event, payload } => f
                .debug_struct(self.kind())
                .field("event", event)
                .field("payload", payload)
                .finish(),
            Self::TimeWarp(by) => f.debug_tuple(self.kind()).field(by).finish(),
            Self::PassThrough | Self::DoThis(_) => f.write_str(self.kind()),
        }
    }
}
