//! Test doubles for dynamically-called collaborators.
//!
//! This module provides the pieces of a double:
//!
//! - [`Double`] - wraps a [`Target`], recording and dispatching every method
//! - [`Setup`] - fluent behavior configuration for one method
//! - [`Expectations`] - assertions over one method's call history
//! - [`stub`] - a double whose methods do nothing
//!
//! # Wrapping
//!
//! ```rust
//! use understudy::{args, Double, Output, Target};
//! use serde_json::json;
//!
//! let double = Double::wrap(
//!     Target::new().method("fetch", |_| Ok(Output::from(json!("real")))),
//! );
//!
//! double.setup("fetch").when(args!["cached"]).to_return(json!("fake"));
//!
//! let fetch = |key| double.call("fetch", &args![key]).unwrap().into_value().unwrap();
//! assert_eq!(fetch("cached"), json!("fake"));
//! assert_eq!(fetch("other"), json!("real"));
//! double.expect("fetch").called().twice().unwrap();
//! ```
//!
//! # Stubbing
//!
//! ```rust
//! use understudy::{args, stub, Options};
//! use serde_json::json;
//!
//! let double = stub(&["send"], [], &Options::default());
//! double.setup("send").to_throw("offline");
//!
//! assert!(double.call("send", &args!["hi"]).is_err());
//! double.expect("send").called().with_arg(json!("hi")).unwrap();
//! ```

mod behavior;
mod dispatcher;
mod double;
mod events;
mod expect;
mod options;
mod recorder;
mod setup;
mod stub;
mod target;

pub use double::{wrap, Double};
pub use events::{EventEmitter, Listener};
pub use expect::{Called, Expectations, Invocation, NotCalled};
pub use options::{DebugNamespace, Options, DEFAULT_PREFIX};
pub use setup::Setup;
pub use stub::stub;
pub use target::{Descriptor, Getter, MethodSource, Property, Setter, Target};
