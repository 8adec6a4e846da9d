//! # understudy
//!
//! > Test doubles for dynamically-called collaborators
//!
//! **understudy** wraps a collaborator's methods so a test can record every
//! call, decide what each call does, and assert on how it was called.
//!
//! ## Quick Start
//!
//! ```rust
//! use understudy::prelude::*;
//! use serde_json::json;
//!
//! let db = stub(&["query", "close"], [], &Options::default());
//!
//! db.setup("query")
//!     .to_return(json!([]))
//!     .once()
//!     .then()
//!     .to_return(json!([{"id": 1}]));
//! db.setup("query").when(args!["DROP"]).to_throw("denied");
//!
//! assert_eq!(db.call("query", &args!["SELECT"]).unwrap().value(), Some(&json!([])));
//! assert!(db.call("query", &args!["DROP"]).is_err());
//! assert_eq!(
//!     db.call("query", &args!["SELECT"]).unwrap().value(),
//!     Some(&json!([{"id": 1}]))
//! );
//!
//! db.expect("query").called().times(3).unwrap();
//! db.expect("query").called().with_match(&Regex::new("^SEL").unwrap()).unwrap();
//! db.expect("close").called().never().unwrap();
//! ```
//!
//! ## Features
//!
//! - **Recording** - every call's arguments, in order, with count and content
//!   assertions
//! - **Behaviors** - return, throw, resolve, reject, call back, emit, or
//!   replace, per call sequence and per argument list
//! - **Matchers** - subset matching for objects, exact for arrays, predicates
//! - **Time warp** - shorten the timers a pass-through call schedules on a
//!   [`MockClock`](clock::MockClock)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Virtual timers and the time warp
pub mod clock;

pub mod assertions;
pub mod call;
pub mod error;
pub mod mock;

/// Prelude for convenient imports
///
/// ```rust
/// use understudy::prelude::*;
/// ```
pub mod prelude {
    pub use crate::args;
    pub use crate::assertions::Matcher;
    pub use crate::call::{Arg, Callback, CallKey, Output};
    pub use crate::clock::MockClock;
    pub use crate::error::{Error, Result};
    pub use crate::mock::{stub, wrap, Double, Options, Property, Target};
    pub use regex_lite::Regex;
}

// Re-exports
pub use assertions::Matcher;
pub use call::{Arg, Callback, CallKey, Output};
pub use error::{Error, Result};
pub use mock::{
    stub, wrap, DebugNamespace, Double, Expectations, MethodSource, Options, Property, Setup,
    Target,
};
pub use regex_lite::Regex;

#[doc(hidden)]
pub mod __private {
    pub use serde_json;
}
