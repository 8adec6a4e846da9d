//! Argument matching for call assertions.
//!
//! - [`Matcher`] - tagged matcher used by `with_args`, `with_arg` and
//!   `invocation(i).with_arg`
//!
//! # Example
//!
//! ```rust
//! use understudy::{args, assertions::Matcher};
//! use serde_json::json;
//!
//! let call = args![{"id": 7, "name": "bob"}, [1, 2], "x"];
//!
//! assert!(Matcher::from(json!({"id": 7})).matches_any(&call));
//! assert!(Matcher::from(json!([1, 2])).matches_any(&call));
//! assert!(Matcher::from("x").matches_any(&call));
//! ```

pub mod matcher;

pub use matcher::Matcher;
