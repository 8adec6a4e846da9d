//! Error definitions
//!
//! This module provides the error type shared by doubles, their behaviors and
//! their expectations.

use thiserror::Error;

/// Main error type for understudy
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// An expectation did not hold
    #[error("Assertion failed: {0}")]
    AssertionFailed(String),

    /// No call was recorded at the requested index
    #[error("invocation out of range")]
    OutOfRange {
        /// The index that was asked for.
        index: usize,
    },

    /// Raised by a `to_throw` behavior, or by an original method
    #[error("{0}")]
    Thrown(String),

    /// The double does not intercept a method with this name
    #[error("no intercepted method named `{0}`")]
    UnknownMethod(String),

    /// The double has no property with this name
    #[error("no property named `{0}`")]
    UnknownProperty(String),

    /// The property cannot be written
    #[error("property `{0}` is read-only")]
    ReadOnlyProperty(String),

    /// A callback behavior fired but the call carried no callback argument
    #[error("`{0}` was set up to call back but received no callback argument")]
    MissingCallback(String),
}

impl Error {
    /// Create an assertion failure.
    #[must_use]
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::AssertionFailed(message.into())
    }

    /// Create a thrown error, as an original method would raise it.
    #[must_use]
    pub fn thrown(message: impl Into<String>) -> Self {
        Self::Thrown(message.into())
    }

    /// Whether this is an assertion failure.
    #[must_use]
    pub fn is_assertion(&self) -> bool {
        matches!(self, Self::AssertionFailed(_))
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
