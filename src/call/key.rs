//! Canonical call-signature keys.

use std::fmt;

use serde_json::Value;

use super::Arg;

/// RFC 8785 serialization of a value: sorted object keys, normalised numbers.
pub(crate) fn canonical(value: &Value) -> String {
    serde_json_canonicalizer::to_string(value).unwrap_or_else(|_| value.to_string())
}

/// Structural key of an argument list.
///
/// Two argument lists produce the same key iff their canonical JSON forms are
/// identical. Callbacks have no JSON form and serialize as `null`, so calls
/// that differ only in which callback they pass share a key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallKey(String);

impl CallKey {
    /// Compute the key of an argument list.
    #[must_use]
    pub fn from_args(args: &[Arg]) -> Self {
        let array = Value::Array(args.iter().map(Arg::to_json).collect());
        Self(canonical(&array))
    }

    /// The canonical serialization.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CallKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
