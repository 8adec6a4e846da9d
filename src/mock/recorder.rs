//! Per-method call history.

use std::fmt;

use parking_lot::Mutex;

use crate::call::{self, Arg};

/// Ordered snapshots of every call made to one method.
///
/// The call count is the length of the history, so resetting clears both at
/// once under a single lock.
pub(crate) struct Recorder {
    method: String,
    namespace: String,
    calls: Mutex<Vec<Vec<Arg>>>,
}

impl Recorder {
    pub(crate) fn new(method: &str, namespace: &str) -> Self {
        Self {
            method: method.to_string(),
            namespace: namespace.to_string(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn method(&self) -> &str {
        &self.method
    }

    /// Append a snapshot of `args`.
    pub(crate) fn record(&self, args: &[Arg]) {
        let mut calls = self.calls.lock();
        tracing::debug!(
            ns = %self.namespace,
            method = %self.method,
            index = calls.len(),
            args = %call::render(args),
            "call recorded"
        );
        calls.push(args.to_vec());
    }

    pub(crate) fn count(&self) -> usize {
        self.calls.lock().len()
    }

    pub(crate) fn get(&self, index: usize) -> Option<Vec<Arg>> {
        self.calls.lock().get(index).cloned()
    }

    pub(crate) fn snapshot(&self) -> Vec<Vec<Arg>> {
        self.calls.lock().clone()
    }

    pub(crate) fn reset(&self) {
        tracing::debug!(ns = %self.namespace, method = %self.method, "history reset");
        self.calls.lock().clear();
    }
}

impl fmt::Debug for Recorder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Recorder")
            .field("method", &self.method)
            .field("call_count", &self.count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;
    use serde_json::json;

    #[test]
    fn test_record_is_dense_and_ordered() {
        let recorder = Recorder::new("greet", "test");
        recorder.record(&args![1]);
        recorder.record(&args![2, 3]);

        assert_eq!(recorder.count(), 2);
        assert_eq!(recorder.get(0), Some(args![1]));
        assert_eq!(recorder.get(1), Some(args![2, 3]));
        assert_eq!(recorder.get(2), None);
    }

    #[test]
    fn test_snapshot_is_isolated() {
        let recorder = Recorder::new("greet", "test");
        let mut args = args![{"name": "bob"}];
        recorder.record(&args);

        args[0] = Arg::from(json!({"name": "mutated"}));
        assert_eq!(recorder.get(0), Some(args![{"name": "bob"}]));
    }

    #[test]
    fn test_reset() {
        let recorder = Recorder::new("greet", "test");
        recorder.record(&args![]);
        recorder.reset();

        assert_eq!(recorder.count(), 0);
        assert!(recorder.snapshot().is_empty());
        recorder.record(&args!["again"]);
        assert_eq!(recorder.get(0), Some(args!["again"]));
    }
}
