//! Event emitter embedded in every double.
//!
//! `to_emit` behaviors publish here; tests subscribe through the double's
//! `on` / `once`.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;

/// A subscriber to a named event.
pub type Listener = Arc<dyn Fn(&[Value]) + Send + Sync>;

struct Registration {
    listener: Listener,
    once: bool,
}

/// Named-event publish/subscribe.
///
/// Cloning shares the subscriptions.
#[derive(Clone, Default)]
pub struct EventEmitter {
    listeners: Arc<Mutex<HashMap<String, Vec<Registration>>>>,
}

impl EventEmitter {
    /// Creates an emitter with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to every future emission of `event`.
    pub fn on<F>(&self, event: &str, listener: F)
    where
        F: Fn(&[Value]) + Send + Sync + 'static,
    {
        self.register(event, Arc::new(listener), false);
    }

    /// Subscribe to the next emission of `event` only.
    pub fn once<F>(&self, event: &str, listener: F)
    where
        F: Fn(&[Value]) + Send + Sync + 'static,
    {
        self.register(event, Arc::new(listener), true);
    }

    fn register(&self, event: &str, listener: Listener, once: bool) {
        self.listeners
            .lock()
            .entry(event.to_string())
            .or_default()
            .push(Registration { listener, once });
    }

    /// Publish `event` to its subscribers, in subscription order.
    ///
    /// Returns `true` if the event had subscribers. Listeners run without the
    /// subscription table locked, so they may subscribe or emit themselves.
    pub fn emit(&self, event: &str, payload: &[Value]) -> bool {
        let listeners: Vec<Listener> = {
            let mut table = self.listeners.lock();
            let Some(registrations) = table.get_mut(event) else {
                return false;
            };
            let listeners = registrations
                .iter()
                .map(|r| Arc::clone(&r.listener))
                .collect();
            registrations.retain(|r| !r.once);
            if registrations.is_empty() {
                table.remove(event);
            }
            listeners
        };
        tracing::trace!(event, listeners = listeners.len(), "emit");
        for listener in &listeners {
            listener(payload);
        }
        !listeners.is_empty()
    }

    /// Number of subscribers to `event`.
    #[must_use]
    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners.lock().get(event).map_or(0, Vec::len)
    }
}

impl fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = self.listeners.lock();
        let mut events: Vec<(&String, usize)> =
            table.iter().map(|(name, regs)| (name, regs.len())).collect();
        events.sort();
        f.debug_struct("EventEmitter").field("events", &events).finish()
    }
}
