//! `MockClock` implementation for virtual timers.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

use super::timer::{TimerId, TimerQueue};
use super::warp::warped;

/// A mock clock that provides virtual time and timers for tests.
///
/// Timers scheduled with [`schedule`](MockClock::schedule) fire only when
/// [`advance`](MockClock::advance) moves virtual time past their deadline.
/// Scheduling honours the thread's current [`warp`](super::warp), which is how
/// a double's `to_time_warp` behavior speeds up an original method's timers.
///
/// # Thread Safety
///
/// `MockClock` is thread-safe and can be cloned and shared across threads.
/// All clones share the same underlying time state.
///
/// # Example
///
/// ```rust
/// use understudy::clock::MockClock;
/// use std::sync::atomic::{AtomicBool, Ordering};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let clock = MockClock::new();
/// let fired = Arc::new(AtomicBool::new(false));
/// let fired2 = Arc::clone(&fired);
///
/// clock.schedule(Duration::from_secs(10), move || fired2.store(true, Ordering::SeqCst));
///
/// clock.advance(Duration::from_secs(9));
/// assert!(!fired.load(Ordering::SeqCst));
///
/// clock.advance(Duration::from_secs(1));
/// assert!(fired.load(Ordering::SeqCst));
/// ```
#[derive(Debug, Clone)]
pub struct MockClock {
    inner: Arc<Mutex<ClockState>>,
}

#[derive(Debug)]
struct ClockState {
    /// Current time as duration since clock creation
    current_time: Duration,
    /// Timers not yet fired
    timers: TimerQueue,
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MockClock {
    /// Creates a new `MockClock` starting at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::with_start_time(Duration::ZERO)
    }

    /// Creates a new `MockClock` starting at the specified time.
    ///
    /// # Example
    ///
    /// ```rust
    /// use understudy::clock::MockClock;
    /// use std::time::Duration;
    ///
    /// let clock = MockClock::with_start_time(Duration::from_secs(100));
    /// assert_eq!(clock.now(), Duration::from_secs(100));
    /// ```
    #[must_use]
    pub fn with_start_time(start: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ClockState {
                current_time: start,
                timers: TimerQueue::default(),
            })),
        }
    }

    /// Returns the current virtual time.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.inner.lock().current_time
    }

    /// Schedules `callback` to run once `delay` of virtual time has passed.
    ///
    /// The delay is shortened by the calling thread's current warp.
    pub fn schedule<F>(&self, delay: Duration, callback: F) -> TimerId
    where
        F: FnOnce() + Send + 'static,
    {
        let delay = warped(delay);
        let mut state = self.inner.lock();
        let deadline = state.current_time.saturating_add(delay);
        tracing::trace!(?delay, ?deadline, "timer scheduled");
        state.timers.push(deadline, Box::new(callback))
    }

    /// Cancels a pending timer. Returns `false` if it already fired or was cancelled.
    pub fn cancel(&self, id: TimerId) -> bool {
        self.inner.lock().timers.remove(id)
    }

    /// Advances the clock, firing every timer whose deadline is reached.
    ///
    /// Timers fire in deadline order with the clock set to their deadline, and
    /// without the clock locked, so a callback may schedule further timers;
    /// those fire too if they fall due within this advance.
    pub fn advance(&self, duration: Duration) {
        let target = self.now().saturating_add(duration);
        loop {
            let due = {
                let mut state = self.inner.lock();
                let entry = state.timers.pop_due(target);
                if let Some(entry) = &entry {
                    state.current_time = state.current_time.max(entry.deadline);
                }
                entry
            };
            match due {
                Some(entry) => (entry.callback)(),
                None => break,
            }
        }
        self.inner.lock().current_time = target;
    }

    /// Returns the number of timers waiting to fire.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.inner.lock().timers.len()
    }
}
