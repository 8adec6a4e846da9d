//! Scoped timer acceleration.
//!
//! While a [`WarpGuard`] is alive, every delay handed to
//! [`MockClock::schedule`](super::MockClock::schedule) on the same thread is
//! shortened by the warp amount. Dropping the guard restores the previous warp,
//! whether the scope ends normally, through `?`, or by unwinding.

use std::cell::Cell;
use std::marker::PhantomData;
use std::time::Duration;

thread_local! {
    static WARP: Cell<Duration> = const { Cell::new(Duration::ZERO) };
}

/// Restores the previous warp when dropped.
#[derive(Debug)]
#[must_use = "the warp ends as soon as the guard is dropped"]
pub struct WarpGuard {
    previous: Duration,
    // Tied to the thread whose warp it changed
    _not_send: PhantomData<*const ()>,
}

impl Drop for WarpGuard {
    fn drop(&mut self) {
        WARP.with(|warp| warp.set(self.previous));
    }
}

/// Shorten timer delays scheduled on this thread by `by` until the guard drops.
///
/// Nested warps add up.
///
/// ```rust
/// use understudy::clock::{current_warp, warp};
/// use std::time::Duration;
///
/// {
///     let _outer = warp(Duration::from_millis(100));
///     let _inner = warp(Duration::from_millis(50));
///     assert_eq!(current_warp(), Duration::from_millis(150));
/// }
/// assert_eq!(current_warp(), Duration::ZERO);
/// ```
pub fn warp(by: Duration) -> WarpGuard {
    let previous = WARP.with(|warp| warp.replace(warp.get().saturating_add(by)));
    WarpGuard {
        previous,
        _not_send: PhantomData,
    }
}

/// The warp currently in effect on this thread.
#[must_use]
pub fn current_warp() -> Duration {
    WARP.with(Cell::get)
}

/// Apply the current warp to a timer delay.
pub(crate) fn warped(delay: Duration) -> Duration {
    delay.saturating_sub(current_warp())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_restores_on_drop() {
        assert_eq!(current_warp(), Duration::ZERO);
        let guard = warp(Duration::from_secs(1));
        assert_eq!(current_warp(), Duration::from_secs(1));
        drop(guard);
        assert_eq!(current_warp(), Duration::ZERO);
    }

    #[test]
    fn test_warped_saturates() {
        let _guard = warp(Duration::from_millis(500));
        assert_eq!(warped(Duration::from_millis(800)), Duration::from_millis(300));
        assert_eq!(warped(Duration::from_millis(200)), Duration::ZERO);
    }

    #[test]
    fn test_guard_restores_on_unwind() {
        let result = std::panic::catch_unwind(|| {
            let _guard = warp(Duration::from_secs(5));
            panic!("boom");
        });
        assert!(result.is_err());
        assert_eq!(current_warp(), Duration::ZERO);
    }

    #[test]
    fn test_warp_is_per_thread() {
        let _guard = warp(Duration::from_secs(1));
        let other = std::thread::spawn(current_warp).join().unwrap();
        assert_eq!(other, Duration::ZERO);
    }
}
