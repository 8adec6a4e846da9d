//! Virtual timers for tests
//!
//! The `clock` module provides [`MockClock`], a virtual clock whose timers fire
//! only when the test advances time, and [`warp`], the scoped acceleration a
//! double applies while running a `to_time_warp` call.
//!
//! # Example
//!
//! ```rust
//! use understudy::clock::{warp, MockClock};
//! use std::time::Duration;
//!
//! let clock = MockClock::new();
//! {
//!     let _guard = warp(Duration::from_secs(50));
//!     clock.schedule(Duration::from_secs(60), || {});
//! }
//! clock.advance(Duration::from_secs(10));
//! assert_eq!(clock.pending_count(), 0);
//! ```

mod mock_clock;
mod timer;
mod warp;

pub use mock_clock::MockClock;
pub use timer::TimerId;
pub use warp::{current_warp, warp, WarpGuard};
