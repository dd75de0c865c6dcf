//! # Time source for the blocking runner.
//!
//! [`Clock`] abstracts "what time is it" and "pause for a while" so the
//! give-up boundary can be tested without real sleeps.
//!
//! - [`SystemClock`]: `Instant::now()` and `std::thread::sleep` (default).
//! - [`ManualClock`]: virtual time; only moves when advanced or slept on.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use robustvisor::{Clock, ManualClock};
//!
//! let clock = ManualClock::new();
//! let start = clock.now();
//! clock.sleep(Duration::from_millis(300)); // returns immediately
//! assert_eq!(clock.now() - start, Duration::from_millis(300));
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Monotonic time source with a blocking pause.
pub trait Clock: Send + Sync + 'static {
    /// Current instant.
    fn now(&self) -> Instant;

    /// Blocks the caller for `dur`.
    fn sleep(&self, dur: Duration);
}

/// Wall clock backed by [`Instant::now`] and [`std::thread::sleep`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, dur: Duration) {
        std::thread::sleep(dur);
    }
}

/// Virtual clock for deterministic tests.
///
/// Time starts at construction and only moves through [`ManualClock::advance`]
/// or [`Clock::sleep`], which advances instead of blocking. Share it between the
/// supervisor and the operation under test with an `Arc`.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    offset_nanos: AtomicU64,
}

impl ManualClock {
    /// Creates a clock frozen at the current instant.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset_nanos: AtomicU64::new(0),
        }
    }

    /// Moves virtual time forward by `dur`.
    pub fn advance(&self, dur: Duration) {
        let nanos = dur.as_nanos().min(u128::from(u64::MAX)) as u64;
        self.offset_nanos.fetch_add(nanos, Ordering::SeqCst);
    }

    /// Virtual time elapsed since construction.
    pub fn elapsed(&self) -> Duration {
        Duration::from_nanos(self.offset_nanos.load(Ordering::SeqCst))
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed()
    }

    fn sleep(&self, dur: Duration) {
        self.advance(dur);
    }
}
