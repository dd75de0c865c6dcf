//! # robustvisor
//!
//! **Robustvisor** keeps an operation running through infrequent panics.
//!
//! It invokes a caller-supplied operation inside a fault boundary and restarts
//! it every time it panics. Occasional panics are tolerated; an operation that
//! panics faster than `rate_limit` per second for longer than the `grace` period
//! is given up on with a [`RunError`], instead of spinning forever.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!      ┌───────────────┐
//!      │   operation   │   FnMut()  /  FnMut() -> impl Future
//!      └───────┬───────┘
//!              ▼
//! ┌───────────────────────────────────────────────────────────────┐
//! │  Supervisor                                                   │
//! │  - boundary  (catch_unwind → CaughtFailure, panic-site hook)  │
//! │  - RunState  (failures, rate estimate, breach window)         │
//! │  - RateTracker (EWMA over 1/Δt, window = grace)               │
//! │  - Clock     (now + blocking sleep; manual in tests)          │
//! └──────┬────────────────────────────────────────┬───────────────┘
//!        ▼                                        ▼
//!   tracing (span "supervise")            SubscriberSet ──► Subscribe::on_event()
//!                                                            (LogWriter, custom)
//! ```
//!
//! ### Lifecycle
//! ```text
//! loop {
//!   ├─► attempt > 1 → sleep(jitter(retry_delay))   (if retry_delay > 0)
//!   ├─► catch(op)
//!   │     ├─ returned ──► Ok(failures)
//!   │     └─ panicked ──► failures += 1
//!   │                     rate = tracker.add(1 / (now - last)).value()
//!   │                     rate > limit ? (Below → Above{since: now}) : Below
//!   │                     Above{since} && now >= since + grace ──► Err(GaveUp)
//!   └─► continue
//! }
//! ```
//!
//! ## Features
//! | Area              | Description                                                   | Key types / traits                          |
//! |-------------------|---------------------------------------------------------------|---------------------------------------------|
//! | **Supervision**   | Restart on panic, give up on sustained high failure rate.     | [`Supervisor`], [`run`]                     |
//! | **Rate tracking** | Pluggable moving average of the failure rate.                 | [`RateTracker`], [`Ewma`]                   |
//! | **Time**          | Injectable clock for deterministic tests.                     | [`Clock`], [`ManualClock`]                  |
//! | **Subscriber API**| Hook into lifecycle events (logging, metrics, alerts).        | [`Subscribe`], [`Event`]                    |
//! | **Errors**        | Typed errors for give-up, caught panics and bad config.       | [`RunError`], [`CaughtFailure`], [`ConfigError`] |
//! | **Configuration** | Limits, grace period, retry pause and jitter.                 | [`SupervisorConfig`], [`JitterPolicy`]      |
//!
//! ## Optional features
//! - `logging`: exports the built-in `LogWriter` subscriber.
//! - `serde`: (de)serialization of [`SupervisorConfig`] with humantime durations.
//! - `tokio`: `Supervisor::run_async` for operations that return futures.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use robustvisor::{Supervisor, SupervisorConfig};
//!
//! let mut cfg = SupervisorConfig::default();
//! cfg.rate_limit = 10.0;
//! cfg.grace = Duration::from_secs(5);
//!
//! let sup = Supervisor::builder(cfg).with_name("poller").build()?;
//!
//! let mut polls = 0;
//! let failures = sup.run(|| {
//!     polls += 1;
//!     std::thread::sleep(Duration::from_millis(150));
//!     if polls == 1 {
//!         panic!("connection reset");
//!     }
//! })?;
//! assert_eq!(failures, 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
mod core;
mod error;
mod events;
mod policies;
mod rate;
mod subscribers;

// ---- Public re-exports ----

pub use crate::core::{Clock, ManualClock, Supervisor, SupervisorBuilder, SupervisorConfig, SystemClock};
pub use error::{CaughtFailure, ConfigError, RunError};
pub use events::{Event, EventKind};
pub use policies::JitterPolicy;
pub use rate::{Ewma, RateTracker, TrackerFactory};
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: expose a built-in logger subscriber.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;

/// Runs `op` robustly with the default configuration.
///
/// Defaults: `rate_limit = 1.0`, `grace = 1s`, `retry_delay = 0`,
/// `capture_diagnostics = false`. Returns the number of panics caught before
/// `op` returned normally.
///
/// ## Example
/// ```rust
/// let mut left = 1;
/// let failures = robustvisor::run(|| {
///     std::thread::sleep(std::time::Duration::from_millis(1100));
///     if left > 0 {
///         left -= 1;
///         panic!("first call fails");
///     }
/// })?;
/// assert_eq!(failures, 1);
/// # Ok::<(), robustvisor::RunError>(())
/// ```
pub fn run<F>(op: F) -> Result<u64, RunError>
where
    F: FnMut(),
{
    Supervisor::default().run(op)
}
