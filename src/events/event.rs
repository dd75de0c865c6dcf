//! # Runtime events emitted by the supervisor.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Attempt events**: one attempt's flow (starting, failure caught, retry scheduled)
//! - **Rate events**: the failure-rate estimate crossing the limit (opened, cleared)
//! - **Terminal events**: how the run ended (completed, gave up)
//!
//! The [`Event`] struct carries additional metadata such as timestamps, the
//! supervisor name, counters, the failure-rate estimate and panic diagnostics.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//!
//! ## Example
//! ```rust
//! use robustvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::FailureCaught)
//!     .with_name("worker")
//!     .with_reason("boom")
//!     .with_attempt(3)
//!     .with_failures(3)
//!     .with_rate(0.8);
//!
//! assert_eq!(ev.kind, EventKind::FailureCaught);
//! assert_eq!(ev.name.as_deref(), Some("worker"));
//! assert_eq!(ev.reason.as_deref(), Some("boom"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

use crate::error::CaughtFailure;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Run configuration ===
    /// The rate limit is zero: any sustained failing ends the run after the grace period.
    ///
    /// Sets:
    /// - `name`: supervisor name
    /// - `reason`: warning text
    RateLimitZero,

    // === Attempt events ===
    /// An attempt is about to invoke the operation.
    ///
    /// Sets:
    /// - `name`: supervisor name
    /// - `attempt`: attempt number (1-based, per run)
    AttemptStarting,

    /// The operation panicked; the panic was caught and counted.
    ///
    /// Sets:
    /// - `name`, `attempt`
    /// - `failures`: total caught failures so far (this one included)
    /// - `rate`: failure-rate estimate after this failure
    /// - `reason`: panic message
    /// - `location`: panic site, when known
    /// - `backtrace`: only with `capture_diagnostics`
    FailureCaught,

    /// A pause was scheduled before the next attempt.
    ///
    /// Sets:
    /// - `name`, `attempt` (the attempt that failed)
    /// - `delay_ms`: pause after jitter
    RetryScheduled,

    // === Rate events ===
    /// The failure-rate estimate crossed above the limit; the grace period starts.
    ///
    /// Sets:
    /// - `name`, `failures`, `rate`
    BreachOpened,

    /// The failure-rate estimate went back to or below the limit.
    ///
    /// Sets:
    /// - `name`, `failures`, `rate`
    BreachCleared,

    // === Terminal events ===
    /// The operation returned normally; the run is over.
    ///
    /// Sets:
    /// - `name`, `attempt`, `failures`
    Completed,

    /// The rate stayed above the limit for the whole grace period; the run is over.
    ///
    /// Sets:
    /// - `name`, `failures`, `rate`
    /// - `reason`: give-up message
    GaveUp,

    // === Subscriber events ===
    /// A subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `name`: subscriber name
    /// - `reason`: panic message
    SubscriberPanicked,
}

impl EventKind {
    /// Returns a short stable label (kebab-case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            EventKind::RateLimitZero => "rate-limit-zero",
            EventKind::AttemptStarting => "starting",
            EventKind::FailureCaught => "failed",
            EventKind::RetryScheduled => "retry",
            EventKind::BreachOpened => "breach-opened",
            EventKind::BreachCleared => "breach-cleared",
            EventKind::Completed => "completed",
            EventKind::GaveUp => "gave-up",
            EventKind::SubscriberPanicked => "subscriber-panicked",
        }
    }
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Supervisor (or subscriber) name.
    pub name: Option<Arc<str>>,
    /// Attempt number (starting from 1).
    pub attempt: Option<u64>,
    /// Caught failures so far in this run.
    pub failures: Option<u64>,
    /// Failure-rate estimate in failures per second.
    pub rate: Option<f64>,
    /// Retry pause in milliseconds (compact).
    pub delay_ms: Option<u32>,
    /// Human-readable reason (panic message, warning text, etc.).
    pub reason: Option<Arc<str>>,
    /// Panic location (`file:line:col`).
    pub location: Option<Arc<str>>,
    /// Backtrace captured at the panic site.
    pub backtrace: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            name: None,
            attempt: None,
            failures: None,
            rate: None,
            delay_ms: None,
            reason: None,
            location: None,
            backtrace: None,
        }
    }

    /// Attaches a supervisor (or subscriber) name.
    #[inline]
    pub fn with_name(mut self, name: impl Into<Arc<str>>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Attaches an attempt number.
    #[inline]
    pub fn with_attempt(mut self, n: u64) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Attaches the caught-failure count.
    #[inline]
    pub fn with_failures(mut self, n: u64) -> Self {
        self.failures = Some(n);
        self
    }

    /// Attaches the failure-rate estimate.
    #[inline]
    pub fn with_rate(mut self, rate: f64) -> Self {
        self.rate = Some(rate);
        self
    }

    /// Attaches a retry pause (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.delay_ms = Some(ms);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches message, location and backtrace of a caught panic.
    pub fn with_failure(mut self, failure: &CaughtFailure) -> Self {
        self.reason = Some(failure.message.as_str().into());
        self.location = failure.location.as_deref().map(Into::into);
        self.backtrace = failure.backtrace.as_deref().map(Into::into);
        self
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_name(subscriber)
            .with_reason(info)
    }

    #[inline]
    pub fn is_subscriber_panic(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberPanicked)
    }

    /// Retry pause, if set.
    #[inline]
    pub fn delay(&self) -> Option<Duration> {
        self.delay_ms.map(|ms| Duration::from_millis(u64::from(ms)))
    }
}
