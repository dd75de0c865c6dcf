//! # Supervisor: restart a panicking operation, give up when it fails too fast.
//!
//! The [`Supervisor`] runs one operation over and over inside a fault boundary
//! until it returns normally. Every panic is caught and counted. The time between
//! consecutive panics feeds a moving average of the failure rate; when that
//! estimate stays above `rate_limit` for the whole `grace` period, the run ends
//! with [`RunError::GaveUp`].
//!
//! ## Loop
//! ```text
//! run(op)
//!   state = RunState::new(tracker(window = grace), now)
//!   loop {
//!     ├─► attempt > 1 && retry_delay > 0 → publish RetryScheduled, sleep(jitter(retry_delay))
//!     ├─► publish AttemptStarting
//!     ├─► boundary::catch(op)
//!     │       ├─ Ok  ──► publish Completed, return Ok(failures)
//!     │       └─ Err ──► state.record_failure(now)
//!     │                   ├─ Tolerated / Breached      ─► continue
//!     │                   ├─ BreachOpened / Cleared    ─► publish, continue
//!     │                   └─ GiveUp                    ─► publish GaveUp, return Err
//!   }
//! ```
//!
//! ## Rules
//! - Attempts run **sequentially**; the operation is never invoked concurrently.
//! - Run state is created per call to `run`; a `Supervisor` can be reused.
//! - Subscribers and logs never influence the retry/give-up decision.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use super::{
    boundary,
    breach::{RunState, Step},
    builder::SupervisorBuilder,
    clock::{Clock, SystemClock},
    config::SupervisorConfig,
};
use crate::{
    error::{CaughtFailure, ConfigError, RunError},
    events::{Event, EventKind},
    rate::{TrackerFactory, ewma_factory},
    subscribers::SubscriberSet,
};

/// Runs an operation robustly, catching and restarting on panics.
///
/// ## Example
/// ```rust
/// use std::time::Duration;
/// use robustvisor::{Supervisor, SupervisorConfig};
///
/// let cfg = SupervisorConfig {
///     rate_limit: 5.0,
///     grace: Duration::from_secs(2),
///     ..SupervisorConfig::default()
/// };
/// let sup = Supervisor::builder(cfg).with_name("flaky").build()?;
///
/// let mut calls = 0;
/// let failures = sup.run(|| {
///     calls += 1;
///     std::thread::sleep(Duration::from_millis(250));
///     if calls < 3 {
///         panic!("transient failure #{calls}");
///     }
/// })?;
/// assert_eq!(failures, 2);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Supervisor {
    cfg: SupervisorConfig,
    name: Arc<str>,
    subs: SubscriberSet,
    clock: Arc<dyn Clock>,
    tracker: TrackerFactory,
}

impl Supervisor {
    /// Creates a supervisor with the given configuration and default collaborators.
    pub fn new(cfg: SupervisorConfig) -> Result<Self, ConfigError> {
        SupervisorBuilder::new(cfg).build()
    }

    /// Returns a builder for attaching a name, subscribers, a clock or a rate tracker.
    pub fn builder(cfg: SupervisorConfig) -> SupervisorBuilder {
        SupervisorBuilder::new(cfg)
    }

    pub(crate) fn new_internal(
        cfg: SupervisorConfig,
        name: Arc<str>,
        subs: SubscriberSet,
        clock: Arc<dyn Clock>,
        tracker: TrackerFactory,
    ) -> Self {
        Self {
            cfg,
            name,
            subs,
            clock,
            tracker,
        }
    }

    /// Configuration in effect.
    pub fn config(&self) -> &SupervisorConfig {
        &self.cfg
    }

    /// Name used in logs and events.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Runs `op` until it returns without panicking.
    ///
    /// Returns the number of panics caught on the way (possibly zero), or
    /// [`RunError::GaveUp`] once the failure rate stayed above the limit for the
    /// grace period. Blocks the calling thread, including during retry pauses.
    pub fn run<F>(&self, mut op: F) -> Result<u64, RunError>
    where
        F: FnMut(),
    {
        let span = tracing::info_span!("supervise", name = %self.name);
        let _enter = span.enter();

        let mut state = self.begin(self.clock.now());
        let mut attempt: u64 = 0;
        loop {
            if attempt > 0 {
                if let Some(delay) = self.pause(attempt) {
                    self.clock.sleep(delay);
                }
            }
            attempt += 1;
            self.publish(|| Event::new(EventKind::AttemptStarting).with_attempt(attempt));

            match boundary::catch(self.cfg.capture_diagnostics, &mut op) {
                Ok(()) => return Ok(self.completed(&state, attempt)),
                Err(failure) => self.failed(&mut state, failure, self.clock.now(), attempt)?,
            }
        }
    }

    /// Runs the future produced by `op` until one completes without panicking.
    ///
    /// Same decision logic as [`Supervisor::run`], but time is read from the
    /// tokio timer and retry pauses use `tokio::time::sleep`, so
    /// `tokio::time::pause` makes runs deterministic. The configured
    /// [`Clock`] is not used here.
    #[cfg(feature = "tokio")]
    pub async fn run_async<F, Fut>(&self, mut op: F) -> Result<u64, RunError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ()>,
    {
        use tracing::Instrument;

        let now = || tokio::time::Instant::now().into_std();
        let span = tracing::info_span!("supervise", name = %self.name);
        async move {
            let capture = self.cfg.capture_diagnostics;
            let mut state = self.begin(now());
            let mut attempt: u64 = 0;
            loop {
                if attempt > 0 {
                    if let Some(delay) = self.pause(attempt) {
                        tokio::time::sleep(delay).await;
                    }
                }
                attempt += 1;
                self.publish(|| Event::new(EventKind::AttemptStarting).with_attempt(attempt));

                let res = match boundary::catch(capture, &mut op) {
                    Ok(fut) => boundary::catch_async(capture, fut).await,
                    Err(failure) => Err(failure),
                };
                match res {
                    Ok(()) => return Ok(self.completed(&state, attempt)),
                    Err(failure) => self.failed(&mut state, failure, now(), attempt)?,
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Fresh run state; warns once per run about a zero rate limit.
    fn begin(&self, start: Instant) -> RunState {
        if self.cfg.rate_limit == 0.0 {
            let msg = "rate limit is 0: any sustained failing ends the run after the grace period";
            warn!(grace = ?self.cfg.grace, "{msg}");
            self.publish(|| Event::new(EventKind::RateLimitZero).with_reason(msg));
        }
        RunState::new((self.tracker)(self.cfg.rate_window_secs()), start)
    }

    /// Pause before the attempt after `attempt`, if any.
    fn pause(&self, attempt: u64) -> Option<Duration> {
        let delay = self.cfg.jitter.apply(self.cfg.retry_delay()?);
        debug!(?delay, after_attempt = attempt, "retry scheduled");
        self.publish(|| {
            Event::new(EventKind::RetryScheduled)
                .with_attempt(attempt)
                .with_delay(delay)
        });
        Some(delay)
    }

    fn completed(&self, state: &RunState, attempt: u64) -> u64 {
        let failures = state.failures();
        debug!(attempt, failures, "operation completed");
        self.publish(|| {
            Event::new(EventKind::Completed)
                .with_attempt(attempt)
                .with_failures(failures)
        });
        failures
    }

    /// Records one caught panic; `Err` ends the run.
    fn failed(
        &self,
        state: &mut RunState,
        failure: CaughtFailure,
        now: Instant,
        attempt: u64,
    ) -> Result<(), RunError> {
        let step = state.record_failure(now, self.cfg.rate_limit, self.cfg.grace);
        let (failures, rate) = (state.failures(), state.rate());
        self.publish(|| {
            Event::new(EventKind::FailureCaught)
                .with_attempt(attempt)
                .with_failures(failures)
                .with_rate(rate)
                .with_failure(&failure)
        });

        match step {
            Step::GiveUp {
                since,
                breached_for,
            } => {
                let err = state.give_up(since, breached_for);
                error!(
                    failures,
                    rate,
                    ?breached_for,
                    last_panic = %failure.message,
                    "giving up: failure rate stayed above the limit"
                );
                self.publish(|| {
                    Event::new(EventKind::GaveUp)
                        .with_failures(failures)
                        .with_rate(rate)
                        .with_reason(err.to_string())
                });
                return Err(err);
            }
            Step::BreachOpened => {
                warn!(failures, rate, limit = self.cfg.rate_limit, "failure rate above limit");
                self.publish(|| {
                    Event::new(EventKind::BreachOpened)
                        .with_failures(failures)
                        .with_rate(rate)
                });
            }
            Step::BreachCleared => {
                info!(failures, rate, limit = self.cfg.rate_limit, "failure rate back under limit");
                self.publish(|| {
                    Event::new(EventKind::BreachCleared)
                        .with_failures(failures)
                        .with_rate(rate)
                });
            }
            Step::Breached { since } => {
                debug!(
                    failures,
                    rate,
                    breached_for = ?now.saturating_duration_since(since),
                    "failure rate still above limit"
                );
            }
            Step::Tolerated => {}
        }

        self.diagnose(&failure, attempt, failures, rate);
        Ok(())
    }

    fn diagnose(&self, failure: &CaughtFailure, attempt: u64, failures: u64, rate: f64) {
        let location = failure.location.as_deref().unwrap_or("unknown");
        match &failure.backtrace {
            Some(bt) if self.cfg.capture_diagnostics => warn!(
                attempt,
                failures,
                rate,
                location,
                "caught panic: {}\n{bt}",
                failure.message
            ),
            _ => debug!(
                attempt,
                failures,
                rate,
                location,
                "caught panic: {}",
                failure.message
            ),
        }
    }

    fn publish(&self, event: impl FnOnce() -> Event) {
        if self.subs.is_empty() {
            return;
        }
        self.subs.emit(&event().with_name(Arc::clone(&self.name)));
    }
}

impl Default for Supervisor {
    /// Default configuration, system clock, EWMA rate tracker, no subscribers.
    fn default() -> Self {
        Self::new_internal(
            SupervisorConfig::default(),
            Arc::from("robustvisor"),
            SubscriberSet::default(),
            Arc::new(SystemClock),
            ewma_factory(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::ManualClock;

    fn manual(cfg: SupervisorConfig) -> (Supervisor, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let sup = Supervisor::builder(cfg)
            .with_clock(clock.clone())
            .build()
            .unwrap();
        (sup, clock)
    }

    #[test]
    fn test_success_only_returns_zero() {
        let (sup, _clock) = manual(SupervisorConfig::default());
        let mut calls = 0;
        assert_eq!(sup.run(|| calls += 1).unwrap(), 0);
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_retry_delay_skips_first_attempt() {
        let cfg = SupervisorConfig {
            retry_delay: Duration::from_secs(2),
            ..SupervisorConfig::default()
        };
        let (sup, clock) = manual(cfg);
        let mut calls = 0;
        let failures = sup
            .run(|| {
                calls += 1;
                if calls <= 3 {
                    panic!("attempt {calls}");
                }
            })
            .unwrap();
        assert_eq!(failures, 3);
        assert_eq!(clock.elapsed(), Duration::from_secs(6));
    }

    #[test]
    fn test_default_supervisor_uses_defaults() {
        let sup = Supervisor::default();
        assert_eq!(sup.config(), &SupervisorConfig::default());
        assert_eq!(sup.name(), "robustvisor");
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let cfg = SupervisorConfig {
            rate_limit: -1.0,
            ..SupervisorConfig::default()
        };
        assert!(matches!(
            Supervisor::new(cfg),
            Err(ConfigError::InvalidRateLimit { .. })
        ));
    }
}
