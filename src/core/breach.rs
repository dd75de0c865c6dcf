//! # Per-run failure-rate state machine.
//!
//! [`RunState`] is created at the start of a run, updated once per caught
//! failure, and dropped when the run ends. It is the only mutable state of a
//! run and is never shared.
//!
//! ## States
//! ```text
//!            rate <= limit                       rate > limit
//!   ┌──────────────────────┐  rate > limit  ┌──────────────────────┐
//!   │        Below         │ ─────────────► │  Above { since=now } │
//!   │                      │ ◄───────────── │                      │
//!   └──────────────────────┘  rate <= limit └──────────┬───────────┘
//!                                                      │ now >= since + grace
//!                                                      ▼
//!                                                   GiveUp (terminal)
//! ```
//!
//! ## Rules
//! - `failures` increments exactly once per [`RunState::record_failure`].
//! - `since` is set only on the `Below → Above` transition.
//! - When the clock did not advance between failures the rate sample is skipped;
//!   the breach state is kept and the give-up check still runs.

use std::time::{Duration, Instant};

use crate::{error::RunError, rate::RateTracker};

/// Whether the failure-rate estimate is above the limit, and since when.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Breach {
    Below,
    Above { since: Instant },
}

/// Result of recording one caught failure.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Step {
    /// Estimate at or below the limit, and it already was.
    Tolerated,
    /// Estimate went back to or below the limit.
    BreachCleared,
    /// Estimate crossed above the limit at this failure.
    BreachOpened,
    /// Estimate still above the limit, inside the grace period.
    Breached { since: Instant },
    /// Estimate above the limit for the whole grace period.
    GiveUp { since: Instant, breached_for: Duration },
}

/// Mutable state of one supervised run.
pub(crate) struct RunState {
    tracker: Box<dyn RateTracker>,
    last_event: Instant,
    rate: f64,
    breach: Breach,
    failures: u64,
}

impl RunState {
    /// Fresh state at `start`: no failures, below the limit.
    pub(crate) fn new(tracker: Box<dyn RateTracker>, start: Instant) -> Self {
        Self {
            tracker,
            last_event: start,
            rate: 0.0,
            breach: Breach::Below,
            failures: 0,
        }
    }

    pub(crate) fn failures(&self) -> u64 {
        self.failures
    }

    pub(crate) fn rate(&self) -> f64 {
        self.rate
    }

    #[cfg(test)]
    pub(crate) fn breach(&self) -> Breach {
        self.breach
    }

    /// Counts a failure observed at `now` and decides whether the run goes on.
    pub(crate) fn record_failure(&mut self, now: Instant, limit: f64, grace: Duration) -> Step {
        self.failures += 1;

        let elapsed = now.saturating_duration_since(self.last_event);
        let was_below = self.breach == Breach::Below;
        if !elapsed.is_zero() {
            self.tracker.add(1.0 / elapsed.as_secs_f64());
            self.rate = self.tracker.value();

            if self.rate > limit {
                if was_below {
                    self.breach = Breach::Above { since: now };
                }
            } else {
                self.breach = Breach::Below;
            }
        }
        self.last_event = now;

        match self.breach {
            Breach::Below if was_below => Step::Tolerated,
            Breach::Below => Step::BreachCleared,
            Breach::Above { since } => {
                let breached_for = now.saturating_duration_since(since);
                if breached_for >= grace {
                    Step::GiveUp {
                        since,
                        breached_for,
                    }
                } else if was_below {
                    Step::BreachOpened
                } else {
                    Step::Breached { since }
                }
            }
        }
    }

    /// Builds the terminal error for a [`Step::GiveUp`].
    pub(crate) fn give_up(&self, since: Instant, breached_for: Duration) -> RunError {
        RunError::GaveUp {
            failures: self.failures,
            rate: self.rate,
            since,
            breached_for,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rate::Ewma;

    const GRACE: Duration = Duration::from_secs(1);

    fn state(start: Instant) -> RunState {
        RunState::new(Box::new(Ewma::new(GRACE.as_secs_f64())), start)
    }

    #[test]
    fn test_failures_at_the_limit_are_tolerated() {
        let t0 = Instant::now();
        let mut st = state(t0);
        for i in 1..=5 {
            let step = st.record_failure(t0 + Duration::from_secs(i), 1.0, GRACE);
            assert_eq!(step, Step::Tolerated, "failure {i}");
        }
        assert_eq!(st.failures(), 5);
        assert_eq!(st.rate(), 1.0);
    }

    #[test]
    fn test_breach_opens_then_gives_up_after_grace() {
        let t0 = Instant::now();
        let mut st = state(t0);
        let at = |ms: u64| t0 + Duration::from_millis(ms);

        assert_eq!(st.record_failure(at(300), 1.0, GRACE), Step::BreachOpened);
        assert_eq!(st.breach(), Breach::Above { since: at(300) });
        for ms in [600, 900, 1200] {
            assert_eq!(
                st.record_failure(at(ms), 1.0, GRACE),
                Step::Breached { since: at(300) }
            );
        }
        assert_eq!(
            st.record_failure(at(1500), 1.0, GRACE),
            Step::GiveUp {
                since: at(300),
                breached_for: Duration::from_millis(1200)
            }
        );
        assert_eq!(st.failures(), 5);
    }

    #[test]
    fn test_slow_failure_clears_breach_and_resets_since() {
        let t0 = Instant::now();
        let mut st = state(t0);
        let at = |ms: u64| t0 + Duration::from_millis(ms);

        assert_eq!(st.record_failure(at(300), 1.0, GRACE), Step::BreachOpened);
        assert_eq!(st.record_failure(at(2300), 1.0, GRACE), Step::BreachCleared);
        assert_eq!(st.breach(), Breach::Below);
        assert_eq!(st.record_failure(at(2400), 1.0, GRACE), Step::BreachOpened);
        assert_eq!(st.breach(), Breach::Above { since: at(2400) });
    }

    #[test]
    fn test_zero_elapsed_skips_sample_but_keeps_breach() {
        let t0 = Instant::now();
        let mut st = state(t0);
        let at = |ms: u64| t0 + Duration::from_millis(ms);

        assert_eq!(st.record_failure(at(100), 1.0, GRACE), Step::BreachOpened);
        let rate = st.rate();
        assert_eq!(
            st.record_failure(at(100), 1.0, GRACE),
            Step::Breached { since: at(100) }
        );
        assert_eq!(st.rate(), rate);
        assert_eq!(st.failures(), 2);
    }

    #[test]
    fn test_first_failure_without_elapsed_time_is_tolerated() {
        let t0 = Instant::now();
        let mut st = state(t0);
        assert_eq!(st.record_failure(t0, 0.0, Duration::ZERO), Step::Tolerated);
        assert_eq!(st.failures(), 1);
    }

    #[test]
    fn test_zero_limit_opens_breach_on_first_failure_but_grace_applies() {
        let t0 = Instant::now();
        let mut st = state(t0);
        let step = st.record_failure(t0 + Duration::from_secs(10), 0.0, GRACE);
        assert_eq!(step, Step::BreachOpened);
    }

    #[test]
    fn test_zero_grace_gives_up_on_first_breach() {
        let t0 = Instant::now();
        let mut st = state(t0);
        let step = st.record_failure(t0 + Duration::from_millis(10), 1.0, Duration::ZERO);
        assert_eq!(
            step,
            Step::GiveUp {
                since: t0 + Duration::from_millis(10),
                breached_for: Duration::ZERO
            }
        );
        assert!(matches!(
            st.give_up(t0, Duration::ZERO),
            RunError::GaveUp { failures: 1, .. }
        ));
    }
}
