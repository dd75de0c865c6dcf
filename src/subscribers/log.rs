//! # LogWriter: event-to-`tracing` bridge
//!
//! A minimal subscriber that renders each incoming [`Event`] as one `tracing`
//! record. Install any `tracing` subscriber (e.g. `tracing-subscriber`'s fmt
//! layer) to see the output.
//!
//! ## Example output
//! ```text
//! [starting] name="worker" attempt=1
//! [failed] name="worker" attempt=1 failures=1 rate=0.50/s err="index out of bounds" at="src/job.rs:12:9"
//! [breach-opened] name="worker" failures=4 rate=3.33/s
//! [retry] name="worker" delay=250ms after_attempt=4
//! [gave-up] name="worker" failures=8 rate=3.33/s reason="..."
//! [completed] name="worker" attempt=5 failures=4
//! ```

use tracing::{error, info, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Subscribe for LogWriter {
    fn on_event(&self, e: &Event) {
        let label = e.kind.as_label();
        let name = e.name.as_deref().unwrap_or("-");
        match e.kind {
            EventKind::AttemptStarting => {
                info!("[{label}] name={name:?} attempt={:?}", e.attempt);
            }
            EventKind::FailureCaught => match &e.backtrace {
                Some(bt) => warn!(
                    "[{label}] name={name:?} attempt={:?} failures={:?} rate={} err={:?} at={:?}\n{bt}",
                    e.attempt,
                    e.failures,
                    rate(e),
                    e.reason,
                    e.location
                ),
                None => warn!(
                    "[{label}] name={name:?} attempt={:?} failures={:?} rate={} err={:?} at={:?}",
                    e.attempt,
                    e.failures,
                    rate(e),
                    e.reason,
                    e.location
                ),
            },
            EventKind::RetryScheduled => {
                info!(
                    "[{label}] name={name:?} delay={:?} after_attempt={:?}",
                    e.delay(),
                    e.attempt
                );
            }
            EventKind::BreachOpened | EventKind::BreachCleared => {
                info!(
                    "[{label}] name={name:?} failures={:?} rate={}",
                    e.failures,
                    rate(e)
                );
            }
            EventKind::Completed => {
                info!(
                    "[{label}] name={name:?} attempt={:?} failures={:?}",
                    e.attempt, e.failures
                );
            }
            EventKind::GaveUp => {
                error!(
                    "[{label}] name={name:?} failures={:?} rate={} reason={:?}",
                    e.failures,
                    rate(e),
                    e.reason
                );
            }
            EventKind::RateLimitZero => {
                warn!("[{label}] name={name:?} reason={:?}", e.reason);
            }
            EventKind::SubscriberPanicked => {
                warn!(
                    "[{label}] subscriber={name} info={}",
                    e.reason.as_deref().unwrap_or("unknown")
                );
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}

fn rate(e: &Event) -> String {
    match e.rate {
        Some(r) => format!("{r:.2}/s"),
        None => "-".to_string(),
    }
}
