//! Failure-rate estimation.
//!
//! The supervisor turns the time between consecutive failures into an
//! instantaneous rate (`1 / elapsed`) and feeds it into a [`RateTracker`].
//! The tracker's smoothed value is what gets compared against the rate limit.
//!
//! ## Contents
//! - [`RateTracker`] the moving-average seam (add a sample, read the value)
//! - [`Ewma`] default exponentially weighted moving average
//! - [`TrackerFactory`] builds a fresh tracker per run from a window in seconds
//!
//! ## Window
//! The window handed to the factory equals the grace period in seconds, so the
//! average roughly covers the most recent grace period.

mod ewma;

use std::sync::Arc;

pub use ewma::Ewma;

/// Moving average over failure-rate samples (failures/second).
///
/// One tracker is created per run and owned exclusively by it.
pub trait RateTracker: Send {
    /// Feeds one instantaneous rate sample.
    fn add(&mut self, sample: f64);

    /// Returns the current smoothed value; `0.0` before any sample.
    fn value(&self) -> f64;
}

/// Builds a tracker for a window size given in seconds.
pub type TrackerFactory = Arc<dyn Fn(f64) -> Box<dyn RateTracker> + Send + Sync>;

/// Returns the factory producing [`Ewma`] trackers.
pub(crate) fn ewma_factory() -> TrackerFactory {
    Arc::new(|window: f64| Box::new(Ewma::new(window)) as Box<dyn RateTracker>)
}
