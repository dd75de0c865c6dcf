//! # Exponentially weighted moving average.
//!
//! The smoothing factor is derived from the window (in samples-as-seconds):
//! `alpha = 2 / (window + 1)`, clamped to `(0, 1]`. A one-second window gives
//! `alpha = 1`, i.e. the estimate equals the latest sample; longer windows
//! smooth more. The first sample seeds the average instead of being blended
//! with zero.
//!
//! # Example
//! ```rust
//! use robustvisor::{Ewma, RateTracker};
//!
//! let mut avg = Ewma::new(3.0); // alpha = 0.5
//! avg.add(4.0);
//! assert_eq!(avg.value(), 4.0);
//! avg.add(2.0);
//! assert_eq!(avg.value(), 3.0);
//! ```

use super::RateTracker;

/// Exponentially weighted moving average.
#[derive(Clone, Debug)]
pub struct Ewma {
    alpha: f64,
    value: f64,
    samples: u64,
}

impl Ewma {
    /// Creates an average whose smoothing factor is derived from `window`.
    ///
    /// Non-finite or negative windows fall back to `alpha = 1` (no smoothing).
    pub fn new(window: f64) -> Self {
        let alpha = if window.is_finite() && window > 0.0 {
            (2.0 / (window + 1.0)).min(1.0)
        } else {
            1.0
        };
        Self {
            alpha,
            value: 0.0,
            samples: 0,
        }
    }

    /// Smoothing factor in `(0, 1]`.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Number of samples added so far.
    pub fn samples(&self) -> u64 {
        self.samples
    }
}

impl RateTracker for Ewma {
    fn add(&mut self, sample: f64) {
        if self.samples == 0 {
            self.value = sample;
        } else {
            self.value = self.alpha.mul_add(sample, (1.0 - self.alpha) * self.value);
        }
        self.samples += 1;
    }

    fn value(&self) -> f64 {
        self.value
    }
}
