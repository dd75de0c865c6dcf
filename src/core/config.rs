//! # Supervisor configuration.
//!
//! Provides [`SupervisorConfig`] the settings for one supervisor: how many
//! failures per second are tolerated, for how long a higher rate is allowed to
//! last, and how to pause between attempts.
//!
//! ## Sentinel values
//! - `retry_delay = 0s` → retry immediately (no pause at all)
//! - `rate_limit = 0.0` → any sustained failing breaches; the grace period still applies
//! - `grace = 0s` → give up on the first failure that puts the rate above the limit
//!
//! ## Serialized form (feature `serde`)
//! Every field is optional; durations use humantime strings.
//! ```text
//! { "rate_limit": 2.5, "grace": "10s", "retry_delay": "250ms", "jitter": "equal" }
//! ```

use std::time::Duration;

use crate::{error::ConfigError, policies::JitterPolicy};

/// Configuration of a [`Supervisor`](crate::Supervisor).
///
/// ## Field semantics
/// - `rate_limit`: Maximum tolerated failures per second (finite, `>= 0`)
/// - `grace`: How long the rate may stay above `rate_limit` before giving up;
///   also the averaging window of the rate estimate
/// - `retry_delay`: Pause before every attempt but the first (`0s` = none)
/// - `jitter`: Randomization applied to `retry_delay`
/// - `capture_diagnostics`: Capture a backtrace at each panic site and log it
///
/// ## Notes
/// All fields are public for flexibility. Prefer using helper accessors to avoid
/// sprinkling sentinel checks (`0`) across the codebase.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct SupervisorConfig {
    /// Maximum tolerated failure rate, in failures per second.
    pub rate_limit: f64,

    /// How long the failure rate may stay above `rate_limit` before the run gives up.
    #[cfg_attr(feature = "serde", serde(with = "humantime_serde"))]
    pub grace: Duration,

    /// Fixed pause inserted before each retry.
    #[cfg_attr(feature = "serde", serde(with = "humantime_serde"))]
    pub retry_delay: Duration,

    /// Randomization of the retry pause.
    pub jitter: JitterPolicy,

    /// Whether to capture and log a backtrace for every caught panic.
    pub capture_diagnostics: bool,
}

impl SupervisorConfig {
    /// Returns the retry pause as an `Option`.
    ///
    /// - `None` → retry immediately
    /// - `Some(d)` → pause `d` (before jitter) ahead of each retry
    #[inline]
    pub fn retry_delay(&self) -> Option<Duration> {
        if self.retry_delay.is_zero() {
            None
        } else {
            Some(self.retry_delay)
        }
    }

    /// Averaging window of the failure-rate estimate, in seconds.
    ///
    /// Tied to the grace period so that the estimate reflects roughly the most
    /// recent grace period.
    #[inline]
    pub fn rate_window_secs(&self) -> f64 {
        self.grace.as_secs_f64()
    }

    /// Checks that the configuration can drive a run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.rate_limit.is_finite() || self.rate_limit < 0.0 {
            return Err(ConfigError::InvalidRateLimit {
                value: self.rate_limit,
            });
        }
        Ok(())
    }
}

impl Default for SupervisorConfig {
    /// Default configuration:
    ///
    /// - `rate_limit = 1.0` failure per second
    /// - `grace = 1s`
    /// - `retry_delay = 0s` (no pause)
    /// - `jitter = JitterPolicy::None`
    /// - `capture_diagnostics = false`
    fn default() -> Self {
        Self {
            rate_limit: 1.0,
            grace: Duration::from_secs(1),
            retry_delay: Duration::ZERO,
            jitter: JitterPolicy::None,
            capture_diagnostics: false,
        }
    }
}
