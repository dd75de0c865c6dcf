//! Error types used by the robustvisor runtime.
//!
//! This module defines the failures a caller can observe:
//!
//! - [`CaughtFailure`]: one panic of one attempt, recovered by the supervisor.
//! - [`RunError`]: the run gave up because failures came in too fast for too long.
//! - [`ConfigError`]: a [`SupervisorConfig`](crate::SupervisorConfig) was rejected before any run.
//!
//! All types provide helper methods (`as_label`, `as_message`) for logging/metrics.

use std::time::{Duration, Instant};
use thiserror::Error;

/// # A panic caught at the fault boundary.
///
/// Produced once per panicking attempt. The supervisor counts it, reports it to
/// subscribers and logs, then retries; it is never returned from
/// [`Supervisor::run`](crate::Supervisor::run).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("panicked: {message}")]
pub struct CaughtFailure {
    /// Panic payload rendered as text (`"unknown panic"` for non-string payloads).
    pub message: String,
    /// Source location of the panic (`file:line:col`), when the panic hook saw it.
    pub location: Option<String>,
    /// Backtrace captured at the panic site; only set with `capture_diagnostics`.
    pub backtrace: Option<String>,
}

impl CaughtFailure {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        "caught_panic"
    }

    /// Returns a human-readable message with the panic location, if known.
    pub fn as_message(&self) -> String {
        match &self.location {
            Some(at) => format!("panic at {at}: {}", self.message),
            None => format!("panic: {}", self.message),
        }
    }
}

/// # Errors that end a supervised run.
///
/// Surfacing this error means the operation kept failing above the rate limit
/// for longer than the grace period; the run stopped without further attempts.
#[non_exhaustive]
#[derive(Error, Debug, Clone)]
pub enum RunError {
    /// The failure rate stayed above the limit for the whole grace period.
    #[error("giving up after {failures} failures at {rate:.2}/sec; above the limit for {breached_for:?}")]
    GaveUp {
        /// Total panics caught during the run, including the last one.
        failures: u64,
        /// Failure-rate estimate (failures/second) at the moment of giving up.
        rate: f64,
        /// When the rate last crossed above the limit.
        since: Instant,
        /// How long the rate had been above the limit.
        breached_for: Duration,
    },
}

impl RunError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use robustvisor::RunError;
    /// use std::time::{Duration, Instant};
    ///
    /// let err = RunError::GaveUp {
    ///     failures: 5,
    ///     rate: 3.3,
    ///     since: Instant::now(),
    ///     breached_for: Duration::from_secs(1),
    /// };
    /// assert_eq!(err.as_label(), "run_gave_up");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RunError::GaveUp { .. } => "run_gave_up",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RunError::GaveUp {
                failures,
                rate,
                breached_for,
                ..
            } => format!("gave up: failures={failures} rate={rate:.2}/s breached_for={breached_for:?}"),
        }
    }

    /// Number of panics caught before the run ended.
    pub fn failures(&self) -> u64 {
        match self {
            RunError::GaveUp { failures, .. } => *failures,
        }
    }
}

/// # Errors produced while validating a configuration.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The rate limit must be a finite number `>= 0`.
    #[error("rate limit must be a finite number >= 0, got {value}")]
    InvalidRateLimit {
        /// The rejected value.
        value: f64,
    },
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::InvalidRateLimit { .. } => "config_invalid_rate_limit",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gave_up_display_mentions_counters() {
        let err = RunError::GaveUp {
            failures: 7,
            rate: 3.333,
            since: Instant::now(),
            breached_for: Duration::from_millis(1200),
        };
        let text = err.to_string();
        assert!(text.contains("7 failures"), "{text}");
        assert!(text.contains("3.33/sec"), "{text}");
        assert_eq!(err.failures(), 7);
    }

    #[test]
    fn test_caught_failure_message_with_location() {
        let f = CaughtFailure {
            message: "boom".into(),
            location: Some("src/lib.rs:1:1".into()),
            backtrace: None,
        };
        assert_eq!(f.as_message(), "panic at src/lib.rs:1:1: boom");
        assert_eq!(f.to_string(), "panicked: boom");
    }

    #[test]
    fn test_config_error_label() {
        let err = ConfigError::InvalidRateLimit { value: -1.0 };
        assert_eq!(err.as_label(), "config_invalid_rate_limit");
        assert!(err.to_string().contains("-1"));
    }
}
