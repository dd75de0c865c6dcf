//! # Jitter policy for the retry delay.
//!
//! [`JitterPolicy`] adds randomness to the fixed retry delay so that several
//! independently supervised operations failing together do not restart in lockstep.
//!
//! - [`JitterPolicy::None`]: no randomization, the exact retry delay (default)
//! - [`JitterPolicy::Full`]: random delay in [0, retry_delay]
//! - [`JitterPolicy::Equal`]: delay = retry_delay/2 + random[0, retry_delay/2]

use rand::Rng;
use std::time::Duration;

/// Policy controlling randomization of retry delays.
///
/// ## Trade-offs
/// - **None**: Predictable; the failure-rate estimate sees the configured pause exactly
/// - **Full**: Maximum spreading, but may retry almost immediately
/// - **Equal**: Keeps at least half of the configured pause
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum JitterPolicy {
    /// No jitter: use the exact retry delay.
    #[default]
    None,

    /// Full jitter: random delay in [0, retry_delay].
    Full,

    /// Equal jitter: delay = retry_delay/2 + random[0, retry_delay/2].
    Equal,
}

impl JitterPolicy {
    /// Applies jitter to the given delay.
    pub fn apply(&self, delay: Duration) -> Duration {
        match self {
            JitterPolicy::None => delay,
            JitterPolicy::Full => full_jitter(delay),
            JitterPolicy::Equal => equal_jitter(delay),
        }
    }
}

/// Full jitter: random[0, delay]
fn full_jitter(delay: Duration) -> Duration {
    let ms = delay.as_millis() as u64;
    if ms == 0 {
        return delay;
    }
    Duration::from_millis(rand::rng().random_range(0..=ms))
}

/// Equal jitter: delay/2 + random[0, delay/2]
fn equal_jitter(delay: Duration) -> Duration {
    let ms = delay.as_millis() as u64;
    if ms == 0 {
        return delay;
    }
    let half = ms / 2;
    let jitter = if half == 0 {
        0
    } else {
        rand::rng().random_range(0..=half)
    };
    Duration::from_millis(half + jitter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_is_identity() {
        let d = Duration::from_millis(250);
        assert_eq!(JitterPolicy::None.apply(d), d);
    }

    #[test]
    fn test_full_jitter_bounds() {
        let d = Duration::from_millis(1000);
        for _ in 0..50 {
            assert!(JitterPolicy::Full.apply(d) <= d);
        }
    }

    #[test]
    fn test_equal_jitter_bounds() {
        let d = Duration::from_millis(1000);
        for _ in 0..50 {
            let delay = JitterPolicy::Equal.apply(d);
            assert!(delay >= Duration::from_millis(500), "{delay:?} below half");
            assert!(delay <= d, "{delay:?} above base");
        }
    }

    #[test]
    fn test_sub_millisecond_delay_is_kept() {
        let d = Duration::from_micros(300);
        assert_eq!(JitterPolicy::Full.apply(d), d);
        assert_eq!(JitterPolicy::Equal.apply(d), d);
    }
}
