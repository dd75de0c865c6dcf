//! Retry policies.
//!
//! This module groups the knobs that control **how long** to wait between
//! attempts once an attempt has panicked.
//!
//! ## Contents
//! - [`JitterPolicy`] randomization applied to the fixed retry delay
//!
//! ## Quick wiring
//! ```text
//! SupervisorConfig { retry_delay, jitter, .. }
//!      └─► Supervisor uses jitter.apply(retry_delay) before every retry
//! ```
//!
//! ## Defaults
//! - `retry_delay = 0` (retry immediately, no pause at all).
//! - `JitterPolicy::None`.

mod jitter;

pub use jitter::JitterPolicy;
