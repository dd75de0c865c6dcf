//! # Event subscribers for the robustvisor runtime.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out
//! and the optional built-in [`LogWriter`].
//!
//! ## Architecture
//! ```text
//! Supervisor ── emit(Event) ──► SubscriberSet ──► Subscribe::on_event(&Event)
//!                                                      │
//!                                     ┌────────────────┼────────────┐
//!                                     ▼                ▼            ▼
//!                                 LogWriter         Metrics       Custom
//! ```

mod set;
mod subscribe;

#[cfg(feature = "logging")]
mod log;

pub use set::SubscriberSet;
pub use subscribe::Subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
