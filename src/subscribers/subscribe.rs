//! # Event subscriber trait.
//!
//! Provides [`Subscribe`] an extension point for plugging custom event handlers into the runtime.
//!
//! ## Rules
//! - Subscribers are called **synchronously**, on the supervising thread, in
//!   registration order; a slow subscriber slows the run down.
//! - A panicking subscriber is isolated: the panic is caught and reported to the
//!   other subscribers as `EventKind::SubscriberPanicked`; the run continues.
//! - Subscribers are observers only. Nothing they do changes retry or give-up decisions.
//!
//! ## Example
//! ```rust
//! use std::sync::atomic::{AtomicU64, Ordering};
//! use robustvisor::{Subscribe, Event, EventKind};
//!
//! #[derive(Default)]
//! struct PanicCounter(AtomicU64);
//!
//! impl Subscribe for PanicCounter {
//!     fn on_event(&self, ev: &Event) {
//!         if matches!(ev.kind, EventKind::FailureCaught) {
//!             self.0.fetch_add(1, Ordering::Relaxed);
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "panic-counter" }
//! }
//! ```

use crate::events::Event;

/// Event subscriber for runtime observability.
///
/// ### Implementation requirements
/// - Keep `on_event` short; it runs inline between attempts.
/// - Handle errors internally; do not panic.
pub trait Subscribe: Send + Sync + 'static {
    /// Processes a single event.
    ///
    /// Panics are caught; the runtime publishes `EventKind::SubscriberPanicked`.
    fn on_event(&self, event: &Event);

    /// Returns the subscriber name used in logs and panic events.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose - override it when possible.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
