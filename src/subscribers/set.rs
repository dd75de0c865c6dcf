//! # Event fan-out to multiple subscribers.
//!
//! Provides [`SubscriberSet`]: delivers each event to every subscriber in
//! registration order, isolating panics.
//!
//! ## Architecture
//! ```text
//! emit(event)
//!     │
//!     ├──► boundary ──► subscriber1.on_event()
//!     │        └──────► panic → SubscriberPanicked (to the others)
//!     ├──► boundary ──► subscriber2.on_event()
//!     └──► boundary ──► subscriberN.on_event()
//! ```
//!
//! ## Rules
//! - **Synchronous**: `emit()` returns after every subscriber has seen the event
//! - **Isolation**: a panicking subscriber doesn't affect others or the run
//! - **No loops**: a panic while handling `SubscriberPanicked` is only logged

use std::sync::Arc;

use crate::core::boundary;
use crate::events::Event;
use crate::subscribers::Subscribe;

/// Fan-out coordinator for multiple event subscribers.
#[derive(Clone, Default)]
pub struct SubscriberSet {
    subs: Vec<Arc<dyn Subscribe>>,
}

impl SubscriberSet {
    /// Creates a new set.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>) -> Self {
        Self { subs }
    }

    /// Returns `true` if there is nobody to deliver events to.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.subs.is_empty()
    }

    /// Number of registered subscribers.
    #[inline]
    pub fn len(&self) -> usize {
        self.subs.len()
    }

    /// Delivers `event` to all subscribers.
    ///
    /// A subscriber that panics is reported to the remaining subscribers with
    /// a `SubscriberPanicked` event; it still receives later events.
    pub fn emit(&self, event: &Event) {
        let mut panicked = Vec::new();
        for sub in &self.subs {
            if let Err(failure) = boundary::catch(false, || sub.on_event(event)) {
                tracing::warn!(
                    subscriber = sub.name(),
                    panic = %failure.message,
                    "subscriber panicked"
                );
                if !event.is_subscriber_panic() {
                    panicked.push(Event::subscriber_panicked(sub.name(), failure.message));
                }
            }
        }
        for ev in &panicked {
            self.emit(ev);
        }
    }
}
