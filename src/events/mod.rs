//! Runtime events: types only.
//!
//! This module groups the event **data model** published by the supervisor
//! while it runs an operation.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//!
//! ## Quick reference
//! - **Publisher**: `Supervisor` (attempts, caught failures, breaches, terminal
//!   outcome) and `SubscriberSet` (subscriber panics).
//! - **Consumers**: user [`Subscribe`](crate::Subscribe) implementations via
//!   [`SubscriberSet`](crate::SubscriberSet).

mod event;

pub use event::{Event, EventKind};
