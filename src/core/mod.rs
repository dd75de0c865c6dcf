//! Runtime core: the supervision loop and its collaborators.
//!
//! The public API from this module is [`Supervisor`] (with its builder and
//! configuration) and the [`Clock`] seam.
//!
//! Internal modules:
//! - [`boundary`]: converts a panic of one attempt into a `CaughtFailure`;
//! - [`breach`]: per-run failure-rate state machine and give-up decision;
//! - [`supervisor`]: the retry loop, logging and event publishing;
//! - [`clock`]: time source and blocking pause (system or manual);
//! - [`config`], [`builder`]: configuration and construction.

pub(crate) mod boundary;
mod breach;
mod builder;
mod clock;
mod config;
mod supervisor;

pub use builder::SupervisorBuilder;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::SupervisorConfig;
pub use supervisor::Supervisor;
