use std::sync::Arc;

use super::{
    clock::{Clock, SystemClock},
    config::SupervisorConfig,
    supervisor::Supervisor,
};
use crate::{
    error::ConfigError,
    rate::{RateTracker, TrackerFactory, ewma_factory},
    subscribers::{Subscribe, SubscriberSet},
};

/// Builder for constructing a [`Supervisor`] with optional collaborators.
pub struct SupervisorBuilder {
    cfg: SupervisorConfig,
    name: Arc<str>,
    subscribers: Vec<Arc<dyn Subscribe>>,
    clock: Arc<dyn Clock>,
    tracker: TrackerFactory,
}

impl SupervisorBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: SupervisorConfig) -> Self {
        Self {
            cfg,
            name: Arc::from("robustvisor"),
            subscribers: Vec::new(),
            clock: Arc::new(SystemClock),
            tracker: ewma_factory(),
        }
    }

    /// Sets the name used in the tracing span and in every event.
    pub fn with_name(mut self, name: impl Into<Arc<str>>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive lifecycle events (attempts, caught panics, breaches,
    /// terminal outcome) synchronously, between attempts.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Replaces the time source of the blocking runner.
    ///
    /// Use [`ManualClock`](crate::ManualClock) in tests to simulate elapsed time.
    /// The async runner always uses the tokio timer.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replaces the failure-rate estimator.
    ///
    /// `factory` is called once per run with the averaging window in seconds
    /// (the grace period) and must return a fresh tracker.
    pub fn with_rate_tracker<F, T>(mut self, factory: F) -> Self
    where
        F: Fn(f64) -> T + Send + Sync + 'static,
        T: RateTracker + 'static,
    {
        self.tracker = Arc::new(move |window| Box::new(factory(window)) as Box<dyn RateTracker>);
        self
    }

    /// Validates the configuration and returns the Supervisor instance.
    pub fn build(self) -> Result<Supervisor, ConfigError> {
        self.cfg.validate()?;
        Ok(Supervisor::new_internal(
            self.cfg,
            self.name,
            SubscriberSet::new(self.subscribers),
            self.clock,
            self.tracker,
        ))
    }
}
