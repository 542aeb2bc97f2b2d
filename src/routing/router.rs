//! The router: registry plus the mutable per-backend state.
//!
//! # Responsibilities
//! - Build registry, health tracker and rate limiter from one config
//! - Route requests through the fallback executor
//! - Expose selection, status and benchmark operations

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::config::RouterConfig;
use crate::error::RouterError;
use crate::health::{HealthPolicy, HealthTracker};
use crate::load_balancer::{BackendView, CapabilitySelector, LoadBalancer, WeightedSelector};
use crate::rate_limit::RateLimiter;
use crate::registry::{BackendId, Registry};
use crate::resilience::FallbackExecutor;
use crate::routing::{RoutingRequest, RoutingResult};
use crate::status::{build_report, run_benchmark, BenchmarkResult, StatusReport};

/// Multi-backend request router. Share it behind an `Arc`.
#[derive(Debug)]
pub struct Router {
    registry: Registry,
    health: HealthTracker,
    limits: RateLimiter,
    attempt_timeout: Duration,
}

impl Router {
    /// Wrap an existing registry, taking thresholds and timeouts from `config`.
    pub fn new(registry: Registry, config: &RouterConfig) -> Self {
        let policy = HealthPolicy {
            failure_threshold: config.health.failure_threshold,
            recovery: Duration::from_secs(config.health.recovery_secs),
            max_samples: config.health.latency_samples,
        };
        let health = HealthTracker::new(registry.names(), policy);
        let limits = RateLimiter::new(registry.limits(), Duration::from_secs(config.rate_limit.window_secs));

        Self {
            registry,
            health,
            limits,
            attempt_timeout: Duration::from_secs(config.timeouts.attempt_secs),
        }
    }

    /// Build from config, reading credentials from the process environment.
    pub fn from_config(config: &RouterConfig) -> Result<Self, RouterError> {
        Self::from_config_with(config, |var| std::env::var(var).ok())
    }

    /// Build from config with a custom credential lookup.
    pub fn from_config_with<F>(config: &RouterConfig, credentials: F) -> Result<Self, RouterError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let registry = Registry::from_config(config, credentials)?;
        Ok(Self::new(registry, config))
    }

    /// Override the per-attempt deadline.
    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn health(&self) -> &HealthTracker {
        &self.health
    }

    pub fn limits(&self) -> &RateLimiter {
        &self.limits
    }

    fn view(&self) -> BackendView<'_> {
        BackendView {
            registry: &self.registry,
            health: &self.health,
            limits: &self.limits,
        }
    }

    fn executor(&self) -> FallbackExecutor<'_> {
        FallbackExecutor::new(&self.registry, &self.health, &self.limits, self.attempt_timeout)
    }

    /// Route a request. Dropping the returned future aborts the in-flight call.
    pub async fn route(&self, request: RoutingRequest) -> RoutingResult {
        self.route_with_cancel(request, &CancellationToken::new()).await
    }

    /// Route a request, stopping as soon as `cancel` fires.
    pub async fn route_with_cancel(&self, request: RoutingRequest, cancel: &CancellationToken) -> RoutingResult {
        self.executor().execute(&request, cancel).await
    }

    /// Lowest-tier healthy backend offering every capability in `required`.
    pub fn select_by_capability(&self, required: &BTreeSet<String>) -> Option<BackendId> {
        CapabilitySelector::new(required.iter().cloned()).next_backend(&self.view())
    }

    /// Weighted random choice among healthy backends.
    pub fn select_weighted(&self) -> Option<BackendId> {
        WeightedSelector::new().next_backend(&self.view())
    }

    pub fn status(&self) -> StatusReport {
        build_report(&self.registry, &self.health, &self.limits)
    }

    pub async fn benchmark(&self, probe: &RoutingRequest) -> BTreeMap<String, BenchmarkResult> {
        run_benchmark(&self.registry, &self.health, &self.limits, probe, self.attempt_timeout).await
    }
}
