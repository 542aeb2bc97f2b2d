//! Benchmark pass: one probe request against every backend.
//!
//! Not part of the routing path. Health and rate windows are updated with the
//! results but never consulted, so unhealthy or saturated backends are probed
//! too.

use serde::Serialize;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use crate::client::CompletionRequest;
use crate::health::{HealthTracker, Outcome};
use crate::rate_limit::RateLimiter;
use crate::registry::{estimate_units, Registry};
use crate::resilience::timeouts::with_deadline;
use crate::routing::RoutingRequest;

/// Default probe prompt.
pub const DEFAULT_PROBE: &str = "Reply with the single word: pong";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkResult {
    pub success: bool,
    pub model: String,
    pub response_time_secs: f64,
    /// Characters in the response.
    pub response_size: usize,
    pub estimated_cost: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Probe every backend sequentially, in registry order.
pub async fn run_benchmark(
    registry: &Registry,
    health: &HealthTracker,
    limits: &RateLimiter,
    probe: &RoutingRequest,
    attempt_timeout: Duration,
) -> BTreeMap<String, BenchmarkResult> {
    let mut results = BTreeMap::new();

    for backend in registry.list_backends() {
        let config = &backend.config;
        let call = CompletionRequest {
            prompt: probe.prompt.clone(),
            model: config.model.clone(),
            max_tokens: probe.output_budget(config.max_output_tokens),
        };

        limits.record(backend.id);
        let started = Instant::now();
        let outcome = with_deadline(attempt_timeout, backend.client.complete(&call)).await;
        let elapsed = started.elapsed();

        let result = match outcome {
            Ok(completion) => {
                health.record_outcome(backend.id, Outcome::Success { response_time: elapsed });
                let units = estimate_units(&probe.prompt, &completion.content);
                BenchmarkResult {
                    success: true,
                    model: completion.model.unwrap_or_else(|| config.model.clone()),
                    response_time_secs: elapsed.as_secs_f64(),
                    response_size: completion.content.chars().count(),
                    estimated_cost: config.estimate_cost(units),
                    error: None,
                }
            }
            Err(e) => {
                let error = e.to_string();
                health.record_outcome(backend.id, Outcome::Failure { error: &error });
                BenchmarkResult {
                    success: false,
                    model: config.model.clone(),
                    response_time_secs: elapsed.as_secs_f64(),
                    response_size: 0,
                    estimated_cost: 0.0,
                    error: Some(error),
                }
            }
        };

        tracing::info!(
            backend = %config.name,
            success = result.success,
            response_time_secs = result.response_time_secs,
            "Benchmark probe finished"
        );
        results.insert(config.name.clone(), result);
    }

    results
}
