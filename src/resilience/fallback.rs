//! Ordered fallback execution.
//!
//! # States
//! ```text
//! CANDIDATE_SELECTION → ATTEMPT → SUCCESS
//!                          ↓
//!                    NEXT_CANDIDATE → ATTEMPT → ... → EXHAUSTED
//! ```
//!
//! # Design Decisions
//! - Single pass over the candidates; no automatic re-runs
//! - Unhealthy and rate-limited candidates are skipped, not counted as failures
//! - Cancellation aborts the in-flight call and ends the pass without
//!   penalising the backend

use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

use crate::client::CompletionRequest;
use crate::health::{HealthTracker, Outcome};
use crate::observability::metrics;
use crate::rate_limit::RateLimiter;
use crate::registry::{estimate_units, BackendId, Registry};
use crate::resilience::timeouts::with_deadline;
use crate::routing::{Attempt, AttemptOutcome, FailureKind, RoutedResponse, RoutingFailure, RoutingRequest, RoutingResult};

/// Executes one request against an ordered list of candidates.
#[derive(Debug, Clone, Copy)]
pub struct FallbackExecutor<'a> {
    registry: &'a Registry,
    health: &'a HealthTracker,
    limits: &'a RateLimiter,
    attempt_timeout: Duration,
}

impl<'a> FallbackExecutor<'a> {
    pub fn new(registry: &'a Registry, health: &'a HealthTracker, limits: &'a RateLimiter, attempt_timeout: Duration) -> Self {
        Self {
            registry,
            health,
            limits,
            attempt_timeout,
        }
    }

    /// Preferred backend first (if configured), then ascending tier with
    /// registry order as tiebreak. Backends lacking a required capability are
    /// dropped.
    pub fn candidates(&self, request: &RoutingRequest) -> Vec<BackendId> {
        let preferred = request.preferred.as_deref().and_then(|name| {
            let id = self.registry.lookup(name);
            if id.is_none() {
                tracing::debug!(request_id = %request.id, preferred = %name, "Preferred backend not configured, ignoring");
            }
            id
        });

        let mut order: Vec<BackendId> = preferred.into_iter().collect();
        order.extend(self.registry.by_tier().into_iter().filter(|id| Some(*id) != preferred));
        order.retain(|id| {
            self.registry
                .get_config(*id)
                .is_some_and(|config| config.supports(&request.capabilities))
        });
        order
    }

    pub async fn execute(&self, request: &RoutingRequest, cancel: &CancellationToken) -> RoutingResult {
        let candidates = self.candidates(request);
        if candidates.is_empty() {
            let error = format!(
                "no configured backend offers capabilities {:?}",
                request.capabilities
            );
            tracing::warn!(request_id = %request.id, %error, "No candidate backends");
            return self.fail(request, FailureKind::NoEligibleBackend, error, 0, Vec::new());
        }

        let mut attempts = Vec::with_capacity(candidates.len());
        let mut attempted = 0;
        let mut last_error: Option<String> = None;

        for id in candidates {
            if cancel.is_cancelled() {
                return self.cancelled(request, attempted, attempts);
            }
            let Some(backend) = self.registry.get(id) else {
                continue;
            };
            let name = backend.name();

            if !self.health.is_healthy(id) {
                tracing::debug!(request_id = %request.id, backend = %name, "Skipping unhealthy backend");
                attempts.push(Attempt::new(name, AttemptOutcome::SkippedUnhealthy));
                continue;
            }
            if !self.limits.try_admit(id) {
                tracing::debug!(request_id = %request.id, backend = %name, "Skipping rate-limited backend");
                metrics::record_rate_limited(name);
                attempts.push(Attempt::new(name, AttemptOutcome::SkippedRateLimited));
                continue;
            }

            attempted += 1;
            let call = CompletionRequest {
                prompt: request.prompt.clone(),
                model: backend.config.model.clone(),
                max_tokens: request.output_budget(backend.config.max_output_tokens),
            };

            tracing::debug!(request_id = %request.id, backend = %name, attempt = attempted, "Attempting backend");
            let started = Instant::now();
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                result = with_deadline(self.attempt_timeout, backend.client.complete(&call)) => Some(result),
            };
            let elapsed = started.elapsed();

            match result {
                None => {
                    metrics::record_attempt(name, "cancelled", elapsed);
                    attempts.push(Attempt::new(name, AttemptOutcome::Cancelled));
                    return self.cancelled(request, attempted, attempts);
                }
                Some(Ok(completion)) => {
                    self.health.record_outcome(id, Outcome::Success { response_time: elapsed });
                    metrics::record_attempt(name, "success", elapsed);
                    metrics::record_request("success");
                    attempts.push(Attempt::new(name, AttemptOutcome::Succeeded));

                    let units = estimate_units(&request.prompt, &completion.content);
                    tracing::info!(
                        request_id = %request.id,
                        backend = %name,
                        elapsed_ms = elapsed.as_millis() as u64,
                        attempted,
                        "Request routed"
                    );
                    return RoutingResult::Success(RoutedResponse {
                        request_id: request.id,
                        model: completion.model.unwrap_or_else(|| backend.config.model.clone()),
                        content: completion.content,
                        backend: name.to_string(),
                        response_time: elapsed,
                        estimated_cost: backend.config.estimate_cost(units),
                        attempts,
                    });
                }
                Some(Err(e)) => {
                    let error = e.to_string();
                    tracing::warn!(request_id = %request.id, backend = %name, error = %error, "Backend attempt failed");
                    self.health.record_outcome(id, Outcome::Failure { error: &error });
                    metrics::record_attempt(name, "failure", elapsed);
                    attempts.push(Attempt::new(name, AttemptOutcome::Failed { error: error.clone() }));
                    last_error = Some(error);
                }
            }
        }

        match last_error {
            Some(error) => {
                tracing::warn!(request_id = %request.id, attempted, error = %error, "All candidate backends failed");
                self.fail(request, FailureKind::Exhausted, error, attempted, attempts)
            }
            None => {
                let error = "all candidate backends are unhealthy or rate limited".to_string();
                tracing::warn!(request_id = %request.id, "No eligible backend");
                self.fail(request, FailureKind::NoEligibleBackend, error, attempted, attempts)
            }
        }
    }

    fn cancelled(&self, request: &RoutingRequest, attempted: usize, attempts: Vec<Attempt>) -> RoutingResult {
        tracing::info!(request_id = %request.id, attempted, "Request cancelled by caller");
        self.fail(request, FailureKind::Cancelled, "request cancelled by caller".to_string(), attempted, attempts)
    }

    fn fail(
        &self,
        request: &RoutingRequest,
        kind: FailureKind,
        error: String,
        attempted: usize,
        attempts: Vec<Attempt>,
    ) -> RoutingResult {
        metrics::record_request(match kind {
            FailureKind::NoEligibleBackend => "no_eligible_backend",
            FailureKind::Exhausted => "exhausted",
            FailureKind::Cancelled => "cancelled",
        });
        RoutingResult::Failure(RoutingFailure {
            request_id: request.id,
            kind,
            error,
            attempted,
            attempts,
        })
    }
}
