//! Routing results and the per-candidate attempt trace.

use serde::{Serialize, Serializer};
use std::time::Duration;
use uuid::Uuid;

/// Outcome of one routed request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RoutingResult {
    Success(RoutedResponse),
    Failure(RoutingFailure),
}

impl RoutingResult {
    pub fn is_success(&self) -> bool {
        matches!(self, RoutingResult::Success(_))
    }

    pub fn attempts(&self) -> &[Attempt] {
        match self {
            RoutingResult::Success(r) => &r.attempts,
            RoutingResult::Failure(f) => &f.attempts,
        }
    }

    pub fn success(&self) -> Option<&RoutedResponse> {
        match self {
            RoutingResult::Success(r) => Some(r),
            RoutingResult::Failure(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&RoutingFailure> {
        match self {
            RoutingResult::Success(_) => None,
            RoutingResult::Failure(f) => Some(f),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutedResponse {
    pub request_id: Uuid,
    pub content: String,
    /// Identity of the backend that answered.
    pub backend: String,
    pub model: String,
    #[serde(rename = "response_time_secs", serialize_with = "as_secs")]
    pub response_time: Duration,
    /// USD.
    pub estimated_cost: f64,
    pub attempts: Vec<Attempt>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutingFailure {
    pub request_id: Uuid,
    pub kind: FailureKind,
    /// Last backend error, or why nothing was attempted.
    pub error: String,
    /// Backends actually called.
    pub attempted: usize,
    pub attempts: Vec<Attempt>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Every candidate was unhealthy, rate limited or incapable.
    NoEligibleBackend,
    /// At least one backend was called and all calls failed.
    Exhausted,
    /// The caller gave up before a backend answered.
    Cancelled,
}

/// What happened to one candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attempt {
    pub backend: String,
    #[serde(flatten)]
    pub outcome: AttemptOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AttemptOutcome {
    Succeeded,
    Failed { error: String },
    SkippedUnhealthy,
    SkippedRateLimited,
    Cancelled,
}

impl Attempt {
    pub(crate) fn new(backend: &str, outcome: AttemptOutcome) -> Self {
        Self {
            backend: backend.to_string(),
            outcome,
        }
    }

    /// True if the backend was actually called.
    pub fn was_called(&self) -> bool {
        matches!(
            self.outcome,
            AttemptOutcome::Succeeded | AttemptOutcome::Failed { .. } | AttemptOutcome::Cancelled
        )
    }
}

fn as_secs<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}
