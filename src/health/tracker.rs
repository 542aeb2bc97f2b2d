//! Passive health tracking.
//!
//! # Responsibilities
//! - Observe attempt outcomes reported by the fallback executor
//! - Track consecutive failures and response times per backend
//! - Apply half-open recovery when asked whether a backend is healthy
//!
//! # Design Decisions
//! - One mutex per backend; no cross-backend locking
//! - Timeouts are failures
//! - `is_healthy` may mutate (half-open recovery), so it is not a pure read

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use crate::health::state::{HealthPolicy, HealthState, Outcome, Transition};
use crate::observability::metrics;
use crate::registry::BackendId;

/// Read-only copy of a backend's health.
#[derive(Debug, Clone, PartialEq)]
pub struct HealthSnapshot {
    pub healthy: bool,
    pub consecutive_failures: u32,
    pub last_success: Instant,
    pub last_failure: Option<Instant>,
    pub average_response_time: f64,
    pub samples: usize,
}

/// Health state for every backend in a registry, indexed by `BackendId`.
#[derive(Debug)]
pub struct HealthTracker {
    names: Vec<String>,
    entries: Vec<Mutex<HealthState>>,
    policy: HealthPolicy,
}

impl HealthTracker {
    /// One healthy entry per name, in registry order.
    pub fn new(names: Vec<String>, policy: HealthPolicy) -> Self {
        let now = Instant::now();
        let entries = names.iter().map(|_| Mutex::new(HealthState::new(now))).collect();
        Self { names, entries, policy }
    }

    pub fn policy(&self) -> &HealthPolicy {
        &self.policy
    }

    pub fn record_outcome(&self, id: BackendId, outcome: Outcome<'_>) {
        self.record_outcome_at(id, outcome, Instant::now());
    }

    pub fn record_outcome_at(&self, id: BackendId, outcome: Outcome<'_>, now: Instant) {
        let transition = self.lock(id).apply(outcome, &self.policy, now);
        let name = &self.names[id.index()];

        match (transition, outcome) {
            (Some(Transition::BecameUnhealthy), Outcome::Failure { error }) => {
                tracing::warn!(
                    backend = %name,
                    threshold = self.policy.failure_threshold,
                    error = %error,
                    "Backend marked unhealthy"
                );
                metrics::record_backend_health(name, false);
            }
            (Some(Transition::Recovered), _) => {
                tracing::info!(backend = %name, "Backend healthy again after success");
                metrics::record_backend_health(name, true);
            }
            _ => {}
        }
    }

    pub fn is_healthy(&self, id: BackendId) -> bool {
        self.is_healthy_at(id, Instant::now())
    }

    pub fn is_healthy_at(&self, id: BackendId, now: Instant) -> bool {
        let (healthy, transition) = self.lock(id).check(&self.policy, now);
        if transition == Some(Transition::Recovered) {
            let name = &self.names[id.index()];
            tracing::info!(
                backend = %name,
                recovery_secs = self.policy.recovery.as_secs(),
                "Recovery window elapsed, backend eligible again"
            );
            metrics::record_backend_health(name, true);
        }
        healthy
    }

    /// Copy of the stored state without applying half-open recovery.
    pub fn snapshot(&self, id: BackendId) -> HealthSnapshot {
        let state = self.lock(id);
        HealthSnapshot {
            healthy: state.healthy,
            consecutive_failures: state.consecutive_failures,
            last_success: state.last_success,
            last_failure: state.last_failure,
            average_response_time: state.average_response_time(),
            samples: state.sample_count(),
        }
    }

    fn lock(&self, id: BackendId) -> MutexGuard<'_, HealthState> {
        self.entries[id.index()].lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn tracker(n: usize) -> HealthTracker {
        HealthTracker::new((0..n).map(|i| format!("b{}", i)).collect(), HealthPolicy::default())
    }

    #[test]
    fn test_backends_are_independent() {
        let tracker = tracker(2);
        let (a, b) = (BackendId(0), BackendId(1));
        for _ in 0..3 {
            tracker.record_outcome(a, Outcome::Failure { error: "503" });
        }
        assert!(!tracker.is_healthy(a));
        assert!(tracker.is_healthy(b));
    }

    #[test]
    fn test_recovery_via_is_healthy() {
        let tracker = tracker(1);
        let id = BackendId(0);
        let t0 = Instant::now();
        for _ in 0..3 {
            tracker.record_outcome_at(id, Outcome::Failure { error: "timeout" }, t0);
        }
        assert!(!tracker.is_healthy_at(id, t0 + Duration::from_secs(60)));
        assert!(!tracker.snapshot(id).healthy);

        assert!(tracker.is_healthy_at(id, t0 + Duration::from_secs(301)));
        let snap = tracker.snapshot(id);
        assert!(snap.healthy);
        assert_eq!(snap.consecutive_failures, 0);
    }

    #[test]
    fn test_snapshot_reports_latency() {
        let tracker = tracker(1);
        let id = BackendId(0);
        tracker.record_outcome(id, Outcome::Success { response_time: Duration::from_millis(200) });
        tracker.record_outcome(id, Outcome::Success { response_time: Duration::from_millis(400) });
        let snap = tracker.snapshot(id);
        assert_eq!(snap.samples, 2);
        assert!((snap.average_response_time - 0.3).abs() < 1e-9);
    }
}
