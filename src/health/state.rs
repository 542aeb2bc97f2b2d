//! Backend health state machine.
//!
//! # States
//! - Healthy: backend is a routing candidate
//! - Unhealthy: backend skipped until it recovers
//!
//! # State Transitions
//! ```text
//! Healthy → Unhealthy: consecutive failures >= failure_threshold
//! Unhealthy → Healthy: any success
//! Unhealthy → Healthy: last failure older than recovery window (half-open)
//! ```

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Thresholds applied by the tracker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HealthPolicy {
    pub failure_threshold: u32,
    pub recovery: Duration,
    pub max_samples: usize,
}

impl Default for HealthPolicy {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            recovery: Duration::from_secs(300),
            max_samples: 100,
        }
    }
}

/// What happened on one attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome<'a> {
    Success { response_time: Duration },
    Failure { error: &'a str },
}

/// Health transition caused by an update, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    BecameUnhealthy,
    Recovered,
}

/// Mutable health record for one backend.
#[derive(Debug, Clone)]
pub struct HealthState {
    pub healthy: bool,
    pub consecutive_failures: u32,
    pub last_success: Instant,
    pub last_failure: Option<Instant>,
    samples: VecDeque<f64>,
    average_response_time: f64,
}

impl HealthState {
    pub fn new(now: Instant) -> Self {
        Self {
            healthy: true,
            consecutive_failures: 0,
            last_success: now,
            last_failure: None,
            samples: VecDeque::new(),
            average_response_time: 0.0,
        }
    }

    /// Mean of the retained samples in seconds; 0 before the first success.
    pub fn average_response_time(&self) -> f64 {
        self.average_response_time
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    pub(crate) fn apply(&mut self, outcome: Outcome<'_>, policy: &HealthPolicy, now: Instant) -> Option<Transition> {
        match outcome {
            Outcome::Success { response_time } => {
                let was_healthy = self.healthy;
                self.healthy = true;
                self.consecutive_failures = 0;
                self.last_success = now;

                self.samples.push_back(response_time.as_secs_f64());
                while self.samples.len() > policy.max_samples {
                    self.samples.pop_front();
                }
                self.average_response_time = self.samples.iter().sum::<f64>() / self.samples.len() as f64;

                (!was_healthy).then_some(Transition::Recovered)
            }
            Outcome::Failure { .. } => {
                self.consecutive_failures = self.consecutive_failures.saturating_add(1);
                self.last_failure = Some(now);

                if self.healthy && self.consecutive_failures >= policy.failure_threshold {
                    self.healthy = false;
                    return Some(Transition::BecameUnhealthy);
                }
                None
            }
        }
    }

    /// Half-open check: flips an unhealthy backend back once its last failure
    /// is at least `policy.recovery` old.
    pub(crate) fn check(&mut self, policy: &HealthPolicy, now: Instant) -> (bool, Option<Transition>) {
        if self.healthy {
            return (true, None);
        }
        let cooled_down = self
            .last_failure
            .map(|at| now.saturating_duration_since(at) >= policy.recovery)
            .unwrap_or(true);
        if cooled_down {
            self.healthy = true;
            self.consecutive_failures = 0;
            return (true, Some(Transition::Recovered));
        }
        (false, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fail(state: &mut HealthState, policy: &HealthPolicy, now: Instant) -> Option<Transition> {
        state.apply(Outcome::Failure { error: "boom" }, policy, now)
    }

    #[test]
    fn test_three_failures_mark_unhealthy() {
        let policy = HealthPolicy::default();
        let now = Instant::now();
        let mut state = HealthState::new(now);

        assert_eq!(fail(&mut state, &policy, now), None);
        assert_eq!(fail(&mut state, &policy, now), None);
        assert!(state.healthy);
        assert_eq!(fail(&mut state, &policy, now), Some(Transition::BecameUnhealthy));
        assert!(!state.healthy);
        assert_eq!(state.consecutive_failures, 3);

        // further failures keep counting without re-transitioning
        assert_eq!(fail(&mut state, &policy, now), None);
        assert_eq!(state.consecutive_failures, 4);
    }

    #[test]
    fn test_success_resets() {
        let policy = HealthPolicy::default();
        let now = Instant::now();
        let mut state = HealthState::new(now);
        for _ in 0..3 {
            fail(&mut state, &policy, now);
        }
        let t = state.apply(Outcome::Success { response_time: Duration::from_millis(500) }, &policy, now);
        assert_eq!(t, Some(Transition::Recovered));
        assert!(state.healthy);
        assert_eq!(state.consecutive_failures, 0);
        assert_eq!(state.average_response_time(), 0.5);
    }

    #[test]
    fn test_samples_are_bounded() {
        let policy = HealthPolicy {
            max_samples: 3,
            ..HealthPolicy::default()
        };
        let now = Instant::now();
        let mut state = HealthState::new(now);
        for secs in [10, 1, 2, 3] {
            state.apply(Outcome::Success { response_time: Duration::from_secs(secs) }, &policy, now);
        }
        assert_eq!(state.sample_count(), 3);
        assert_eq!(state.average_response_time(), 2.0);
    }

    #[test]
    fn test_half_open_after_recovery_window() {
        let policy = HealthPolicy::default();
        let t0 = Instant::now();
        let mut state = HealthState::new(t0);
        for _ in 0..3 {
            fail(&mut state, &policy, t0);
        }

        assert_eq!(state.check(&policy, t0 + Duration::from_secs(299)), (false, None));
        assert_eq!(
            state.check(&policy, t0 + Duration::from_secs(300)),
            (true, Some(Transition::Recovered))
        );
        assert_eq!(state.consecutive_failures, 0);

        // one more failure is not enough to trip it again
        fail(&mut state, &policy, t0 + Duration::from_secs(301));
        assert!(state.healthy);
    }
}
