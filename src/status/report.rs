//! Point-in-time status report.

use serde::Serialize;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use crate::health::HealthTracker;
use crate::rate_limit::RateLimiter;
use crate::registry::{BackendKind, Registry};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusReport {
    pub total_backends: usize,
    pub healthy_backends: usize,
    pub backends: Vec<BackendStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackendStatus {
    pub name: String,
    pub kind: BackendKind,
    pub model: String,
    pub tier: u8,
    pub healthy: bool,
    pub consecutive_failures: u32,
    /// Requests in the current window.
    pub current_load: u32,
    pub rate_limit: u32,
    pub average_response_time_secs: f64,
    pub capabilities: Vec<String>,
    pub cost_per_1k: f64,
    pub max_output_tokens: u32,
    /// Unix seconds.
    pub last_success: u64,
    /// Unix seconds, if the backend has ever failed.
    pub last_failure: Option<u64>,
}

/// Build the report. Health is read through `is_healthy`, so a backend past
/// its recovery window is reported (and becomes) healthy.
pub fn build_report(registry: &Registry, health: &HealthTracker, limits: &RateLimiter) -> StatusReport {
    let now = Instant::now();
    let wall = SystemTime::now();

    let backends: Vec<BackendStatus> = registry
        .list_backends()
        .iter()
        .map(|backend| {
            let healthy = health.is_healthy_at(backend.id, now);
            let snapshot = health.snapshot(backend.id);
            let usage = limits.usage_at(backend.id, now);
            let config = &backend.config;
            BackendStatus {
                name: config.name.clone(),
                kind: config.kind,
                model: config.model.clone(),
                tier: config.tier,
                healthy,
                consecutive_failures: snapshot.consecutive_failures,
                current_load: usage.count,
                rate_limit: usage.limit,
                average_response_time_secs: snapshot.average_response_time,
                capabilities: config.capabilities.iter().cloned().collect(),
                cost_per_1k: config.cost_per_1k,
                max_output_tokens: config.max_output_tokens,
                last_success: unix_secs(wall, now, snapshot.last_success),
                last_failure: snapshot.last_failure.map(|at| unix_secs(wall, now, at)),
            }
        })
        .collect();

    StatusReport {
        total_backends: backends.len(),
        healthy_backends: backends.iter().filter(|b| b.healthy).count(),
        backends,
    }
}

/// Convert a monotonic instant into wall-clock Unix seconds.
fn unix_secs(wall_now: SystemTime, mono_now: Instant, at: Instant) -> u64 {
    let ago = mono_now.saturating_duration_since(at);
    wall_now
        .checked_sub(ago)
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map_or(0, |d| d.as_secs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_unix_secs_subtracts_age() {
        let wall = UNIX_EPOCH + Duration::from_secs(1_000);
        let now = Instant::now();
        let earlier = now.checked_sub(Duration::from_secs(10)).unwrap_or(now);
        let expected = if earlier == now { 1_000 } else { 990 };
        assert_eq!(unix_secs(wall, now, earlier), expected);
        assert_eq!(unix_secs(wall, now, now), 1_000);
    }
}
