//! Weighted load-balanced selection.
//!
//! Weight per healthy backend:
//!
//! ```text
//! (4 - tier) × (1 - window_count / window_limit) × 1 / max(avg_response_secs, ε)
//! ```
//!
//! Primary tiers, backends with rate headroom and historically fast backends
//! are all favoured at once. A backend with zero weight never wins the draw.

use rand::Rng;

use crate::load_balancer::{BackendView, LoadBalancer};
use crate::rate_limit::WindowUsage;
use crate::registry::BackendId;

/// Floor applied to the average response time (seconds).
pub const LATENCY_FLOOR_SECS: f64 = 0.1;

/// Tier ceiling of the weight formula; tiers at or above it weigh nothing.
const TIER_CEILING: f64 = 4.0;

/// Weighted random selector.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeightedSelector;

impl WeightedSelector {
    pub fn new() -> Self {
        Self
    }

    /// Select using the caller's RNG.
    pub fn select_with<R: Rng + ?Sized>(&self, view: &BackendView<'_>, rng: &mut R) -> Option<BackendId> {
        let healthy = view.healthy_by_tier();
        let first = *healthy.first()?;

        let weighted: Vec<(BackendId, f64)> = healthy
            .into_iter()
            .filter_map(|id| {
                let config = view.registry.get_config(id)?;
                let usage = view.limits.usage(id);
                let latency = view.health.snapshot(id).average_response_time;
                Some((id, weight(config.tier, usage, latency)))
            })
            .filter(|(_, w)| *w > 0.0)
            .collect();

        let total: f64 = weighted.iter().map(|(_, w)| w).sum();
        if weighted.is_empty() || !total.is_finite() {
            tracing::debug!(backend = ?first, "All weights zero, falling back to first healthy backend");
            return Some(first);
        }

        let roll = rng.gen::<f64>() * total;
        draw(&weighted, roll).or(Some(first))
    }
}

impl LoadBalancer for WeightedSelector {
    fn next_backend(&self, view: &BackendView<'_>) -> Option<BackendId> {
        self.select_with(view, &mut rand::thread_rng())
    }
}

/// Desirability of one backend.
pub fn weight(tier: u8, usage: WindowUsage, average_response_secs: f64) -> f64 {
    let tier_factor = (TIER_CEILING - tier as f64).max(0.0);
    tier_factor * usage.headroom() / average_response_secs.max(LATENCY_FLOOR_SECS)
}

/// Walk the cumulative weights until `roll` falls inside one.
fn draw(weighted: &[(BackendId, f64)], roll: f64) -> Option<BackendId> {
    let mut cumulative = 0.0;
    for (id, w) in weighted {
        cumulative += w;
        if roll < cumulative {
            return Some(*id);
        }
    }
    // float rounding can leave roll == total
    weighted.last().map(|(id, _)| *id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::{HealthPolicy, HealthTracker, Outcome};
    use crate::rate_limit::RateLimiter;
    use crate::registry::{BackendConfig, BackendKind, Registry};
    use crate::testing::NullClient;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;

    fn usage(count: u32, limit: u32) -> WindowUsage {
        WindowUsage { count, limit }
    }

    fn setup(limits: [u32; 3]) -> (Registry, HealthTracker, RateLimiter) {
        let registry = Registry::builder()
            .backend(BackendConfig::for_kind(BackendKind::OpenAi).with_tier(1).with_rate_limit(limits[0]), Arc::new(NullClient))
            .backend(BackendConfig::for_kind(BackendKind::Anthropic).with_tier(2).with_rate_limit(limits[1]), Arc::new(NullClient))
            .backend(BackendConfig::for_kind(BackendKind::Gemini).with_tier(3).with_rate_limit(limits[2]), Arc::new(NullClient))
            .build()
            .unwrap();
        let health = HealthTracker::new(registry.names(), HealthPolicy::default());
        let limits = RateLimiter::new(registry.limits(), Duration::from_secs(60));
        (registry, health, limits)
    }

    fn trip(health: &HealthTracker, id: BackendId) {
        for _ in 0..3 {
            health.record_outcome(id, Outcome::Failure { error: "down" });
        }
    }

    #[test]
    fn test_weight_formula() {
        assert!((weight(1, usage(0, 10), 0.0) - 30.0).abs() < 1e-9);
        assert_eq!(weight(2, usage(5, 10), 1.0), 1.0);
        assert_eq!(weight(3, usage(10, 10), 0.5), 0.0);
        assert_eq!(weight(4, usage(0, 10), 0.5), 0.0);
        assert_eq!(weight(9, usage(0, 10), 0.5), 0.0);
    }

    #[test]
    fn test_draw_is_cumulative() {
        let weighted = vec![(BackendId(0), 1.0), (BackendId(1), 3.0)];
        assert_eq!(draw(&weighted, 0.5), Some(BackendId(0)));
        assert_eq!(draw(&weighted, 1.0), Some(BackendId(1)));
        assert_eq!(draw(&weighted, 4.0), Some(BackendId(1)));
    }

    #[test]
    fn test_never_selects_unhealthy() {
        let (registry, health, limits) = setup([100, 100, 100]);
        trip(&health, BackendId(0));
        let view = BackendView { registry: &registry, health: &health, limits: &limits };
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            assert_ne!(WeightedSelector.select_with(&view, &mut rng), Some(BackendId(0)));
        }
    }

    #[test]
    fn test_single_healthy_always_selected() {
        let (registry, health, limits) = setup([100, 100, 100]);
        trip(&health, BackendId(0));
        trip(&health, BackendId(2));
        let view = BackendView { registry: &registry, health: &health, limits: &limits };
        for _ in 0..100 {
            assert_eq!(WeightedSelector.next_backend(&view), Some(BackendId(1)));
        }
    }

    #[test]
    fn test_none_when_all_unhealthy() {
        let (registry, health, limits) = setup([100, 100, 100]);
        for id in registry.ids() {
            trip(&health, id);
        }
        let view = BackendView { registry: &registry, health: &health, limits: &limits };
        assert_eq!(WeightedSelector.next_backend(&view), None);
    }

    #[test]
    fn test_saturated_backend_excluded() {
        let (registry, health, limits) = setup([1, 100, 100]);
        assert!(limits.try_admit(BackendId(0)));
        let view = BackendView { registry: &registry, health: &health, limits: &limits };
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            assert_ne!(WeightedSelector.select_with(&view, &mut rng), Some(BackendId(0)));
        }
    }

    #[test]
    fn test_all_zero_weights_fall_back_to_first_in_tier_order() {
        let (registry, health, limits) = setup([1, 1, 1]);
        for id in registry.ids() {
            assert!(limits.try_admit(id));
        }
        let view = BackendView { registry: &registry, health: &health, limits: &limits };
        assert_eq!(WeightedSelector.next_backend(&view), Some(BackendId(0)));
    }

    #[test]
    fn test_distribution_prefers_primary() {
        let (registry, health, limits) = setup([1000, 1000, 1000]);
        let view = BackendView { registry: &registry, health: &health, limits: &limits };
        let mut rng = StdRng::seed_from_u64(1);
        let mut counts: HashMap<BackendId, usize> = HashMap::new();
        for _ in 0..6000 {
            let id = WeightedSelector.select_with(&view, &mut rng).unwrap();
            *counts.entry(id).or_default() += 1;
        }
        // expected split 3:2:1
        let primary = counts[&BackendId(0)];
        let tertiary = counts[&BackendId(2)];
        assert!(primary > 2500, "primary picked {} times", primary);
        assert!(tertiary < 1400, "tertiary picked {} times", tertiary);
    }
}
