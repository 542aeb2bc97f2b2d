//! Backend selection.
//!
//! # Data Flow
//! ```text
//! Selection request
//!     → BackendView (registry + health + rate windows)
//!     → Apply selection algorithm:
//!         - capability.rs (lowest tier among capable, healthy backends)
//!         - weighted.rs (random draw weighted by tier, headroom, latency)
//!     → Return BackendId or None
//! ```
//!
//! # Design Decisions
//! - Selectors never admit or attempt; they only choose
//! - Unhealthy backends excluded from selection
//! - Health checks may trigger half-open recovery as a side effect

pub mod capability;
pub mod weighted;

use crate::health::HealthTracker;
use crate::rate_limit::RateLimiter;
use crate::registry::{BackendId, Registry};

pub use capability::CapabilitySelector;
pub use weighted::WeightedSelector;

/// Everything a selector may consult.
#[derive(Debug, Clone, Copy)]
pub struct BackendView<'a> {
    pub registry: &'a Registry,
    pub health: &'a HealthTracker,
    pub limits: &'a RateLimiter,
}

impl<'a> BackendView<'a> {
    /// Healthy backends in tier order.
    pub fn healthy_by_tier(&self) -> Vec<BackendId> {
        self.registry
            .by_tier()
            .into_iter()
            .filter(|id| self.health.is_healthy(*id))
            .collect()
    }
}

/// A backend selection strategy.
pub trait LoadBalancer: Send + Sync {
    fn next_backend(&self, view: &BackendView<'_>) -> Option<BackendId>;
}
